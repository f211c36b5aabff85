use chrono::NaiveDate;

use crate::models::{ContentItem, ContentKind};

pub const DATE_NOT_AVAILABLE: &str = "Not available";
pub const DATE_INVALID: &str = "Invalid date";

/// Which flavour of message is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionStyle {
    /// Weekly top-rated digest for one content kind.
    TopRated(ContentKind),
    /// Latest-release update; adds a type line and a deep link.
    Latest,
}

impl CaptionStyle {
    pub fn header(self) -> String {
        match self {
            CaptionStyle::TopRated(kind) => format!("🎬 *Top {} for the Week!*", kind.plural_label()),
            CaptionStyle::Latest => "🆕 *Latest Update!*".to_string(),
        }
    }
}

/// `2024-03-15` -> `March 15, 2024`.
pub fn format_release_date(date: Option<&str>) -> String {
    match date.map(str::trim) {
        None | Some("") => DATE_NOT_AVAILABLE.to_string(),
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(parsed) => parsed.format("%B %d, %Y").to_string(),
            Err(_) => DATE_INVALID.to_string(),
        },
    }
}

pub fn deep_link(web_base: &str, item: &ContentItem) -> String {
    format!(
        "{}/{}/{}",
        web_base.trim_end_matches('/'),
        item.kind.path_segment(),
        item.id
    )
}

pub fn build_caption(item: &ContentItem, style: CaptionStyle, web_base: &str) -> String {
    let mut message = format!("{}\n\n", style.header());
    message.push_str(&format!("📌 *{}*\n", item.title));
    if style == CaptionStyle::Latest {
        message.push_str(&format!("🏷 *Type*: {}\n", item.kind));
    }
    message.push_str(&format!(
        "📅 *Release Date*: {}\n",
        format_release_date(item.release_date.as_deref())
    ));
    message.push_str(&format!("💬 {}\n", item.description));
    message.push_str(&format!("🎥 *Genres*: {}\n", item.genres));
    if style == CaptionStyle::Latest {
        message.push_str(&format!("🔗 {}\n", deep_link(web_base, item)));
    }
    message
}
