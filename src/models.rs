use std::fmt;

use serde::{Deserialize, Serialize};

pub const NO_DESCRIPTION: &str = "No description available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Tv,
}

impl ContentKind {
    /// Path segment used by the provider for this kind (`movie` / `tv`).
    pub fn path_segment(self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Tv => "tv",
        }
    }

    pub fn plural_label(self) -> &'static str {
        match self {
            ContentKind::Movie => "Movies",
            ContentKind::Tv => "TV Shows",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Movie => write!(f, "Movie"),
            ContentKind::Tv => write!(f, "TV Show"),
        }
    }
}

/// One movie or TV show, normalized from the provider's raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub kind: ContentKind,
    pub title: String,
    pub release_date: Option<String>,
    pub description: String,
    pub poster_url: String,       // Empty when the provider has no poster
    pub genres: String,           // Comma-joined genre names
}

impl ContentItem {
    pub fn has_poster(&self) -> bool {
        !self.poster_url.is_empty()
    }

    pub fn poster_file_name(&self) -> String {
        format!("{}_poster.jpg", self.title)
    }
}

/// Raw movie or TV record as returned by the provider. Movies carry
/// `title`/`release_date`, shows carry `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
pub struct RawContent {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    // Detail-shaped responses (the "latest" endpoints) embed genre objects instead
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub results: Vec<RawContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Outgoing body of the gateway's send-file-by-url call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFileByUrl {
    pub chat_id: String,
    pub url_file: String,
    pub file_name: String,
    pub caption: String,
}
