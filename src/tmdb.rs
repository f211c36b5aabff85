use std::collections::HashMap;

use log::{debug, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::TmdbConfig;
use crate::error::FetchError;
use crate::models::{ContentItem, ContentKind, GenreList, ListingPage, RawContent, NO_DESCRIPTION};

pub type GenreMap = HashMap<i64, String>;

pub const UNKNOWN_GENRE: &str = "Unknown";

/// Read-only client for the metadata provider. Every public fetch fails soft:
/// errors are logged and turn into "no content".
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
    genres: HashMap<ContentKind, GenreMap>,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
            genres: HashMap::new(),
        }
    }

    pub async fn fetch_top_rated(&mut self, kind: ContentKind) -> Vec<ContentItem> {
        let path = format!("{}/top_rated", kind.path_segment());
        let page: ListingPage = match self.get_json(&path).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Error fetching top rated {}: {}", kind.plural_label(), e);
                return Vec::new();
            }
        };
        debug!("Top rated {}: {} results", kind.plural_label(), page.results.len());

        if page.results.is_empty() {
            return Vec::new();
        }

        let genres = self.genres(kind).await;
        page.results
            .into_iter()
            .map(|raw| normalize(raw, kind, &genres, &self.config.image_base_url))
            .collect()
    }

    /// The single most recently added record of the given kind.
    pub async fn fetch_latest(&mut self, kind: ContentKind) -> Option<ContentItem> {
        let path = format!("{}/latest", kind.path_segment());
        let raw: RawContent = match self.get_json(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Error fetching latest {}: {}", kind, e);
                return None;
            }
        };

        let genres = self.genres(kind).await;
        Some(normalize(raw, kind, &genres, &self.config.image_base_url))
    }

    /// Genre table for `kind`, requested at most once per client. A failed
    /// request yields an empty table so every genre renders as unknown.
    pub async fn genres(&mut self, kind: ContentKind) -> GenreMap {
        if let Some(cached) = self.genres.get(&kind) {
            return cached.clone();
        }

        let path = format!("genre/{}/list", kind.path_segment());
        let map = match self.get_json::<GenreList>(&path).await {
            Ok(list) => list.genres.into_iter().map(|g| (g.id, g.name)).collect(),
            Err(e) => {
                warn!("Error fetching {} genres: {}", kind, e);
                GenreMap::new()
            }
        };
        info!("Loaded {} {} genres", map.len(), kind.path_segment());

        self.genres.insert(kind, map.clone());
        map
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        debug!("GET {}", url);

        // The api key travels in the query string; keep it out of error messages.
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("language", self.config.language.as_str()),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|source| FetchError::Decode {
            url,
            source: source.without_url(),
        })
    }
}

/// Turn a raw provider record into a `ContentItem`, substituting defaults for
/// missing optional fields.
pub fn normalize(raw: RawContent, kind: ContentKind, genres: &GenreMap, image_base: &str) -> ContentItem {
    let (title, release_date) = match kind {
        ContentKind::Movie => (raw.title.or(raw.name), raw.release_date),
        ContentKind::Tv => (raw.name.or(raw.title), raw.first_air_date),
    };

    let description = raw
        .overview
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let poster_url = match raw.poster_path.as_deref() {
        Some(path) if !path.is_empty() => format!("{}{}", image_base.trim_end_matches('/'), path),
        _ => String::new(),
    };

    let genre_ids: Vec<i64> = if raw.genre_ids.is_empty() {
        raw.genres.iter().map(|g| g.id).collect()
    } else {
        raw.genre_ids
    };

    ContentItem {
        id: raw.id,
        kind,
        title: title.unwrap_or_default(),
        release_date: release_date.filter(|d| !d.is_empty()),
        description,
        poster_url,
        genres: resolve_genres(&genre_ids, genres),
    }
}

/// Comma-join genre names in the given order; ids missing from the table
/// render as "Unknown".
pub fn resolve_genres(ids: &[i64], genres: &GenreMap) -> String {
    ids.iter()
        .map(|id| genres.get(id).map(String::as_str).unwrap_or(UNKNOWN_GENRE))
        .collect::<Vec<_>>()
        .join(", ")
}
