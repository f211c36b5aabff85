use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::error::ConfigError;

/// Everything a run needs, resolved once at startup and passed down by reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tmdb: TmdbConfig,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    /// Poster prefix, fixed at the w500 size.
    pub image_base_url: String,
    /// Public site used for deep links in latest-mode captions.
    pub web_base_url: String,
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            web_base_url: "https://www.themoviedb.org".to_string(),
            language: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub api_url: String,
    pub instance_id: String,
    pub api_token: String,
    /// Group number; the chat id is derived from it.
    pub chat_number: String,
}

impl GatewayConfig {
    pub fn chat_id(&self) -> String {
        format!("{}@g.us", self.chat_number)
    }

    pub fn send_file_url(&self) -> String {
        format!(
            "{}/waInstance{}/sendFileByUrl/{}",
            self.api_url.trim_end_matches('/'),
            self.instance_id,
            self.api_token
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub notified_path: PathBuf,
    pub audit_log_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            notified_path: PathBuf::from("notified_movies.log"),
            audit_log_path: PathBuf::from("movie_notifier.log"),
        }
    }
}

impl Config {
    /// Resolve configuration: defaults, then the optional YAML file, then
    /// `.env` and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(env_file) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", env_file.display());
        }
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {}", path.display());

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from environment-style variables. Unset or empty
    /// variables leave the current value alone.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TMDB_API_KEY") {
            self.tmdb.api_key = v;
        }
        if let Some(v) = get("TMDB_BASE_URL") {
            self.tmdb.base_url = v;
        }
        if let Some(v) = get("TMDB_LANGUAGE") {
            self.tmdb.language = v;
        }
        if let Some(v) = get("API_URL") {
            self.gateway.api_url = v;
        }
        if let Some(v) = get("GREEN_API_INSTANCE_ID") {
            self.gateway.instance_id = v;
        }
        if let Some(v) = get("GREEN_API_API_TOKEN") {
            self.gateway.api_token = v;
        }
        if let Some(v) = get("WHATSAPP_NUMBER") {
            self.gateway.chat_number = v;
        }
        if let Some(v) = get("NOTIFIED_STORE_PATH") {
            self.storage.notified_path = PathBuf::from(v);
        }
        if let Some(v) = get("AUDIT_LOG_PATH") {
            self.storage.audit_log_path = PathBuf::from(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("TMDB_API_KEY", &self.tmdb.api_key),
            ("API_URL", &self.gateway.api_url),
            ("GREEN_API_INSTANCE_ID", &self.gateway.instance_id),
            ("GREEN_API_API_TOKEN", &self.gateway.api_token),
            ("WHATSAPP_NUMBER", &self.gateway.chat_number),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { key });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete_env() -> HashMap<String, String> {
        env(&[
            ("TMDB_API_KEY", "tmdb-key"),
            ("API_URL", "https://gateway.example/"),
            ("GREEN_API_INSTANCE_ID", "1101"),
            ("GREEN_API_API_TOKEN", "secret"),
            ("WHATSAPP_NUMBER", "120363000"),
        ])
    }

    #[test]
    fn environment_fills_required_settings() {
        let vars = complete_env();
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).cloned());

        assert!(config.validate().is_ok());
        assert_eq!(config.tmdb.api_key, "tmdb-key");
        assert_eq!(config.gateway.chat_id(), "120363000@g.us");
        assert_eq!(
            config.gateway.send_file_url(),
            "https://gateway.example/waInstance1101/sendFileByUrl/secret"
        );
        assert_eq!(config.storage.notified_path, PathBuf::from("notified_movies.log"));
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let mut vars = complete_env();
        vars.insert("GREEN_API_API_TOKEN".into(), "   ".into());
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).cloned());

        match config.validate() {
            Err(ConfigError::Missing { key }) => assert_eq!(key, "GREEN_API_API_TOKEN"),
            other => panic!("expected missing token, got {other:?}"),
        }
    }

    #[test]
    fn yaml_file_is_overridden_by_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifier.yaml");
        fs::write(
            &path,
            "tmdb:\n  api_key: from-file\n  language: de-DE\nstorage:\n  notified_path: /var/lib/notifier/ids.json\n",
        )
        .unwrap();

        let mut config = Config::from_file(&path).unwrap();
        assert_eq!(config.tmdb.language, "de-DE");
        // unspecified fields keep their defaults
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.storage.audit_log_path, PathBuf::from("movie_notifier.log"));

        let vars = env(&[("TMDB_API_KEY", "from-env")]);
        config.apply_env(|k| vars.get(k).cloned());
        assert_eq!(config.tmdb.api_key, "from-env");
        assert_eq!(
            config.storage.notified_path,
            PathBuf::from("/var/lib/notifier/ids.json")
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
