use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration could not be resolved into a usable `Config`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{key}`")]
    Missing { key: &'static str },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A request against the metadata provider failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The notified-id store or the audit log could not be accessed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Not recoverable: the run stops rather than guessing what was already sent.
    #[error("notified-id store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The messaging gateway did not confirm delivery.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway answered with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
