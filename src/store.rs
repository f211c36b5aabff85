use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::StoreError;

/// Ids that have already been notified. Keeps first-insertion order so the
/// persisted array is stable between runs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NotifiedSet {
    order: Vec<i64>,
    seen: HashSet<i64>,
}

impl NotifiedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.seen.contains(&id)
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: i64) -> bool {
        if self.seen.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[i64] {
        &self.order
    }
}

impl FromIterator<i64> for NotifiedSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = NotifiedSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Flat-file store of notified ids: a JSON array of integers.
pub struct NotifiedStore {
    path: PathBuf,
}

impl NotifiedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file is the first-run case and yields an empty set. A file
    /// that is present but unparseable is an error.
    pub fn load(&self) -> Result<NotifiedSet, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No notified-id store at {}, starting empty", self.path.display());
                return Ok(NotifiedSet::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let ids: Vec<i64> = serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        debug!("Loaded {} notified ids from {}", ids.len(), self.path.display());

        Ok(ids.into_iter().collect())
    }

    /// Replace the whole store with `set`. Written to a sibling temp file and
    /// renamed into place so readers never see a half-written array.
    pub fn save(&self, set: &NotifiedSet) -> Result<(), StoreError> {
        let json = serde_json::to_string(set.ids()).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.tmp_path();
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        let mut file = fs::File::create(&tmp).map_err(io_err(&tmp))?;
        file.write_all(json.as_bytes()).map_err(io_err(&tmp))?;
        file.sync_all().map_err(io_err(&tmp))?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(io_err(&self.path))?;

        debug!("Saved {} notified ids to {}", set.len(), self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Append-only, human-readable record of sent notifications.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn record(&self, action: &str, title: &str) -> Result<(), StoreError> {
        let line = format!(
            "{} - {} - {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            action,
            title
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(line.as_bytes()).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
