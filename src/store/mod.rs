//! Local persistence for saved queries, query history and templates
//!
//! Each record kind lives in its own JSON file inside the store directory.
//! Records are unique by id: saving a record with an existing id replaces it.
//! Unreadable files are logged and treated as empty so that one corrupted
//! file never blocks the others.

mod records;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use records::{QueryHistoryItem, QueryTemplate, SavedQuery, DEFAULT_CATEGORY};

pub const SAVED_QUERIES_FILE: &str = "saved_queries.json";
pub const QUERY_HISTORY_FILE: &str = "query_history.json";
pub const TEMPLATES_FILE: &str = "templates.json";

/// Maximum number of history items kept by default
pub const MAX_HISTORY_ITEMS: usize = 50;

/// Errors that can occur while reading or writing the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// JSON file store rooted at a directory
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
    max_history: usize,
}

impl Store {
    /// Open a store, creating its directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        log::debug!("opened store at {}", dir.display());
        Ok(Self {
            dir,
            max_history: MAX_HISTORY_ITEMS,
        })
    }

    /// Set how many history items are kept
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        match serde_json::from_str(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("ignoring unreadable {}: {}", path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    fn write<T: Serialize>(&self, file: &str, records: &[T]) -> Result<(), StoreError> {
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&path, json).map_err(|e| StoreError::io(&path, e))
    }

    // Saved queries

    pub fn saved_queries(&self) -> Result<Vec<SavedQuery>, StoreError> {
        self.read(SAVED_QUERIES_FILE)
    }

    /// Insert a saved query, replacing any with the same id
    pub fn save_query(&self, query: SavedQuery) -> Result<(), StoreError> {
        let mut queries = self.saved_queries()?;
        queries.retain(|q| q.id != query.id);
        queries.push(query);
        self.write(SAVED_QUERIES_FILE, &queries)
    }

    /// Delete a saved query; returns whether it existed
    pub fn delete_saved_query(&self, id: &str) -> Result<bool, StoreError> {
        let mut queries = self.saved_queries()?;
        let before = queries.len();
        queries.retain(|q| q.id != id);
        self.write(SAVED_QUERIES_FILE, &queries)?;
        Ok(queries.len() != before)
    }

    /// Record that a saved query was just run
    pub fn touch_saved_query(&self, id: &str) -> Result<Option<SavedQuery>, StoreError> {
        let mut queries = self.saved_queries()?;
        let now = Utc::now();
        let mut touched = None;
        for q in queries.iter_mut().filter(|q| q.id == id) {
            q.last_run = Some(now);
            touched = Some(q.clone());
        }
        self.write(SAVED_QUERIES_FILE, &queries)?;
        Ok(touched)
    }

    // Query history

    /// History items, most recent first
    pub fn history(&self) -> Result<Vec<QueryHistoryItem>, StoreError> {
        self.read(QUERY_HISTORY_FILE)
    }

    /// Prepend an item, dropping the oldest beyond the history limit
    pub fn add_to_history(&self, item: QueryHistoryItem) -> Result<(), StoreError> {
        let mut history = self.history()?;
        history.insert(0, item);
        if history.len() > self.max_history {
            log::debug!("trimming history to {} items", self.max_history);
            history.truncate(self.max_history);
        }
        self.write(QUERY_HISTORY_FILE, &history)
    }

    pub fn clear_history(&self) -> Result<(), StoreError> {
        let path = self.dir.join(QUERY_HISTORY_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Remove one history item; returns whether it existed
    pub fn remove_from_history(&self, id: &str) -> Result<bool, StoreError> {
        let mut history = self.history()?;
        let before = history.len();
        history.retain(|h| h.id != id);
        self.write(QUERY_HISTORY_FILE, &history)?;
        Ok(history.len() != before)
    }

    // Templates

    pub fn templates(&self) -> Result<Vec<QueryTemplate>, StoreError> {
        self.read(TEMPLATES_FILE)
    }

    /// Insert a template, replacing any with the same id
    pub fn save_template(&self, template: QueryTemplate) -> Result<(), StoreError> {
        let mut templates = self.templates()?;
        templates.retain(|t| t.id != template.id);
        templates.push(template);
        self.write(TEMPLATES_FILE, &templates)
    }

    /// Delete a template; returns whether it existed
    pub fn delete_template(&self, id: &str) -> Result<bool, StoreError> {
        let mut templates = self.templates()?;
        let before = templates.len();
        templates.retain(|t| t.id != id);
        self.write(TEMPLATES_FILE, &templates)?;
        Ok(templates.len() != before)
    }

    /// Record that a template was just used
    pub fn touch_template(&self, id: &str) -> Result<Option<QueryTemplate>, StoreError> {
        let mut templates = self.templates()?;
        let now = Utc::now();
        let mut touched = None;
        for t in templates.iter_mut().filter(|t| t.id == id) {
            t.last_used = Some(now);
            touched = Some(t.clone());
        }
        self.write(TEMPLATES_FILE, &templates)?;
        Ok(touched)
    }

    /// Look a template up by id, then by name
    pub fn find_template(&self, key: &str) -> Result<Option<QueryTemplate>, StoreError> {
        let templates = self.templates()?;
        let found = templates
            .iter()
            .find(|t| t.id == key)
            .or_else(|| templates.iter().find(|t| t.name == key))
            .cloned();
        Ok(found)
    }
}
