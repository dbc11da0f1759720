// src/store.rs
// Document store abstraction. The engine only ever sees titles, text and
// opaque revision ids; where the documents actually live is this module's
// business. `FsStore` keeps them as plain files under a store directory,
// with the file's mtime (seconds) standing in as the revision id —
// revisions are only ever compared for equality.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use thiserror::Error;

/// A loaded document: text plus the revision it had at load time.
#[derive(Clone, Debug)]
pub struct Document {
    pub title: String,
    pub text: String,
    pub revision_id: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error for '{title}': {source}")]
    Io {
        title: String,
        #[source]
        source: io::Error,
    },

    #[error("document '{0}' is locked")]
    Locked(String),

    #[error("edit conflict on '{0}'")]
    Conflict(String),

    #[error("save of '{0}' was rejected")]
    Rejected(String),
}

pub trait DocumentStore {
    /// `Ok(None)` means the document does not exist — that case is
    /// recoverable for the year-rollover fallback and must not be
    /// reported as an error.
    fn load(&self, title: &str) -> Result<Option<Document>, StoreError>;

    fn save(&mut self, title: &str, text: &str) -> Result<(), StoreError>;
}

/* ---------------- File-backed store ---------------- */

pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FsStore { dir: dir.into() }
    }

    /// Titles may contain '/' and other characters a filename cannot.
    fn path_for(&self, title: &str) -> PathBuf {
        let mut name = String::with_capacity(title.len());
        for ch in title.chars() {
            match ch {
                '/' | '\\' | ':' => name.push('~'),
                _ => name.push(ch),
            }
        }
        self.dir.join(format!("{name}.wiki"))
    }
}

impl DocumentStore for FsStore {
    fn load(&self, title: &str) -> Result<Option<Document>, StoreError> {
        let path = self.path_for(title);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| StoreError::Io {
            title: s!(title),
            source: e,
        })?;
        let revision_id = mtime_seconds(&path).map_err(|e| StoreError::Io {
            title: s!(title),
            source: e,
        })?;
        Ok(Some(Document {
            title: s!(title),
            text,
            revision_id,
        }))
    }

    fn save(&mut self, title: &str, text: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path_for(title).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                    title: s!(title),
                    source: e,
                })?;
            }
        }
        fs::write(self.path_for(title), text).map_err(|e| StoreError::Io {
            title: s!(title),
            source: e,
        })
    }
}

fn mtime_seconds(path: &Path) -> io::Result<u64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}

/* ---------------- In-memory store ---------------- */

/// Offline fixture store; also what the tests run against.
#[derive(Default)]
pub struct MemStore {
    docs: HashMap<String, (String, u64)>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: &str, text: &str, revision_id: u64) {
        self.docs.insert(s!(title), (s!(text), revision_id));
    }

    pub fn text_of(&self, title: &str) -> Option<&str> {
        self.docs.get(title).map(|(t, _)| t.as_str())
    }
}

impl DocumentStore for MemStore {
    fn load(&self, title: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.docs.get(title).map(|(text, rev)| Document {
            title: s!(title),
            text: text.clone(),
            revision_id: *rev,
        }))
    }

    fn save(&mut self, title: &str, text: &str) -> Result<(), StoreError> {
        let rev = self.docs.get(title).map(|(_, r)| r + 1).unwrap_or(1);
        self.docs.insert(s!(title), (s!(text), rev));
        Ok(())
    }
}
