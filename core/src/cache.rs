use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::text::read_lines;

/// Supplies the text lines of a file for content search.
///
/// Unreadable files yield an empty slice rather than an error.
pub trait LineSource {
    fn lines(&self, path: &Path) -> Arc<[String]>;
}

/// Reads the file on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectLines;

impl LineSource for DirectLines {
    fn lines(&self, path: &Path) -> Arc<[String]> {
        load(path).unwrap_or_else(empty)
    }
}

/// Line cache keyed by absolute path.
///
/// Entries are populated on the first successful read and kept until
/// [`LineCache::clear`]. Failed reads are not cached, so a later call retries.
#[derive(Debug, Default)]
pub struct LineCache {
    entries: RwLock<HashMap<PathBuf, Arc<[String]>>>,
}

impl LineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LineSource for LineCache {
    fn lines(&self, path: &Path) -> Arc<[String]> {
        if let Some(lines) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            return Arc::clone(lines);
        }

        let Some(lines) = load(path) else {
            return empty();
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(path.to_path_buf()).or_insert(lines))
    }
}

impl<T: LineSource + ?Sized> LineSource for &T {
    fn lines(&self, path: &Path) -> Arc<[String]> {
        (**self).lines(path)
    }
}

impl<T: LineSource + ?Sized> LineSource for Arc<T> {
    fn lines(&self, path: &Path) -> Arc<[String]> {
        (**self).lines(path)
    }
}

fn load(path: &Path) -> Option<Arc<[String]>> {
    match read_lines(path) {
        Ok(lines) => Some(lines.into()),
        Err(err) => {
            debug!("skipping unreadable file: {err}");
            None
        }
    }
}

fn empty() -> Arc<[String]> {
    Arc::from(Vec::new())
}
