use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One file of the project's tracked set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Absolute path, unique within a tracked set.
    pub path: PathBuf,
    pub filename: String,
    /// Path relative to the tree root, as reported back to callers.
    pub relpath: String,
}

impl TrackedFile {
    pub fn new(path: impl Into<PathBuf>, relpath: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            filename,
            relpath: relpath.into(),
        }
    }

    pub fn extension(&self) -> Option<&str> {
        split_extension(&self.filename)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "path")]
    pub relpath: String,
    pub line: Option<usize>,
}

impl MatchResult {
    pub fn file(relpath: impl Into<String>) -> Self {
        Self {
            relpath: relpath.into(),
            line: None,
        }
    }

    pub fn line(relpath: impl Into<String>, line: usize) -> Self {
        Self {
            relpath: relpath.into(),
            line: Some(line),
        }
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.relpath, line),
            None => write!(f, "{}", self.relpath),
        }
    }
}

/// Extensions (with the leading dot) that are never searched for content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    exts: BTreeSet<String>,
}

impl SkipSet {
    pub const DEFAULT_EXTS: [&'static str; 3] = [".yml", ".csv", ".tsv"];

    pub fn new<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for ext in exts {
            set.insert(ext.as_ref());
        }
        set
    }

    /// Adds an extension; a missing leading dot is added.
    pub fn insert(&mut self, ext: &str) {
        let ext = ext.trim();
        if ext.is_empty() || ext == "." {
            return;
        }
        if ext.starts_with('.') {
            self.exts.insert(ext.to_string());
        } else {
            self.exts.insert(format!(".{ext}"));
        }
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.exts.contains(ext)
    }

    pub fn skips(&self, filename: &str) -> bool {
        split_extension(filename).is_some_and(|ext| self.contains(ext))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.exts.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }
}

/// Extension of `filename` including the dot, ignoring leading dots.
///
/// `"a.tar.gz"` gives `".gz"`, `".bashrc"` and `"Makefile"` give `None`.
pub fn split_extension(filename: &str) -> Option<&str> {
    let stem_start = filename.len() - filename.trim_start_matches('.').len();
    let rest = &filename[stem_start..];
    let dot = rest.rfind('.')?;
    Some(&rest[dot..])
}
