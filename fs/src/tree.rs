use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use gix::bstr::ByteSlice;
use ignore::WalkBuilder;
use reffind_core::TrackedFile;
use tracing::{debug, info, warn};

use crate::error::TreeError;

/// Where a tracked file list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSource {
    /// Entries of the git index that exist in the work tree.
    GitIndex,
    /// Filesystem walk honouring ignore files.
    Walk,
}

/// A snapshot of the tracked files below `root`.
///
/// Enumerate once and reuse it for a batch of resolutions; build a new one
/// when the tree may have changed.
#[derive(Debug, Clone)]
pub struct TrackedTree {
    root: PathBuf,
    source: TreeSource,
    files: Vec<TrackedFile>,
}

impl TrackedTree {
    /// Uses the git index when `root` is inside a repository, otherwise
    /// walks the directory.
    pub fn discover(root: &Path) -> Result<Self, TreeError> {
        let root = canonical_root(root)?;

        let (source, files) = match git_tracked_files(&root) {
            Ok(files) => (TreeSource::GitIndex, files),
            Err(err) => {
                debug!("tracked_files: {err}, falling back to filesystem walk");
                (TreeSource::Walk, walk_tracked_files(&root)?)
            }
        };

        info!(
            "tracked_files: {} files under {} ({source:?})",
            files.len(),
            root.display()
        );
        Ok(Self {
            root,
            source,
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source(&self) -> TreeSource {
        self.source
    }

    pub fn files(&self) -> &[TrackedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Absolute form of `path`: relative paths are taken from the tree root.
    /// Existing paths are canonicalized so they compare equal to tracked ones.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        let joined = self.root.join(path);
        joined.canonicalize().unwrap_or(joined)
    }
}

impl<'a> IntoIterator for &'a TrackedTree {
    type Item = &'a TrackedFile;
    type IntoIter = std::slice::Iter<'a, TrackedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Files in the git index (`git ls-files`) below `root`, in index order.
///
/// Entries missing from the work tree are left out. Fails when `root` is not
/// inside a repository with a work tree and a readable index.
pub fn git_tracked_files(root: &Path) -> Result<Vec<TrackedFile>, TreeError> {
    let root = canonical_root(root)?;

    let repo = gix::discover(&root)
        .map_err(|e| TreeError::Git(format!("no git repository detected: {e}")))?;
    let workdir = repo
        .work_dir()
        .ok_or_else(|| TreeError::Git("repository has no work tree".to_string()))?;
    let workdir = workdir
        .canonicalize()
        .unwrap_or_else(|_| workdir.to_path_buf());

    let git_index = repo
        .index_or_empty()
        .map_err(|e| TreeError::Git(format!("failed to read git index: {e}")))?;

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();
    for entry in git_index.entries() {
        let rel_path = entry.path(&git_index);
        let rel_str = match std::str::from_utf8(rel_path.as_bytes()) {
            Ok(s) => s,
            Err(err) => {
                warn!("git_tracked_files: non-utf8 path in index: {err}");
                continue;
            }
        };

        let abs = workdir.join(rel_str);
        let Some(relpath) = relative_to(&abs, &root) else {
            continue;
        };
        // Conflicted paths appear once per stage.
        if !seen.insert(abs.clone()) {
            continue;
        }
        if !abs.is_file() {
            debug!("git_tracked_files: {} is not in the work tree", abs.display());
            continue;
        }
        files.push(TrackedFile::new(abs, relpath));
    }

    Ok(files)
}

/// Files below `root` found by a sorted walk honouring `.gitignore` and
/// `.ignore`, with `.git` directories excluded.
pub fn walk_tracked_files(root: &Path) -> Result<Vec<TrackedFile>, TreeError> {
    let root = canonical_root(root)?;

    let walker = WalkBuilder::new(&root)
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .parents(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.file_name() != OsStr::new(".git"))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("walk_tracked_files: failed to read entry: {err}");
                continue;
            }
        };

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let abs = entry.into_path();
        if let Some(relpath) = relative_to(&abs, &root) {
            files.push(TrackedFile::new(abs, relpath));
        }
    }

    Ok(files)
}

fn canonical_root(root: &Path) -> Result<PathBuf, TreeError> {
    root.canonicalize().map_err(|source| TreeError::Root {
        path: root.to_path_buf(),
        source,
    })
}

fn relative_to(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel.to_string_lossy().into_owned())
}
