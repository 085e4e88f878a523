use std::path::Path;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::cache::LineSource;
use crate::error::{ResolveError, ResolveResult};
use crate::model::{MatchResult, SkipSet, TrackedFile};
use crate::pattern::token_regex;

/// Resolves an item's external references against a tracked file set.
///
/// The item's own file is never a match. Traversal follows the order of the
/// supplied files and the first hit wins.
pub struct ReferenceResolver<'a, S: LineSource + ?Sized> {
    lines: &'a S,
    skip: &'a SkipSet,
}

impl<'a, S: LineSource + ?Sized> ReferenceResolver<'a, S> {
    pub fn new(lines: &'a S, skip: &'a SkipSet) -> Self {
        Self { lines, skip }
    }

    /// Finds `reference` as a filename or as a token in file contents.
    ///
    /// A filename hit returns no line number and stops the search before any
    /// later file is read.
    pub fn find_ref<'f, I>(
        &self,
        reference: &str,
        files: I,
        item_path: &Path,
    ) -> ResolveResult<MatchResult>
    where
        I: IntoIterator<Item = &'f TrackedFile>,
    {
        debug!("searching for ref '{reference}'...");
        let started = Instant::now();
        let not_found = || ResolveError::ReferenceNotFound(reference.to_string());

        if reference.is_empty() {
            return Err(not_found());
        }
        let regex = compile(reference).ok_or_else(not_found)?;

        for file in files {
            if file.path.as_os_str() == item_path.as_os_str() {
                continue;
            }
            if file.filename == reference {
                debug!("found ref as filename: {}", file.relpath);
                return Ok(MatchResult::file(&file.relpath));
            }
            if self.skip.skips(&file.filename) {
                continue;
            }
            if let Some(line) = self.first_match(file, &regex) {
                debug!(
                    "found ref: {}:{line} in {:?}",
                    file.relpath,
                    started.elapsed()
                );
                return Ok(MatchResult::line(&file.relpath, line));
            }
        }

        debug!("ref '{reference}' not found after {:?}", started.elapsed());
        Err(not_found())
    }

    /// Confirms that `ref_path` (relative to `root`) is tracked, and when a
    /// keyword is given, locates its first line in that file.
    pub fn find_file_ref<'f, I>(
        &self,
        ref_path: &str,
        root: &Path,
        files: I,
        item_path: &Path,
        keyword: Option<&str>,
    ) -> ResolveResult<MatchResult>
    where
        I: IntoIterator<Item = &'f TrackedFile>,
    {
        debug!("searching for ref '{ref_path}'...");
        let not_found = || ResolveError::ReferenceNotFound(ref_path.to_string());
        let target = root.join(ref_path);

        let regex = match keyword {
            Some(keyword) => {
                debug!("searching for ref '{keyword}' in {ref_path}...");
                if keyword.is_empty() {
                    return Err(not_found());
                }
                Some(compile(keyword).ok_or_else(not_found)?)
            }
            None => None,
        };

        for file in files {
            // Exact path text, so `./a.c` or `a//b.c` do not name `a.c` or `a/b.c`.
            if file.path.as_os_str() == item_path.as_os_str()
                || file.path.as_os_str() != target.as_os_str()
            {
                continue;
            }
            let Some(regex) = regex.as_ref() else {
                debug!("found ref: {}", file.relpath);
                return Ok(MatchResult::file(&file.relpath));
            };
            if let Some(line) = self.first_match(file, regex) {
                debug!("found ref: {}:{line}", file.relpath);
                return Ok(MatchResult::line(&file.relpath, line));
            }
        }

        Err(not_found())
    }

    fn first_match(&self, file: &TrackedFile, regex: &Regex) -> Option<usize> {
        let lines = self.lines.lines(&file.path);
        lines
            .iter()
            .position(|line| regex.is_match(line))
            .map(|idx| idx + 1)
    }
}

fn compile(token: &str) -> Option<Regex> {
    match token_regex(token) {
        Ok(regex) => {
            trace!("regex: {}", regex.as_str());
            Some(regex)
        }
        Err(err) => {
            warn!("cannot build pattern for '{token}': {err}");
            None
        }
    }
}
