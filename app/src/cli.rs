use std::path::{Path, PathBuf};

use reffind_core::{LineCache, MatchResult, ReferenceResolver, ResolveResult, SkipSet};
use reffind_fs::TrackedTree;
use tracing::{error, info};

use crate::settings::Settings;

pub fn default_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Initialize tracing for CLI commands.
///
/// Logs go to stderr, and respect RUST_LOG or default to `info`.
pub fn init_tracing_cli() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing for the MCP server.
///
/// - Never logs to stdout (to keep stdio clean for JSON-RPC).
/// - If `REFFIND_LOG_PATH` is set, append logs to that file.
/// - If not set or file cannot be opened, logging is effectively disabled.
pub fn init_tracing_server() {
    use std::fs::OpenOptions;
    use std::sync::Mutex;
    use tracing_subscriber::{EnvFilter, fmt};

    let path = match std::env::var("REFFIND_LOG_PATH") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => return,
    };

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(_) => return,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

/// Item path as given on the command line, made absolute against the
/// working directory. No item means nothing is excluded.
fn item_path(item: Option<PathBuf>) -> PathBuf {
    match item {
        Some(path) => path
            .canonicalize()
            .unwrap_or_else(|_| default_root().join(path)),
        None => PathBuf::new(),
    }
}

fn open_tree(root: &Path) -> TrackedTree {
    match TrackedTree::discover(root) {
        Ok(tree) => tree,
        Err(err) => {
            error!("Failed to enumerate tracked files: {err}");
            std::process::exit(1);
        }
    }
}

fn print_match(found: &MatchResult, json: bool) {
    if json {
        match serde_json::to_string(found) {
            Ok(line) => println!("{line}"),
            Err(err) => error!("Failed to encode result: {err}"),
        }
    } else {
        println!("{found}");
    }
}

/// One tree enumeration and one line cache shared by a batch of lookups.
pub struct Session {
    pub tree: TrackedTree,
    pub skip: SkipSet,
    pub cache: LineCache,
}

impl Session {
    pub fn new(tree: TrackedTree, skip: SkipSet) -> Self {
        Self {
            tree,
            skip,
            cache: LineCache::new(),
        }
    }

    pub fn find_ref(&self, reference: &str, item: &Path) -> ResolveResult<MatchResult> {
        ReferenceResolver::new(&self.cache, &self.skip).find_ref(reference, &self.tree, item)
    }

    pub fn find_file_ref(
        &self,
        ref_path: &str,
        item: &Path,
        keyword: Option<&str>,
    ) -> ResolveResult<MatchResult> {
        ReferenceResolver::new(&self.cache, &self.skip).find_file_ref(
            ref_path,
            self.tree.root(),
            &self.tree,
            item,
            keyword,
        )
    }
}

pub struct FindOptions {
    pub root: Option<PathBuf>,
    pub item: Option<PathBuf>,
    pub skip_ext: Vec<String>,
    pub no_default_skip: bool,
    pub json: bool,
}

pub fn run_find(
    opts: FindOptions,
    references: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = opts.root.unwrap_or_else(default_root);
    let settings = Settings::load(&root);
    let skip = settings.skip_set(&opts.skip_ext, opts.no_default_skip);
    let item = item_path(opts.item);

    let session = Session::new(open_tree(&root), skip);

    let mut missing = 0usize;
    for reference in &references {
        match session.find_ref(reference, &item) {
            Ok(found) => print_match(&found, opts.json),
            Err(err) => {
                error!("{err}");
                missing += 1;
            }
        }
    }

    info!(
        "resolved {}/{} references ({} cached files)",
        references.len() - missing,
        references.len(),
        session.cache.len()
    );

    if missing > 0 {
        std::process::exit(1);
    }
    Ok(())
}

pub fn run_find_file(
    root: Option<PathBuf>,
    item: Option<PathBuf>,
    keyword: Option<String>,
    json: bool,
    ref_path: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = root.unwrap_or_else(default_root);
    let item = item_path(item);

    let session = Session::new(open_tree(&root), SkipSet::default());

    match session.find_file_ref(&ref_path, &item, keyword.as_deref()) {
        Ok(found) => print_match(&found, json),
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub fn run_tracked(root: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let root = root.unwrap_or_else(default_root);
    let tree = open_tree(&root);

    for file in &tree {
        println!("{}", file.relpath);
    }

    Ok(())
}
