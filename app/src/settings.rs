use std::path::Path;

use reffind_core::SkipSet;
use serde::Deserialize;
use tracing::{debug, warn};

pub const SETTINGS_FILE: &str = ".reffind.json";
pub const SKIP_EXTS_ENV: &str = "REFFIND_SKIP_EXTS";

/// Resolution settings.
///
/// Built from the defaults, then `.reffind.json` at the tree root, then the
/// `REFFIND_SKIP_EXTS` environment variable (comma separated).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File extensions never searched for content.
    pub skip_exts: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_exts: SkipSet::DEFAULT_EXTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl Settings {
    pub fn load(root: &Path) -> Self {
        let path = root.join(SETTINGS_FILE);
        let file = match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("failed to read {}: {err}", path.display());
                None
            }
        };
        let env = std::env::var(SKIP_EXTS_ENV).ok();
        Self::from_sources(file.as_deref(), env.as_deref())
    }

    pub fn from_sources(file: Option<&str>, env: Option<&str>) -> Self {
        let mut settings = match file {
            Some(text) => match serde_json::from_str::<Settings>(text) {
                Ok(s) => s,
                Err(err) => {
                    warn!("ignoring invalid {SETTINGS_FILE}: {err}");
                    Settings::default()
                }
            },
            None => Settings::default(),
        };

        if let Some(env) = env {
            debug!("{SKIP_EXTS_ENV} overrides skip extensions: {env:?}");
            settings.skip_exts = env
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from)
                .collect();
        }

        settings
    }

    /// Skip set from these settings plus command-line additions.
    pub fn skip_set(&self, extra: &[String], no_default: bool) -> SkipSet {
        let mut set = if no_default {
            SkipSet::default()
        } else {
            SkipSet::new(&self.skip_exts)
        };
        for ext in extra {
            set.insert(ext);
        }
        set
    }
}
