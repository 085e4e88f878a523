pub mod cache;
pub mod error;
pub mod model;
pub mod pattern;
pub mod resolver;
pub mod text;

pub use cache::{DirectLines, LineCache, LineSource};
pub use error::{ResolveError, ResolveResult, UnreadableFile};
pub use model::{MatchResult, SkipSet, TrackedFile, split_extension};
pub use pattern::token_regex;
pub use resolver::ReferenceResolver;
pub use text::read_lines;
