mod error;
mod tree;

pub use error::TreeError;
pub use tree::{TrackedTree, TreeSource, git_tracked_files, walk_tracked_files};
