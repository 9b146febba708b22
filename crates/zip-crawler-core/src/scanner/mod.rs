pub mod probe;
pub mod remove;
pub mod walk;

pub use probe::{FsProbe, SizeProbe};
pub use remove::{FileRemover, FsRemover};
pub use walk::list_top_level_files;
