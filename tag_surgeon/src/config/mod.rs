//! Various configuration options to control tag_surgeon

mod global_options;
mod write_options;

pub use global_options::{GlobalOptions, apply_global_options};
pub use write_options::{RewriteStrategy, WriteOptions};

pub(crate) use global_options::global_options;
