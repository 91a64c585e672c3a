//! CLI command handlers, one per file.

mod get;
mod name;

pub use get::run_get;
pub use name::run_name;
