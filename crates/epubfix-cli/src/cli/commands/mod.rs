//! CLI command handlers.

mod fix;

pub use fix::run_fix;
