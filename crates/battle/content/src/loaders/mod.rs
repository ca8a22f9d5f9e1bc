//! Content loaders for reading battle data from files.
//!
//! Each loader converts one RON/TOML file into battle-core or roster types.
//! [`ContentFactory`] ties them to a data directory layout.

pub mod arena;
pub mod config;
pub mod factory;
pub mod roster;

pub use arena::ArenaLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use roster::RosterLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Reads a whole data file.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}
