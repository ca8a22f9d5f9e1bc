//! Snapshot persistence for suspended battles.
//!
//! Two backends share the [`SnapshotRepository`] contract: a file store that
//! writes atomically through a temp file and rename, and an in-memory store
//! for tests and bulk simulation.
mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSnapshotRepository;
pub use memory::InMemorySnapshotRepository;
pub use traits::SnapshotRepository;
