//! Data-driven battle content and loaders.
//!
//! This crate houses static encounter content and loads it from RON/TOML:
//! - Enemy roster (stats, behavior, boss archetype, abilities) via RON
//! - Additional arena templates via RON
//! - Engine tuning (`BattleConfig`) via TOML
//!
//! Content feeds the runtime's world registry and template pool; it never
//! appears inside a `BattleState` except as copied combatant snapshots.

pub mod roster;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use roster::{EnemyTemplate, Roster, RosterError};

#[cfg(feature = "loaders")]
pub use loaders::{ArenaLoader, ConfigLoader, ContentFactory, RosterLoader};
