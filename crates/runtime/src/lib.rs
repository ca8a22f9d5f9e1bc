//! Battle orchestration on top of `battle-core`.
//!
//! The runtime owns everything the rules crate deliberately leaves out:
//!
//! - [`ai`]: candidate enumeration, utility scoring, kiting and boss rules
//! - [`manager`]: the [`BattleManager`] driving one encounter at a time
//! - [`world`]: the registry battles read combatants from and sync back into
//! - [`events`]: event sinks, the broadcast bus and the narration buffer
//! - [`repository`]: snapshot persistence for suspend and resume
//!
//! Everything here logs through `tracing`; the core stays silent and reports
//! through the `Outbox` the manager drains.
pub mod ai;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod repository;
pub mod world;

pub use ai::{
    BossDecision, CandidateAction, Score, ScoredCandidate, TacticalAi, choose_action,
    decide_action, enumerate_candidate_actions, score_action, suggest_command,
};
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use events::{EventBus, EventSink, MessageBuffer, RecordingSink, Topic};
pub use manager::{BattleManager, BattleSummary};
pub use repository::{
    FileSnapshotRepository, InMemorySnapshotRepository, RepositoryError, SnapshotRepository,
};
pub use world::{InMemoryWorld, WorldRegistry};
