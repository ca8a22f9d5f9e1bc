//! Battle data model.
//!
//! [`BattleState`] is the single mutable struct every other component reads
//! and writes. It is self-contained: arena, combatants, reinforcement queue,
//! turn bookkeeping, tuning and the dice generator all live inside it, so two
//! battles never share anything.

mod ability;
mod battle;
mod common;
mod entity;
mod reinforcement;
mod status;
mod tile;

pub use ability::{AbilityDef, AbilityEffect, AbilityKind};
pub use battle::{BattleOutcome, BattlePhase, BattleState, InvariantViolation};
pub use common::{Direction, EntityId, Position, Side, WorldId};
pub use entity::{
    AbilityList, BattleEntity, Behavior, BossArchetype, Classification, CombatantSnapshot,
    EntityFlags,
};
pub use reinforcement::{EncounterSize, PendingReinforcement};
pub use status::{StatusEffect, StatusEffects, StatusKind, StatusTick};
pub use tile::{HazardEffect, HazardKind, TileGrid, TileKind};
