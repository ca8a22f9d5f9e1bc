//! Deterministic rules for single-encounter tactical battles.
//!
//! `battle-core` owns the battle data model and every rule that mutates it:
//! dice, arena compilation, hazard-aware pathing, action execution, status and
//! cooldown ticks, reinforcement arrivals and the round state machine. It
//! performs no I/O and never logs; each mutating call reports what happened
//! through an [`Outbox`]. Given the same state and the same decisions, every
//! call produces the same result.
pub mod action;
pub mod arena;
pub mod builder;
pub mod combat;
pub mod config;
pub mod dice;
pub mod error;
pub mod pathing;
pub mod reinforcement;
pub mod round;
pub mod setup;
#[cfg(feature = "serde")]
pub mod snapshot;
pub mod state;
pub mod turn;

pub use action::{
    ActionKind, BattleAction, BattleEvent, CommandError, DamageSource, Outbox, PlayerCommand,
    execute_action, execute_player_command, is_valid_target, valid_targets, validate_command,
};
pub use arena::{Arena, ArenaError, ArenaTemplate, ArenaTheme, TemplatePool, compile_arena};
pub use builder::StateBuilder;
pub use combat::{damage_ceiling, estimate_damage, is_kill_shot};
pub use config::{BattleConfig, NoiseWeights, RangeBand, ReinforcementCaps};
pub use dice::{BattleRng, DiceEngine, DiceNotation, RollMode, compute_seed};
pub use error::{BattleError, ErrorSeverity};
pub use pathing::{
    Reachability, cheapest_path, count_safe_escape_tiles, hazard_cost, movement_cost,
    reachable_tiles, tile_is_hazard,
};
pub use reinforcement::{ReinforcementTick, WorldCombatant, plan_reinforcements};
pub use round::process_end_of_round;
pub use setup::{EncounterSetup, start_battle};
#[cfg(feature = "serde")]
pub use snapshot::{DeserializationError, EncodeError, decode_snapshot, encode_snapshot};
pub use state::{
    AbilityDef, AbilityEffect, AbilityKind, BattleEntity, BattleOutcome, BattlePhase, BattleState,
    Behavior, BossArchetype, Classification, CombatantSnapshot, Direction, EncounterSize,
    EntityFlags, EntityId, HazardKind, InvariantViolation, PendingReinforcement, Position, Side,
    StatusKind, TileGrid, TileKind, WorldId,
};
pub use turn::{ActionDecider, Passive, RoundReport, enemy_phase, end_of_round, player_phase, run_round};
