//! The complete mutable state of one encounter.

use std::collections::BTreeSet;

use super::common::{EntityId, Position, Side};
use super::entity::BattleEntity;
use super::reinforcement::PendingReinforcement;
use crate::arena::Arena;
use crate::config::BattleConfig;
use crate::dice::BattleRng;
use crate::error::{BattleError, ErrorSeverity};

/// Battle state machine phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    Pending,
    PlayerTurn,
    EnemyTurn,
    EndOfRound,
}

/// Final (or not yet final) result of the encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleOutcome {
    #[default]
    Pending,
    Victory,
    Defeat,
    Flee,
}

impl BattleOutcome {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, BattleOutcome::Pending)
    }
}

/// Consistency rules a [`BattleState`] must satisfy at every turn boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("turn order contains defeated entity {0}")]
    DeadInTurnOrder(EntityId),

    #[error("turn order contains unknown entity {0}")]
    UnknownInTurnOrder(EntityId),

    #[error("living entity {0} missing from turn order")]
    MissingFromTurnOrder(EntityId),

    #[error("turn order lists {0} more than once")]
    DuplicateInTurnOrder(EntityId),

    #[error("active index {index} out of range for {len} entries")]
    ActiveIndexOutOfRange { index: usize, len: usize },

    #[error("entity id {0} is used more than once")]
    DuplicateEntityId(EntityId),

    #[error("entity {id} has hp {hp} outside 0..={max_hp}")]
    HpOutOfRange { id: EntityId, hp: i32, max_hp: i32 },

    #[error("entity {id} stands on non-walkable tile {position}")]
    InvalidPosition { id: EntityId, position: Position },

    #[error("entities {0} and {1} share a tile")]
    SharedTile(EntityId, EntityId),

    #[error("arena grid is {actual} tiles, expected {expected}")]
    GridSizeMismatch { expected: usize, actual: usize },

    #[error("reinforcements exceed cap: {queued} queued + {spawned} spawned > {cap}")]
    ReinforcementCapExceeded { queued: u32, spawned: u32, cap: u32 },

    #[error("reinforcement {0} has zero countdown without a recorded delay")]
    StaleReinforcement(u64),

    #[error("player entity has id {0} or wrong side")]
    InvalidPlayer(EntityId),

    #[error("next entity id {next} does not exceed used id {used}")]
    IdCounterBehind { next: u32, used: u32 },
}

impl BattleError for InvariantViolation {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DeadInTurnOrder(_) => "INVARIANT_DEAD_IN_TURN_ORDER",
            Self::UnknownInTurnOrder(_) => "INVARIANT_UNKNOWN_IN_TURN_ORDER",
            Self::MissingFromTurnOrder(_) => "INVARIANT_MISSING_FROM_TURN_ORDER",
            Self::DuplicateInTurnOrder(_) => "INVARIANT_DUPLICATE_IN_TURN_ORDER",
            Self::ActiveIndexOutOfRange { .. } => "INVARIANT_ACTIVE_INDEX",
            Self::DuplicateEntityId(_) => "INVARIANT_DUPLICATE_ENTITY",
            Self::HpOutOfRange { .. } => "INVARIANT_HP_RANGE",
            Self::InvalidPosition { .. } => "INVARIANT_POSITION",
            Self::SharedTile(..) => "INVARIANT_SHARED_TILE",
            Self::GridSizeMismatch { .. } => "INVARIANT_GRID_SIZE",
            Self::ReinforcementCapExceeded { .. } => "INVARIANT_REINFORCEMENT_CAP",
            Self::StaleReinforcement(_) => "INVARIANT_STALE_REINFORCEMENT",
            Self::InvalidPlayer(_) => "INVARIANT_PLAYER",
            Self::IdCounterBehind { .. } => "INVARIANT_ID_COUNTER",
        }
    }
}

/// Everything needed to continue an encounter exactly, including the dice
/// stream position.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    pub config: BattleConfig,
    pub arena: Arena,
    pub is_boss: bool,

    pub player: BattleEntity,
    pub enemies: Vec<BattleEntity>,

    pub reinforcements: Vec<PendingReinforcement>,
    pub reinforcement_cap: u32,
    pub reinforcements_spawned: u32,
    /// World-space position where the encounter was triggered.
    pub origin: Position,
    /// Pressure accumulated from player actions.
    pub noise: u32,

    /// Round number, starting at 1.
    pub turn: u32,
    pub phase: BattlePhase,
    pub turn_order: Vec<EntityId>,
    pub active_index: usize,
    pub outcome: BattleOutcome,

    pub seed: u64,
    pub rng: BattleRng,
    pub next_entity_id: u32,
    pub potions: u32,
}

impl BattleState {
    // ===== lookups =====

    pub fn entity(&self, id: EntityId) -> Option<&BattleEntity> {
        if self.player.id == id {
            return Some(&self.player);
        }
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut BattleEntity> {
        if self.player.id == id {
            return Some(&mut self.player);
        }
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Player first, then enemies in roster order.
    pub fn all_entities(&self) -> impl Iterator<Item = &BattleEntity> {
        std::iter::once(&self.player).chain(self.enemies.iter())
    }

    pub fn living_entities(&self) -> impl Iterator<Item = &BattleEntity> {
        self.all_entities().filter(|e| e.is_alive())
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &BattleEntity> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    /// Living combatants on the opposite side of `actor`.
    pub fn hostiles_of<'a>(
        &'a self,
        actor: &'a BattleEntity,
    ) -> impl Iterator<Item = &'a BattleEntity> + 'a {
        self.living_entities().filter(move |e| e.is_hostile_to(actor))
    }

    /// Living summons controlled by `summoner`.
    pub fn minion_count(&self, summoner: EntityId) -> u32 {
        self.living_enemies()
            .filter(|e| e.summoner == Some(summoner))
            .count() as u32
    }

    pub fn occupant_at(&self, position: Position) -> Option<&BattleEntity> {
        self.living_entities().find(|e| e.position == position)
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.occupant_at(position).is_some()
    }

    /// Walkable and not held by any living combatant other than `ignore`.
    pub fn is_free(&self, position: Position, ignore: Option<EntityId>) -> bool {
        self.arena.grid.is_walkable(position)
            && self
                .occupant_at(position)
                .is_none_or(|occupant| Some(occupant.id) == ignore)
    }

    /// Living hostile combatants adjacent to `position`.
    pub fn adjacent_hostiles(&self, position: Position, side: Side) -> u32 {
        self.living_entities()
            .filter(|e| e.side != side && e.position.manhattan(position) == 1)
            .count() as u32
    }

    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn is_active(&self) -> bool {
        !self.outcome.is_terminal() && self.phase != BattlePhase::Pending
    }

    // ===== turn order =====

    /// Rebuilds the turn order from the living set.
    ///
    /// Sorted by initiative (descending); ties put the player first, then the
    /// lower entity id.
    pub fn recompute_turn_order(&mut self) {
        let mut living: Vec<(i32, bool, EntityId)> = self
            .living_entities()
            .map(|e| (e.initiative, e.id.is_player(), e.id))
            .collect();
        living.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.2.cmp(&b.2))
        });
        let active = self.turn_order.get(self.active_index).copied();
        self.turn_order = living.into_iter().map(|(_, _, id)| id).collect();
        self.active_index = active
            .and_then(|id| self.turn_order.iter().position(|&t| t == id))
            .unwrap_or(0);
    }

    /// Points the active index at `id` if it is in the turn order.
    pub fn set_active(&mut self, id: EntityId) {
        if let Some(index) = self.turn_order.iter().position(|&t| t == id) {
            self.active_index = index;
        }
    }

    /// Resolves the outcome from the living set. Flee is set by the command
    /// handler and is never overwritten here.
    pub fn check_outcome(&mut self) -> BattleOutcome {
        if self.outcome.is_terminal() {
            return self.outcome;
        }
        if !self.player.is_alive() {
            self.outcome = BattleOutcome::Defeat;
        } else if self.living_enemies().next().is_none() {
            self.outcome = BattleOutcome::Victory;
        }
        self.outcome
    }

    // ===== validation =====

    /// Checks every structural invariant. Used after decoding a snapshot.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let grid = &self.arena.grid;
        let expected = (grid.width() as usize) * (grid.height() as usize);
        if grid.tile_count() != expected {
            return Err(InvariantViolation::GridSizeMismatch {
                expected,
                actual: grid.tile_count(),
            });
        }

        if !self.player.id.is_player() || self.player.side != Side::Player {
            return Err(InvariantViolation::InvalidPlayer(self.player.id));
        }

        let mut ids = BTreeSet::new();
        let mut occupied = std::collections::BTreeMap::new();
        for entity in self.all_entities() {
            if !ids.insert(entity.id) {
                return Err(InvariantViolation::DuplicateEntityId(entity.id));
            }
            if entity.id.0 >= self.next_entity_id {
                return Err(InvariantViolation::IdCounterBehind {
                    next: self.next_entity_id,
                    used: entity.id.0,
                });
            }
            if entity.hp() < 0 || entity.hp() > entity.max_hp() {
                return Err(InvariantViolation::HpOutOfRange {
                    id: entity.id,
                    hp: entity.hp(),
                    max_hp: entity.max_hp(),
                });
            }
            if !entity.is_alive() {
                continue;
            }
            if !grid.is_walkable(entity.position) {
                return Err(InvariantViolation::InvalidPosition {
                    id: entity.id,
                    position: entity.position,
                });
            }
            if let Some(other) = occupied.insert(entity.position, entity.id) {
                return Err(InvariantViolation::SharedTile(other, entity.id));
            }
        }

        let mut seen = BTreeSet::new();
        for &id in &self.turn_order {
            let entity = self
                .entity(id)
                .ok_or(InvariantViolation::UnknownInTurnOrder(id))?;
            if !entity.is_alive() {
                return Err(InvariantViolation::DeadInTurnOrder(id));
            }
            if !seen.insert(id) {
                return Err(InvariantViolation::DuplicateInTurnOrder(id));
            }
        }
        if let Some(missing) = self.living_entities().find(|e| !seen.contains(&e.id)) {
            return Err(InvariantViolation::MissingFromTurnOrder(missing.id));
        }
        if !self.turn_order.is_empty() && self.active_index >= self.turn_order.len() {
            return Err(InvariantViolation::ActiveIndexOutOfRange {
                index: self.active_index,
                len: self.turn_order.len(),
            });
        }

        let queued = self.reinforcements.len() as u32;
        if queued + self.reinforcements_spawned > self.reinforcement_cap {
            return Err(InvariantViolation::ReinforcementCapExceeded {
                queued,
                spawned: self.reinforcements_spawned,
                cap: self.reinforcement_cap,
            });
        }
        if let Some(stale) = self
            .reinforcements
            .iter()
            .find(|r| r.turns_until_arrival == 0 && r.delayed_rounds == 0)
        {
            return Err(InvariantViolation::StaleReinforcement(stale.world_id.0));
        }

        Ok(())
    }
}
