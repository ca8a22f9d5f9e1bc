//! Off-arena reinforcements: planning at battle start and arrival ticks.
//!
//! # Arrival
//!
//! ```text
//! turns_until_arrival = max(min_arrival, distance * factor / 100 + min_arrival)
//! ```
//!
//! Countdowns only ever decrease. A reinforcement whose countdown reaches
//! zero is placed on the entry edge facing the direction it approaches from.
//! When no entry tile is free anywhere, it waits at zero and retries next
//! round instead of being dropped.

use std::collections::BTreeSet;

use crate::action::{Outbox, roll_initiative};
use crate::config::BattleConfig;
use crate::state::{
    BattleEntity, BattleState, CombatantSnapshot, Direction, EncounterSize, EntityId,
    PendingReinforcement, Position, Side, WorldId,
};

/// A combatant as it exists in the world registry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldCombatant {
    pub world_id: WorldId,
    pub position: Position,
    pub snapshot: CombatantSnapshot,
}

/// Arrival countdown for a reinforcement `distance` tiles from the origin.
pub fn arrival_turns(config: &BattleConfig, distance: u32) -> u32 {
    let scaled = distance * config.arrival_factor_percent / 100;
    (scaled + config.min_arrival).max(config.min_arrival)
}

/// Builds the reinforcement queue for a new encounter.
///
/// Scans living, non-boss world combatants within the detection radius that
/// are not already engaged, nearest first (ties by world id), takes up to the
/// encounter cap and sorts the result by arrival time.
pub fn plan_reinforcements(
    config: &BattleConfig,
    size: EncounterSize,
    origin: Position,
    nearby: &[WorldCombatant],
    engaged: &BTreeSet<WorldId>,
) -> Vec<PendingReinforcement> {
    let cap = config.reinforcement_caps.for_size(size) as usize;

    let mut candidates: Vec<(u32, &WorldCombatant)> = nearby
        .iter()
        .filter(|c| c.snapshot.hp > 0 && !c.snapshot.is_boss())
        .filter(|c| !engaged.contains(&c.world_id))
        .map(|c| (c.position.manhattan(origin), c))
        .filter(|&(distance, _)| distance <= config.detection_radius)
        .collect();
    candidates.sort_by_key(|&(distance, c)| (distance, c.world_id));

    let mut queue: Vec<PendingReinforcement> = candidates
        .into_iter()
        .take(cap)
        .map(|(distance, c)| {
            PendingReinforcement::new(
                c.world_id,
                c.snapshot.clone(),
                c.position,
                arrival_turns(config, distance),
            )
        })
        .collect();
    queue.sort_by_key(|r| r.turns_until_arrival);
    queue
}

/// Edge the reinforcement approaches from, relative to the encounter origin.
///
/// The axis with the larger world-space delta decides; a tie picks the
/// higher-priority edge of the two candidates (North, East, South, West).
pub fn approach_edge(origin: Position, from: Position) -> Direction {
    let dx = from.x - origin.x;
    let dy = from.y - origin.y;
    let horizontal = if dx >= 0 {
        Direction::East
    } else {
        Direction::West
    };
    let vertical = if dy > 0 {
        Direction::South
    } else {
        Direction::North
    };

    match dx.unsigned_abs().cmp(&dy.unsigned_abs()) {
        std::cmp::Ordering::Greater => horizontal,
        std::cmp::Ordering::Less => vertical,
        std::cmp::Ordering::Equal => horizontal.min(vertical),
    }
}

/// `primary` first, then the remaining edges in priority order.
pub fn edge_order(primary: Direction) -> [Direction; 4] {
    let mut order = [primary; 4];
    let mut slot = 1;
    for edge in Direction::ALL {
        if edge != primary {
            order[slot] = edge;
            slot += 1;
        }
    }
    order
}

/// Free entry tile for an arrival from `from`, trying edges in order.
pub fn find_entry_tile(state: &BattleState, from: Position) -> Option<Position> {
    let arena = &state.arena;
    edge_order(approach_edge(state.origin, from))
        .into_iter()
        .find_map(|edge| {
            arena
                .entries_on(edge)
                .filter(|&p| state.is_free(p, None))
                .filter(|&p| arena.grid.get(p).and_then(|t| t.hazard()).is_none())
                .min_by_key(|&p| (arena.border_distance(p, edge), p.raster_key()))
        })
}

/// Result of one reinforcement tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReinforcementTick {
    pub arrived: Vec<(WorldId, EntityId, Position)>,
    pub delayed: Vec<WorldId>,
}

/// Decrements every countdown and materializes due reinforcements.
pub fn tick_reinforcements(state: &mut BattleState, out: &mut Outbox) -> ReinforcementTick {
    let mut report = ReinforcementTick::default();
    let counted: Vec<PendingReinforcement> = state
        .reinforcements
        .iter()
        .map(|r| PendingReinforcement {
            turns_until_arrival: r.turns_until_arrival.saturating_sub(1),
            ..r.clone()
        })
        .collect();

    let mut waiting = Vec::with_capacity(counted.len());
    for pending in counted {
        if !pending.is_due() {
            waiting.push(pending);
            continue;
        }
        match find_entry_tile(state, pending.world_position) {
            Some(tile) => {
                let id = state.allocate_id();
                let initiative = roll_initiative(&mut state.rng, &pending.snapshot);
                let mut entity = BattleEntity::new(
                    id,
                    Side::Enemy,
                    tile,
                    pending.world_position,
                    pending.snapshot,
                )
                .with_world_id(pending.world_id);
                entity.initiative = initiative;
                out.narrate(format!("{} joins the battle at {tile}.", entity.stats.name));
                state.enemies.push(entity);
                state.reinforcements_spawned += 1;
                report.arrived.push((pending.world_id, id, tile));
            }
            None => {
                report.delayed.push(pending.world_id);
                waiting.push(PendingReinforcement {
                    delayed_rounds: pending.delayed_rounds + 1,
                    ..pending
                });
            }
        }
    }

    state.reinforcements = waiting;
    if !report.arrived.is_empty() {
        state.recompute_turn_order();
    }
    report
}
