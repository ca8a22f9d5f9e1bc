//! Target legality and placement queries shared by executors and the AI.

use std::collections::{BTreeSet, VecDeque};

use crate::pathing::{EscapeQuery, count_safe_escape_tiles_with};
use crate::state::{AbilityEffect, AbilityKind, BattleEntity, BattleState, EntityId, Position};

/// Summons appear within this many steps of their summoner.
const SUMMON_RADIUS: u32 = 3;

/// Whether `actor`, standing at `from`, may use `ability` on `target`.
pub fn is_valid_target(
    state: &BattleState,
    actor: &BattleEntity,
    from: Position,
    ability: AbilityKind,
    target: &BattleEntity,
) -> bool {
    let def = ability.def();
    if def.self_target {
        return target.id == actor.id && self_effect_applies(state, actor, ability);
    }
    if !target.is_alive() || !target.is_hostile_to(actor) {
        return false;
    }
    let distance = from.manhattan(target.position);
    if distance == 0 || distance > def.range {
        return false;
    }
    !(target.statuses.is_hidden() && distance > 1)
}

fn self_effect_applies(state: &BattleState, actor: &BattleEntity, ability: AbilityKind) -> bool {
    match ability.def().effect {
        AbilityEffect::Summon { .. } => {
            state.minion_count(actor.id) < state.config.summon_cap
                && !summon_tiles(state, actor, 1).is_empty()
        }
        AbilityEffect::Reposition { max_distance } => {
            reposition_destination(state, actor, max_distance).is_some()
        }
        AbilityEffect::Buff | AbilityEffect::Strike => true,
    }
}

/// Legal targets of `ability` for `actor`, ordered by target raster position.
pub fn valid_targets(state: &BattleState, actor: &BattleEntity, ability: AbilityKind) -> Vec<EntityId> {
    if ability.def().self_target {
        return if is_valid_target(state, actor, actor.position, ability, actor) {
            vec![actor.id]
        } else {
            Vec::new()
        };
    }
    let mut targets: Vec<&BattleEntity> = state
        .hostiles_of(actor)
        .filter(|t| is_valid_target(state, actor, actor.position, ability, t))
        .collect();
    targets.sort_by_key(|t| (t.position.raster_key(), t.id));
    targets.into_iter().map(|t| t.id).collect()
}

fn nearest_hostile_distance(state: &BattleState, actor: &BattleEntity, at: Position) -> u32 {
    state
        .hostiles_of(actor)
        .map(|h| h.position.manhattan(at))
        .min()
        .unwrap_or(u32::MAX)
}

/// Landing tile for a teleport: the free, non-hazard tile within
/// `max_distance` that is farthest from every hostile, then has the most
/// escape routes, then comes first in raster order. Only tiles farther from
/// the nearest hostile than the current one qualify.
pub fn reposition_destination(
    state: &BattleState,
    actor: &BattleEntity,
    max_distance: u32,
) -> Option<Position> {
    let grid = &state.arena.grid;
    let current = nearest_hostile_distance(state, actor, actor.position);

    let mut best: Option<((u32, u32), Position)> = None;
    for position in grid.positions() {
        let distance = position.manhattan(actor.position);
        if distance == 0 || distance > max_distance {
            continue;
        }
        if !state.is_free(position, Some(actor.id)) || grid.get(position).and_then(|t| t.hazard()).is_some() {
            continue;
        }
        let separation = nearest_hostile_distance(state, actor, position);
        if separation <= current {
            continue;
        }
        let escapes = count_safe_escape_tiles_with(
            state,
            position,
            EscapeQuery {
                ignore: Some(actor.id),
                blocker: None,
            },
        );
        let key = (separation, escapes);
        if best.is_none_or(|(best_key, _)| key > best_key) {
            best = Some((key, position));
        }
    }

    best.map(|(_, position)| position)
}

fn breadth_first(
    state: &BattleState,
    start: Position,
    radius: Option<u32>,
    mut accept: impl FnMut(Position) -> bool,
) {
    let grid = &state.arena.grid;
    let mut seen = BTreeSet::from([start]);
    let mut frontier = VecDeque::from([(start, 0u32)]);
    while let Some((current, depth)) = frontier.pop_front() {
        if !accept(current) {
            return;
        }
        if radius.is_some_and(|r| depth >= r) {
            continue;
        }
        for next in current.neighbors() {
            if grid.is_walkable(next) && seen.insert(next) {
                frontier.push_back((next, depth + 1));
            }
        }
    }
}

fn is_safe_free(state: &BattleState, position: Position) -> bool {
    state.is_free(position, None)
        && state
            .arena
            .grid
            .get(position)
            .and_then(|t| t.hazard())
            .is_none()
}

/// Up to `count` free, non-hazard tiles near `summoner`, nearest first.
pub fn summon_tiles(state: &BattleState, summoner: &BattleEntity, count: u32) -> Vec<Position> {
    let mut tiles = Vec::new();
    breadth_first(state, summoner.position, Some(SUMMON_RADIUS), |p| {
        if p != summoner.position && is_safe_free(state, p) {
            tiles.push(p);
        }
        (tiles.len() as u32) < count
    });
    tiles
}

/// Closest free, non-hazard tile to `around` (possibly `around` itself).
pub fn nearest_free_tile(state: &BattleState, around: Position) -> Option<Position> {
    let mut found = None;
    breadth_first(state, around, None, |p| {
        if is_safe_free(state, p) {
            found = Some(p);
            return false;
        }
        true
    });
    found
}
