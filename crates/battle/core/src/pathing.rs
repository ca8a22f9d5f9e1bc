//! Hazard-weighted movement costs and shortest paths.
//!
//! Hazards are never forbidden outright. Each carries a movement cost well
//! above a floor step so that cost-based search only crosses them when no
//! cheaper route exists. All searches break ties on (cost, steps, raster
//! position) so results never depend on heap internals.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use crate::state::{BattleState, EntityId, Position, TileKind};

/// Cost of entering a floor tile.
pub const FLOOR_COST: u32 = 1;

/// Steps searched around a tile when counting escape routes.
pub const ESCAPE_RADIUS: u32 = 2;

/// True for any tile carrying damage-on-step or a movement penalty.
pub fn tile_is_hazard(state: &BattleState, x: i32, y: i32) -> bool {
    state
        .arena
        .grid
        .get(Position::new(x, y))
        .and_then(TileKind::hazard)
        .is_some()
}

/// Cost of entering `tile`, or `None` for impassable tiles.
pub fn movement_cost(tile: TileKind) -> Option<u32> {
    match tile {
        TileKind::Floor => Some(FLOOR_COST),
        TileKind::Wall => None,
        TileKind::Hazard(kind) => Some(kind.movement_cost()),
    }
}

/// Cost above a normal floor step (0 for floor, walls and out-of-bounds).
pub fn hazard_cost(state: &BattleState, position: Position) -> u32 {
    state
        .arena
        .grid
        .get(position)
        .and_then(movement_cost)
        .map_or(0, |cost| cost - FLOOR_COST)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Node {
    cost: u32,
    steps: u32,
    position: Position,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.steps.cmp(&self.steps))
            .then_with(|| other.position.raster_key().cmp(&self.position.raster_key()))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest hazard-weighted cost from `from` to `to` over terrain only.
///
/// Occupants are ignored; this is the cost model used for scoring. Returns
/// `None` when `to` is walled off.
pub fn cheapest_path(state: &BattleState, from: Position, to: Position) -> Option<u32> {
    let grid = &state.arena.grid;
    if !grid.is_walkable(to) {
        return None;
    }
    if from == to {
        return Some(0);
    }

    let mut best: BTreeMap<Position, u32> = BTreeMap::new();
    let mut open = BinaryHeap::new();
    best.insert(from, 0);
    open.push(Node {
        cost: 0,
        steps: 0,
        position: from,
    });

    while let Some(node) = open.pop() {
        if node.position == to {
            return Some(node.cost);
        }
        if best.get(&node.position).is_some_and(|&c| c < node.cost) {
            continue;
        }
        for next in node.position.neighbors() {
            let Some(step) = grid.get(next).and_then(movement_cost) else {
                continue;
            };
            let cost = node.cost + step;
            if best.get(&next).is_none_or(|&c| cost < c) {
                best.insert(next, cost);
                open.push(Node {
                    cost,
                    steps: node.steps + 1,
                    position: next,
                });
            }
        }
    }

    None
}

/// One tile a mover can end its turn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reach {
    pub steps: u32,
    /// Hazard-weighted cost of the cheapest route within the step budget.
    pub cost: u32,
}

/// Every destination a mover can reach this turn, with routes.
#[derive(Clone, Debug, Default)]
pub struct Reachability {
    origin: Position,
    best: BTreeMap<Position, (u32, u32)>,
    parents: BTreeMap<(Position, u32), (Position, u32)>,
}

impl Reachability {
    /// Destinations excluding the origin, in raster order.
    pub fn destinations(&self) -> impl Iterator<Item = (Position, Reach)> + '_ {
        let mut out: Vec<_> = self
            .best
            .iter()
            .filter(|(p, _)| **p != self.origin)
            .map(|(&p, &(cost, steps))| (p, Reach { steps, cost }))
            .collect();
        out.sort_by_key(|(p, _)| p.raster_key());
        out.into_iter()
    }

    pub fn get(&self, position: Position) -> Option<Reach> {
        self.best
            .get(&position)
            .map(|&(cost, steps)| Reach { steps, cost })
    }

    pub fn contains(&self, position: Position) -> bool {
        position != self.origin && self.best.contains_key(&position)
    }

    /// Tiles entered on the way to `to`, excluding the origin.
    pub fn path_to(&self, to: Position) -> Option<Vec<Position>> {
        let &(_, steps) = self.best.get(&to)?;
        let mut path = Vec::with_capacity(steps as usize);
        let mut cursor = (to, steps);
        while cursor.1 > 0 {
            path.push(cursor.0);
            cursor = *self.parents.get(&cursor)?;
        }
        path.reverse();
        Some(path)
    }
}

/// Tiles `mover` can reach from `from` in at most `range` steps through
/// walkable, unoccupied tiles.
pub fn reachable_tiles(
    state: &BattleState,
    from: Position,
    range: u32,
    mover: EntityId,
) -> Reachability {
    let grid = &state.arena.grid;
    let mut reach = Reachability {
        origin: from,
        ..Reachability::default()
    };
    let mut settled: BTreeMap<(Position, u32), u32> = BTreeMap::new();
    let mut open = BinaryHeap::new();
    settled.insert((from, 0), 0);
    reach.best.insert(from, (0, 0));
    open.push(Node {
        cost: 0,
        steps: 0,
        position: from,
    });

    while let Some(node) = open.pop() {
        if settled
            .get(&(node.position, node.steps))
            .is_some_and(|&c| c < node.cost)
        {
            continue;
        }
        if node.steps >= range {
            continue;
        }
        for next in node.position.neighbors() {
            if !state.is_free(next, Some(mover)) {
                continue;
            }
            let Some(step) = grid.get(next).and_then(movement_cost) else {
                continue;
            };
            let cost = node.cost + step;
            let steps = node.steps + 1;
            if settled.get(&(next, steps)).is_some_and(|&c| c <= cost) {
                continue;
            }
            settled.insert((next, steps), cost);
            reach
                .parents
                .insert((next, steps), (node.position, node.steps));

            let improves = reach
                .best
                .get(&next)
                .is_none_or(|&(c, s)| (cost, steps) < (c, s));
            if improves {
                reach.best.insert(next, (cost, steps));
            }
            open.push(Node {
                cost,
                steps,
                position: next,
            });
        }
    }

    reach
}

/// Extra occupancy assumptions for escape-tile queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscapeQuery {
    /// This combatant's tile is treated as empty.
    pub ignore: Option<EntityId>,
    /// This tile is treated as occupied.
    pub blocker: Option<Position>,
}

/// Number of tiles within [`ESCAPE_RADIUS`] steps of `position` that `mover`
/// can reach and stand on without ending on a hazard.
pub fn count_safe_escape_tiles(state: &BattleState, position: Position, mover: EntityId) -> u32 {
    count_safe_escape_tiles_with(
        state,
        position,
        EscapeQuery {
            ignore: Some(mover),
            blocker: None,
        },
    )
}

pub fn count_safe_escape_tiles_with(
    state: &BattleState,
    position: Position,
    query: EscapeQuery,
) -> u32 {
    let grid = &state.arena.grid;
    let passable = |p: Position| state.is_free(p, query.ignore) && query.blocker != Some(p);

    let mut seen = BTreeSet::from([position]);
    let mut frontier = VecDeque::from([(position, 0u32)]);
    let mut safe = 0;

    while let Some((current, depth)) = frontier.pop_front() {
        if depth >= ESCAPE_RADIUS {
            continue;
        }
        for next in current.neighbors() {
            if !seen.insert(next) || !passable(next) {
                continue;
            }
            if grid.get(next).and_then(TileKind::hazard).is_none() {
                safe += 1;
            }
            frontier.push_back((next, depth + 1));
        }
    }

    safe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::HazardKind;
    use crate::builder::{StateBuilder, enemy};

    #[test]
    fn lava_cost_dwarfs_floor() {
        let lava = movement_cost(TileKind::Hazard(HazardKind::Lava)).unwrap();
        assert!(lava >= 100 * FLOOR_COST);
        assert_eq!(movement_cost(TileKind::Wall), None);
    }

    #[test]
    fn cheapest_path_detours_around_lava() {
        // Lava column with a gap at the bottom row.
        let state = StateBuilder::open(9, 7)
            .hazard_column(4, 1..5, HazardKind::Lava)
            .build();
        let cost = cheapest_path(&state, Position::new(2, 2), Position::new(6, 2)).unwrap();
        // Straight line is 4 steps with lava; detour through row 5 is cheaper.
        assert!(cost < 150);
        assert_eq!(cost, 10);
    }

    #[test]
    fn cheapest_path_crosses_lava_when_forced() {
        let state = StateBuilder::open(9, 7)
            .hazard_column(4, 1..6, HazardKind::Lava)
            .build();
        let cost = cheapest_path(&state, Position::new(2, 3), Position::new(6, 3)).unwrap();
        assert_eq!(cost, 3 + 150);
    }

    #[test]
    fn reachable_excludes_occupied_tiles() {
        let state = StateBuilder::open(9, 7)
            .player_at(Position::new(1, 1))
            .enemy(enemy(1, Position::new(3, 3)))
            .enemy(enemy(2, Position::new(4, 3)))
            .build();
        let reach = reachable_tiles(&state, Position::new(3, 3), 2, EntityId(1));
        assert!(!reach.contains(Position::new(4, 3)));
        assert!(reach.contains(Position::new(3, 5)));
        assert!(!reach.contains(Position::new(3, 3)));
        let path = reach.path_to(Position::new(3, 5)).unwrap();
        assert_eq!(path, vec![Position::new(3, 4), Position::new(3, 5)]);
    }

    #[test]
    fn escape_tiles_shrink_in_corners() {
        let state = StateBuilder::open(9, 7)
            .player_at(Position::new(1, 1))
            .build();
        let corner = count_safe_escape_tiles(&state, Position::new(1, 1), EntityId::PLAYER);
        let center = count_safe_escape_tiles(&state, Position::new(4, 3), EntityId::PLAYER);
        assert_eq!(corner, 5);
        assert_eq!(center, 12);
    }

    #[test]
    fn escape_tiles_ignore_hazard_endpoints() {
        let state = StateBuilder::open(9, 7)
            .player_at(Position::new(4, 3))
            .hazard(Position::new(4, 2), HazardKind::Spikes)
            .build();
        let count = count_safe_escape_tiles(&state, Position::new(4, 3), EntityId::PLAYER);
        assert_eq!(count, 11);
    }
}
