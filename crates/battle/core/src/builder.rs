//! Hand-assembled battle states.
//!
//! [`StateBuilder`] produces a ready-to-play [`BattleState`] without going
//! through arena templates or a world registry. Scenario fixtures, bulk
//! simulations and the tests of every crate build their states with it.

use std::ops::Range;

use crate::arena::{Arena, ArenaTheme};
use crate::config::BattleConfig;
use crate::dice::{BattleRng, DiceNotation};
use crate::state::{
    AbilityKind, BattleEntity, BattleOutcome, BattlePhase, BattleState, Behavior, Classification,
    CombatantSnapshot, EncounterSize, EntityFlags, EntityId, HazardKind, PendingReinforcement,
    Position, Side, TileGrid, TileKind,
};

/// Baseline melee stats used by fixtures.
pub fn grunt(name: &str, hp: i32) -> CombatantSnapshot {
    CombatantSnapshot {
        name: name.to_owned(),
        hp,
        max_hp: hp,
        attack: 3,
        defense: 2,
        speed: 4,
        luck: 0,
        initiative_bonus: 0,
        damage: DiceNotation::new(1, 6, 0),
        abilities: [AbilityKind::BasicAttack].into_iter().collect(),
        flags: EntityFlags::empty(),
        classification: Classification::new(Behavior::Aggressive),
    }
}

/// An aggressive melee enemy with 10 hp at `position`.
pub fn enemy(id: u32, position: Position) -> BattleEntity {
    BattleEntity::new(
        EntityId(id),
        Side::Enemy,
        position,
        position,
        grunt("grunt", 10),
    )
}

/// Default player stats.
pub fn hero(position: Position) -> BattleEntity {
    let mut stats = grunt("hero", 30);
    stats.attack = 4;
    stats.defense = 3;
    stats.abilities = [
        AbilityKind::BasicAttack,
        AbilityKind::PowerStrike,
        AbilityKind::Firebolt,
        AbilityKind::ShieldWall,
    ]
    .into_iter()
    .collect();
    BattleEntity::new(EntityId::PLAYER, Side::Player, position, position, stats)
}

/// Builder for [`BattleState`].
#[derive(Clone, Debug)]
pub struct StateBuilder {
    config: BattleConfig,
    grid: TileGrid,
    entry_edges: Vec<Position>,
    player: BattleEntity,
    enemies: Vec<BattleEntity>,
    reinforcements: Vec<PendingReinforcement>,
    reinforcement_cap: Option<u32>,
    origin: Position,
    seed: u64,
    is_boss: bool,
    turn: u32,
}

impl StateBuilder {
    /// Walled `width` x `height` room with floor inside and one entry tile in
    /// the middle of each side.
    pub fn open(width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self {
            config: BattleConfig::default(),
            grid: TileGrid::walled(width, height),
            entry_edges: vec![
                Position::new(w / 2, 1),
                Position::new(1, h / 2),
                Position::new(w - 2, h / 2),
                Position::new(w / 2, h - 2),
            ],
            player: hero(Position::new(1, 1)),
            enemies: Vec::new(),
            reinforcements: Vec::new(),
            reinforcement_cap: None,
            origin: Position::ORIGIN,
            seed: 0,
            is_boss: false,
            turn: 1,
        }
    }

    /// Starts from a compiled arena, keeping its tiles and entry edges.
    pub fn from_arena(arena: &Arena) -> Self {
        let mut builder = Self::open(arena.width(), arena.height());
        builder.grid = arena.grid.clone();
        builder.entry_edges = arena.entry_edges.clone();
        builder
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tile(mut self, position: Position, tile: TileKind) -> Self {
        self.grid.set(position, tile);
        self
    }

    pub fn wall(self, position: Position) -> Self {
        self.tile(position, TileKind::Wall)
    }

    pub fn hazard(self, position: Position, kind: HazardKind) -> Self {
        self.tile(position, TileKind::Hazard(kind))
    }

    pub fn hazard_column(mut self, x: i32, rows: Range<i32>, kind: HazardKind) -> Self {
        for y in rows {
            self.grid.set(Position::new(x, y), TileKind::Hazard(kind));
        }
        self
    }

    pub fn hazard_row(mut self, y: i32, columns: Range<i32>, kind: HazardKind) -> Self {
        for x in columns {
            self.grid.set(Position::new(x, y), TileKind::Hazard(kind));
        }
        self
    }

    pub fn entry_edges(mut self, edges: Vec<Position>) -> Self {
        self.entry_edges = edges;
        self
    }

    pub fn player(mut self, player: BattleEntity) -> Self {
        self.player = player;
        self
    }

    pub fn player_at(mut self, position: Position) -> Self {
        self.player.position = position;
        self
    }

    pub fn player_hp(mut self, hp: i32) -> Self {
        self.player.stats.hp = hp;
        self
    }

    pub fn enemy(mut self, enemy: BattleEntity) -> Self {
        self.enemies.push(enemy);
        self
    }

    pub fn enemy_at(self, id: u32, position: Position) -> Self {
        self.enemy(enemy(id, position))
    }

    pub fn reinforcement(mut self, pending: PendingReinforcement) -> Self {
        self.reinforcements.push(pending);
        self
    }

    pub fn reinforcement_cap(mut self, cap: u32) -> Self {
        self.reinforcement_cap = Some(cap);
        self
    }

    pub fn origin(mut self, origin: Position) -> Self {
        self.origin = origin;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn boss(mut self, is_boss: bool) -> Self {
        self.is_boss = is_boss;
        self
    }

    pub fn turn(mut self, turn: u32) -> Self {
        self.turn = turn;
        self
    }

    /// Assembles the state at the start of the player's turn.
    pub fn build(self) -> BattleState {
        let size = EncounterSize::classify(self.enemies.len(), self.is_boss);
        let cap = self
            .reinforcement_cap
            .unwrap_or_else(|| self.config.reinforcement_caps.for_size(size))
            .max(self.reinforcements.len() as u32);
        let next_entity_id = self
            .enemies
            .iter()
            .map(|e| e.id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(1);
        let potions = self.config.starting_potions;

        let mut state = BattleState {
            arena: Arena {
                template: "custom".to_owned(),
                theme: ArenaTheme::default(),
                grid: self.grid,
                player_spawns: vec![self.player.position],
                enemy_spawns: self.enemies.iter().map(|e| e.position).collect(),
                entry_edges: self.entry_edges,
            },
            config: self.config,
            is_boss: self.is_boss,
            player: self.player,
            enemies: self.enemies,
            reinforcements: self.reinforcements,
            reinforcement_cap: cap,
            reinforcements_spawned: 0,
            origin: self.origin,
            noise: 0,
            turn: self.turn,
            phase: BattlePhase::PlayerTurn,
            turn_order: Vec::new(),
            active_index: 0,
            outcome: BattleOutcome::Pending,
            seed: self.seed,
            rng: BattleRng::new(self.seed),
            next_entity_id,
            potions,
        };
        state.recompute_turn_order();
        state.set_active(EntityId::PLAYER);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_state_is_valid() {
        let state = StateBuilder::open(9, 7)
            .enemy_at(1, Position::new(4, 3))
            .enemy_at(2, Position::new(5, 3))
            .build();
        state.validate().unwrap();
        assert_eq!(state.next_entity_id, 3);
        assert_eq!(state.turn_order.len(), 3);
        assert_eq!(state.turn_order[state.active_index], EntityId::PLAYER);
    }
}
