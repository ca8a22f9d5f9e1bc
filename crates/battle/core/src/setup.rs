//! Encounter construction.

use std::collections::BTreeSet;

use crate::action::{BattleEvent, Outbox, nearest_free_tile, roll_initiative};
use crate::arena::{ArenaError, ArenaTheme, TemplatePool};
use crate::config::BattleConfig;
use crate::dice::{BattleRng, compute_seed};
use crate::reinforcement::{WorldCombatant, plan_reinforcements};
use crate::state::{
    BattleEntity, BattleOutcome, BattlePhase, BattleState, EncounterSize, EntityId, Position, Side,
    WorldId,
};

/// Domain tag mixed into the battle seed for the in-battle dice stream, so
/// arena selection and combat rolls never share a sequence.
const DICE_STREAM: u64 = 1;

/// Everything needed to open an encounter.
#[derive(Clone, Debug)]
pub struct EncounterSetup {
    pub player: WorldCombatant,
    /// Combatants engaged from the first round.
    pub enemies: Vec<WorldCombatant>,
    /// Other world combatants that may reinforce.
    pub nearby: Vec<WorldCombatant>,
    pub origin: Position,
    pub theme: ArenaTheme,
    pub is_boss: bool,
    pub seed: u64,
    pub config: BattleConfig,
}

/// Compiles the arena, places every combatant and plans reinforcements.
///
/// The returned state is in the player's turn of round 1.
pub fn start_battle(
    setup: EncounterSetup,
    pool: &TemplatePool,
    out: &mut Outbox,
) -> Result<BattleState, ArenaError> {
    let arena = pool.compile(setup.theme, setup.is_boss, setup.seed)?;
    let size = EncounterSize::classify(setup.enemies.len(), setup.is_boss);
    let engaged: BTreeSet<WorldId> = setup
        .enemies
        .iter()
        .chain(std::iter::once(&setup.player))
        .map(|c| c.world_id)
        .collect();
    let reinforcements = plan_reinforcements(
        &setup.config,
        size,
        setup.origin,
        &setup.nearby,
        &engaged,
    );

    let player_spawn = arena
        .player_spawns
        .first()
        .copied()
        .ok_or_else(|| ArenaError::MissingMarker {
            name: arena.template.clone(),
            marker: "player spawn",
        })?;
    let player = BattleEntity::new(
        EntityId::PLAYER,
        Side::Player,
        player_spawn,
        setup.player.position,
        setup.player.snapshot,
    )
    .with_world_id(setup.player.world_id);

    let mut state = BattleState {
        reinforcement_cap: setup.config.reinforcement_caps.for_size(size),
        potions: setup.config.starting_potions,
        config: setup.config,
        arena,
        is_boss: setup.is_boss,
        player,
        enemies: Vec::with_capacity(setup.enemies.len()),
        reinforcements,
        reinforcements_spawned: 0,
        origin: setup.origin,
        noise: 0,
        turn: 1,
        phase: BattlePhase::Pending,
        turn_order: Vec::new(),
        active_index: 0,
        outcome: BattleOutcome::Pending,
        seed: setup.seed,
        rng: BattleRng::new(compute_seed(setup.seed, DICE_STREAM, 0, 0)),
        next_entity_id: 1,
    };
    state.player.initiative = roll_initiative(&mut state.rng, &state.player.stats);

    for (index, combatant) in setup.enemies.into_iter().enumerate() {
        let spawn = state
            .arena
            .enemy_spawns
            .get(index % state.arena.enemy_spawns.len().max(1))
            .copied()
            .unwrap_or(player_spawn);
        let tile = nearest_free_tile(&state, spawn).ok_or_else(|| ArenaError::Overcrowded {
            name: state.arena.template.clone(),
            placed: index,
        })?;
        let id = state.allocate_id();
        let mut enemy = BattleEntity::new(
            id,
            Side::Enemy,
            tile,
            combatant.position,
            combatant.snapshot,
        )
        .with_world_id(combatant.world_id);
        enemy.initiative = roll_initiative(&mut state.rng, &enemy.stats);
        state.enemies.push(enemy);
    }

    state.recompute_turn_order();
    state.phase = BattlePhase::PlayerTurn;
    state.set_active(EntityId::PLAYER);

    out.emit(BattleEvent::BattleStarted {
        seed: state.seed,
        is_boss: state.is_boss,
        enemies: state.enemies.iter().map(|e| e.id).collect(),
    });
    out.narrate(format!(
        "{} faces {} foe(s) in the {} arena.",
        state.player.stats.name,
        state.enemies.len(),
        state.arena.template
    ));
    if !state.reinforcements.is_empty() {
        out.narrate(format!(
            "{} more can be heard approaching.",
            state.reinforcements.len()
        ));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::grunt;

    fn combatant(id: u64, x: i32, y: i32) -> WorldCombatant {
        WorldCombatant {
            world_id: WorldId(id),
            position: Position::new(x, y),
            snapshot: grunt("goblin", 9),
        }
    }

    fn setup(seed: u64) -> EncounterSetup {
        EncounterSetup {
            player: WorldCombatant {
                world_id: WorldId(0),
                position: Position::new(20, 20),
                snapshot: grunt("hero", 30),
            },
            enemies: vec![combatant(1, 21, 20), combatant(2, 20, 22)],
            nearby: vec![
                combatant(1, 21, 20),
                combatant(3, 24, 20),
                combatant(4, 20, 29),
                combatant(5, 60, 60),
            ],
            origin: Position::new(20, 20),
            theme: ArenaTheme::Cavern,
            is_boss: false,
            seed,
            config: BattleConfig::default(),
        }
    }

    #[test]
    fn battle_starts_in_player_turn() {
        let mut out = Outbox::new();
        let state = start_battle(setup(11), &TemplatePool::builtin(), &mut out).unwrap();
        state.validate().unwrap();
        assert_eq!(state.phase, BattlePhase::PlayerTurn);
        assert_eq!(state.turn, 1);
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.turn_order[state.active_index], EntityId::PLAYER);
        assert!(matches!(
            out.events.first(),
            Some(BattleEvent::BattleStarted { .. })
        ));
    }

    #[test]
    fn engaged_enemies_are_not_reinforcements() {
        let mut out = Outbox::new();
        let state = start_battle(setup(11), &TemplatePool::builtin(), &mut out).unwrap();
        let queued: Vec<u64> = state.reinforcements.iter().map(|r| r.world_id.0).collect();
        assert_eq!(queued, vec![3, 4]);
        assert!(state.reinforcements.iter().all(|r| r.turns_until_arrival >= 2));
    }

    #[test]
    fn same_seed_same_battle() {
        let pool = TemplatePool::builtin();
        let a = start_battle(setup(5), &pool, &mut Outbox::new()).unwrap();
        let b = start_battle(setup(5), &pool, &mut Outbox::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_pool_is_an_error() {
        let err = start_battle(setup(1), &TemplatePool::empty(), &mut Outbox::new()).unwrap_err();
        assert!(matches!(err, ArenaError::EmptyPool { .. }));
    }
}
