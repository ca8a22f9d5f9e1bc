//! Whole encounters driven through the manager.

use std::sync::Arc;

use battle_content::RosterLoader;
use battle_core::builder::grunt;
use battle_core::{
    BattleEvent, BattleOutcome, BattlePhase, CommandError, EntityId, PlayerCommand, Position,
    TemplatePool, WorldCombatant, WorldId,
};
use battle_runtime::{
    BattleManager, InMemoryWorld, RecordingSink, RuntimeConfig, RuntimeError, WorldRegistry,
    suggest_command,
};

const MAX_ROUNDS: usize = 200;

fn world(enemies: &[(u64, &str, Position)]) -> InMemoryWorld {
    let roster = RosterLoader::builtin().unwrap();
    let mut hero = grunt("Hero", 40);
    hero.attack = 5;
    hero.defense = 3;
    let mut world = InMemoryWorld::new(WorldCombatant {
        world_id: WorldId(0),
        position: Position::new(20, 20),
        snapshot: hero,
    });
    for &(id, template, at) in enemies {
        world
            .spawn(WorldId(id), at, roster.get(template).unwrap())
            .unwrap();
    }
    world
}

fn manager(world: InMemoryWorld) -> BattleManager<InMemoryWorld> {
    BattleManager::new(world, TemplatePool::builtin(), RuntimeConfig::default()).unwrap()
}

/// Auto-plays up to `rounds` rounds; stops early on a terminal outcome.
fn play_rounds(manager: &mut BattleManager<InMemoryWorld>, rounds: usize) -> BattleOutcome {
    for _ in 0..rounds {
        let command = suggest_command(manager.battle().unwrap());
        let report = match manager.process_command(command) {
            Ok(report) => report,
            Err(_) => manager.process_command(PlayerCommand::Wait).unwrap(),
        };
        if report.outcome.is_terminal() {
            return report.outcome;
        }
    }
    BattleOutcome::Pending
}

fn play_out(manager: &mut BattleManager<InMemoryWorld>) -> BattleOutcome {
    let outcome = play_rounds(manager, MAX_ROUNDS);
    assert!(outcome.is_terminal(), "battle still running after {MAX_ROUNDS} rounds");
    outcome
}

#[test]
fn a_won_battle_clears_the_world() {
    let mut manager = manager(world(&[(1, "goblin", Position::new(21, 20))]));
    manager
        .start_battle(&[WorldId(1)], Position::new(20, 20), Some(11), false)
        .unwrap();

    let outcome = play_out(&mut manager);
    let summary = manager.end_battle(outcome).unwrap();
    assert_eq!(summary.outcome, outcome);

    let world = manager.world();
    assert_eq!(world.player().snapshot.hp, summary.player_hp);
    match outcome {
        BattleOutcome::Victory => {
            assert_eq!(summary.defeated, vec![WorldId(1)]);
            assert!(world.get(WorldId(1)).is_none());
        }
        BattleOutcome::Defeat => {
            assert_eq!(summary.player_hp, 0);
            assert_eq!(summary.survivors, vec![WorldId(1)]);
        }
        other => panic!("unexpected outcome {other}"),
    }
}

#[test]
fn finished_battles_reject_further_commands() {
    let mut manager = manager(world(&[(1, "goblin", Position::new(21, 20))]));
    manager
        .start_battle(&[WorldId(1)], Position::new(20, 20), Some(5), false)
        .unwrap();
    play_out(&mut manager);

    assert!(!manager.is_active());
    assert!(matches!(
        manager.process_command(PlayerCommand::Wait),
        Err(RuntimeError::Command(CommandError::NotPlayerTurn))
    ));
}

#[test]
fn rejected_commands_change_nothing() {
    let mut manager = manager(world(&[(1, "orc_guard", Position::new(22, 20))]));
    manager
        .start_battle(&[WorldId(1)], Position::new(20, 20), Some(9), false)
        .unwrap();
    let before = manager.battle().unwrap().clone();

    let err = manager
        .process_command(PlayerCommand::Attack {
            target: EntityId(99),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Command(CommandError::UnknownTarget(EntityId(99)))
    ));
    assert_eq!(manager.battle().unwrap(), &before);
    assert_eq!(manager.battle().unwrap().phase, BattlePhase::PlayerTurn);
}

#[test]
fn bosses_cannot_be_fled() {
    let mut manager = manager(world(&[(7, "frost_wyrm", Position::new(24, 20))]));
    manager
        .start_battle(&[WorldId(7)], Position::new(20, 20), Some(2), true)
        .unwrap();
    assert!(matches!(
        manager.process_command(PlayerCommand::Flee),
        Err(RuntimeError::Command(CommandError::FleeForbidden))
    ));
    assert_eq!(manager.battle().unwrap().arena.width(), 21);
}

#[test]
fn nearby_world_enemies_are_queued_as_reinforcements() {
    let mut manager = manager(world(&[
        (1, "goblin", Position::new(21, 20)),
        (2, "cave_spider", Position::new(26, 20)),
        (3, "ogre_brute", Position::new(60, 60)),
    ]));
    let state = manager
        .start_battle(&[WorldId(1)], Position::new(20, 20), Some(4), false)
        .unwrap();

    let queued: Vec<WorldId> = state.reinforcements.iter().map(|r| r.world_id).collect();
    assert_eq!(queued, vec![WorldId(2)]);
}

#[test]
fn fleeing_leaves_everyone_in_place() {
    let sink = Arc::new(RecordingSink::new());
    let mut manager = manager(world(&[(1, "goblin", Position::new(21, 20))])).with_sink(sink.clone());
    manager
        .start_battle(&[WorldId(1)], Position::new(20, 20), Some(8), false)
        .unwrap();

    let summary = manager.end_battle(BattleOutcome::Flee).unwrap();
    assert_eq!(summary.survivors, vec![WorldId(1)]);
    assert!(summary.defeated.is_empty());
    assert!(manager.world().get(WorldId(1)).is_some());
    assert!(sink.events().iter().any(|e| matches!(
        e,
        BattleEvent::BattleEnded {
            outcome: BattleOutcome::Flee,
            ..
        }
    )));
}

#[test]
fn equal_seeds_replay_identically() {
    let enemies = [
        (1, "goblin", Position::new(21, 20)),
        (2, "skeleton_archer", Position::new(19, 22)),
    ];
    let run = || {
        let mut manager = manager(world(&enemies));
        manager
            .start_battle(&[WorldId(1), WorldId(2)], Position::new(20, 20), Some(1234), false)
            .unwrap();
        play_rounds(&mut manager, 25);
        let state = manager.battle().unwrap().clone();
        let log: Vec<String> = manager.messages().iter().map(str::to_owned).collect();
        (state, log)
    };

    let (first_state, first_log) = run();
    let (second_state, second_log) = run();
    assert_eq!(first_state, second_state);
    assert_eq!(first_log, second_log);
}
