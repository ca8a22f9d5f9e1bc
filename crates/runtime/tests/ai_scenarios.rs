//! Enemy decisions on hand-built battle states.

use battle_core::builder::{enemy, grunt};
use battle_core::{
    AbilityKind, BattleAction, BattleEntity, BattleState, Behavior, BossArchetype, Classification,
    DiceNotation, EntityFlags, EntityId, HazardKind, Position, Side, StateBuilder, hazard_cost,
};
use battle_runtime::ai::choose_scored;
use battle_runtime::{choose_action, decide_action, enumerate_candidate_actions, score_action};
use proptest::prelude::*;

fn archer(at: Position) -> BattleEntity {
    let mut archer = enemy(1, at);
    archer.stats.abilities = [AbilityKind::Shortbow].into_iter().collect();
    archer.stats.classification = Classification::new(Behavior::Ranged);
    archer
}

fn sovereign(at: Position, hp: i32) -> BattleEntity {
    let mut stats = grunt("Bone Sovereign", hp);
    stats.abilities = [
        AbilityKind::BasicAttack,
        AbilityKind::SummonMinions,
        AbilityKind::BindingChains,
    ]
    .into_iter()
    .collect();
    stats.flags = EntityFlags::BOSS;
    stats.classification = Classification::boss(Behavior::Defensive, BossArchetype::Sovereign);
    BattleEntity::new(EntityId(1), Side::Enemy, at, at, stats)
}

fn scored(state: &BattleState, actor: EntityId) -> Vec<(battle_runtime::CandidateAction, battle_runtime::Score)> {
    let actor = state.entity(actor).unwrap();
    enumerate_candidate_actions(state, actor)
        .into_iter()
        .map(|c| {
            let score = score_action(state, actor, &c, actor.classification());
            (c, score)
        })
        .collect()
}

#[test]
fn adjacent_enemy_finishes_a_wounded_player() {
    let state = StateBuilder::open(15, 11)
        .player_at(Position::new(6, 5))
        .player_hp(3)
        .enemy_at(1, Position::new(7, 5))
        .build();
    assert_eq!(
        decide_action(&state, EntityId(1)),
        BattleAction::Attack {
            target: EntityId::PLAYER
        }
    );
}

#[test]
fn weak_and_wounded_enemy_still_goes_for_the_kill() {
    let mut weakling = enemy(1, Position::new(7, 5));
    weakling.stats.attack = 0;
    weakling.stats.damage = DiceNotation::new(1, 2, 0);
    weakling.stats.hp = 3;
    let state = StateBuilder::open(15, 11)
        .player_at(Position::new(6, 5))
        .player_hp(3)
        .enemy(weakling)
        .build();
    assert_eq!(
        decide_action(&state, EntityId(1)),
        BattleAction::Attack {
            target: EntityId::PLAYER
        }
    );
}

#[test]
fn ranged_actor_backs_off_into_its_band() {
    let player = Position::new(6, 5);
    let state = StateBuilder::open(15, 11)
        .player_at(player)
        .enemy(archer(Position::new(7, 5)))
        .build();

    let action = decide_action(&state, EntityId(1));
    let BattleAction::Move { to } = action else {
        panic!("expected a move, got {action:?}");
    };
    assert!((3..=5).contains(&to.manhattan(player)), "landed at {to}");
}

#[test]
fn ranged_actor_in_its_band_shoots() {
    let state = StateBuilder::open(15, 11)
        .player_at(Position::new(3, 5))
        .enemy(archer(Position::new(7, 5)))
        .build();
    assert!(matches!(
        decide_action(&state, EntityId(1)),
        BattleAction::UseAbility {
            ability: AbilityKind::Shortbow,
            target: EntityId::PLAYER,
            ..
        }
    ));
}

#[test]
fn boss_without_usable_rules_falls_back_to_scoring() {
    let mut boss = sovereign(Position::new(12, 8), 60);
    boss.cooldowns.insert(AbilityKind::SummonMinions, 3);
    boss.cooldowns.insert(AbilityKind::BindingChains, 3);
    let state = StateBuilder::open(15, 11)
        .player_at(Position::new(2, 2))
        .enemy(boss)
        .boss(true)
        .build();
    assert_eq!(
        decide_action(&state, EntityId(1)),
        choose_action(&state, EntityId(1), state.enemies[0].classification())
    );
}

fn interior() -> impl Strategy<Value = Position> {
    (1i32..=13, 1i32..=9).prop_map(|(x, y)| Position::new(x, y))
}

fn hazard_kind() -> impl Strategy<Value = HazardKind> {
    prop_oneof![
        Just(HazardKind::Lava),
        Just(HazardKind::Fire),
        Just(HazardKind::Miasma),
        Just(HazardKind::Ice),
        Just(HazardKind::Spikes),
    ]
}

fn hazard_field(
    player: Position,
    actor: BattleEntity,
    hazards: &[(Position, HazardKind)],
) -> BattleState {
    let occupied = [player, actor.position];
    hazards
        .iter()
        .filter(|(p, _)| !occupied.contains(p))
        .fold(
            StateBuilder::open(15, 11).player_at(player).enemy(actor),
            |builder, &(p, kind)| builder.hazard(p, kind),
        )
        .build()
}

proptest! {
    #[test]
    fn repeated_decisions_are_identical(
        player in interior(),
        actor in interior(),
        ranged in any::<bool>(),
        hazards in prop::collection::vec((interior(), hazard_kind()), 0..10),
    ) {
        prop_assume!(player != actor);
        let actor = if ranged { archer(actor) } else { enemy(1, actor) };
        let state = hazard_field(player, actor, &hazards);
        let classification = state.enemies[0].classification();

        let first = choose_action(&state, EntityId(1), classification);
        for _ in 0..3 {
            prop_assert_eq!(choose_action(&state, EntityId(1), classification), first);
        }
        let rebuilt = hazard_field(player, state.enemies[0].clone(), &hazards);
        prop_assert_eq!(&rebuilt, &state);
        prop_assert_eq!(choose_action(&rebuilt, EntityId(1), classification), first);
    }

    #[test]
    fn hazards_are_never_paid_for_without_a_reason(
        player in interior(),
        actor in interior(),
        ranged in any::<bool>(),
        hazards in prop::collection::vec((interior(), hazard_kind()), 1..16),
    ) {
        prop_assume!(player != actor);
        let actor = if ranged { archer(actor) } else { enemy(1, actor) };
        let state = hazard_field(player, actor, &hazards);

        let best = choose_scored(&state, EntityId(1), state.enemies[0].classification()).unwrap();
        let chosen_cost = hazard_cost(&state, best.candidate.destination);
        for (candidate, score) in scored(&state, EntityId(1)) {
            if score.positional() >= best.score.positional() {
                prop_assert!(
                    hazard_cost(&state, candidate.destination) >= chosen_cost,
                    "{:?} avoids hazards at no positional loss over {:?}",
                    candidate.action,
                    best.candidate.action
                );
            }
        }
    }

    #[test]
    fn kill_shots_outrank_everything(
        hp in 1i32..=4,
        side in 0usize..4,
        hazards in prop::collection::vec((interior(), hazard_kind()), 0..10),
    ) {
        let player = Position::new(7, 5);
        let offsets = [(0, -1), (1, 0), (0, 1), (-1, 0)];
        let (dx, dy) = offsets[side];
        let actor = enemy(1, Position::new(7 + dx, 5 + dy));
        let mut state = hazard_field(player, actor, &hazards);
        state.player.stats.hp = hp;

        let scores = scored(&state, EntityId(1));
        let kills: Vec<_> = scores.iter().filter(|(_, s)| s.is_kill_shot()).collect();
        prop_assert!(!kills.is_empty());
        for (_, kill) in &kills {
            for (_, other) in scores.iter().filter(|(_, s)| !s.is_kill_shot()) {
                prop_assert!(kill.total() > other.total());
            }
        }
        prop_assert_eq!(
            decide_action(&state, EntityId(1)),
            BattleAction::Attack { target: EntityId::PLAYER }
        );
    }

    #[test]
    fn sovereign_always_raises_its_court_first(
        player in (1i32..=19, 1i32..=13).prop_map(|(x, y)| Position::new(x, y)),
        boss_hp in 1i32..=80,
        player_hp in 1i32..=30,
        turn in 1u32..=20,
    ) {
        let at = Position::new(10, 7);
        prop_assume!(player != at);
        let mut state = StateBuilder::open(21, 15)
            .player_at(player)
            .enemy(sovereign(at, 80))
            .boss(true)
            .turn(turn)
            .build();
        state.enemies[0].stats.hp = boss_hp;
        state.player.stats.hp = player_hp;

        prop_assert_eq!(
            decide_action(&state, EntityId(1)),
            BattleAction::UseAbility {
                ability: AbilityKind::SummonMinions,
                target: EntityId(1),
                at: None,
            }
        );
    }
}
