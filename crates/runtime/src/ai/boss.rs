//! Scripted priorities for boss archetypes.
//!
//! Each archetype is an ordered list of named rules. Rules are plain
//! functions of the battle state and the boss; the first one that names an
//! ability the boss can use right now decides the turn. When none fires, the
//! boss is scored like any other combatant of its baseline behavior.

use battle_core::action::valid_targets;
use battle_core::{
    AbilityKind, BattleAction, BattleEntity, BattleState, BossArchetype, StatusKind,
    count_safe_escape_tiles,
};

use super::candidates::ability_action;

/// Player escape routes at which the sovereign reaches for its chains.
pub const CHAINS_ESCAPE_THRESHOLD: u32 = 6;
/// Hp percent below which the pursuer considers vanishing.
pub const PURSUER_RETREAT_HP_PERCENT: i32 = 40;
/// The pursuer vanishes only with this many or fewer escape tiles.
pub const PURSUER_CORNERED_ESCAPES: u32 = 2;

/// One prioritized boss rule.
#[derive(Clone, Copy)]
pub struct BossRule {
    pub name: &'static str,
    pub select: fn(&BattleState, &BattleEntity) -> Option<AbilityKind>,
}

impl std::fmt::Debug for BossRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BossRule").field("name", &self.name).finish()
    }
}

/// A rule that fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossDecision {
    pub rule: &'static str,
    pub ability: AbilityKind,
    pub action: BattleAction,
}

const SOVEREIGN: &[BossRule] = &[
    BossRule {
        name: "raise_court",
        select: raise_court,
    },
    BossRule {
        name: "bind_the_restless",
        select: bind_the_restless,
    },
    BossRule {
        name: "royal_strike",
        select: royal_strike,
    },
];

const PURSUER: &[BossRule] = &[
    BossRule {
        name: "venom_lunge",
        select: venom_lunge,
    },
    BossRule {
        name: "vanish",
        select: vanish,
    },
];

const CONJURER: &[BossRule] = &[
    BossRule {
        name: "blink_away",
        select: blink_away,
    },
    BossRule {
        name: "arcane_barrage",
        select: arcane_barrage,
    },
];

const APEX: &[BossRule] = &[
    BossRule {
        name: "opening_roar",
        select: opening_roar,
    },
    BossRule {
        name: "tail_sweep",
        select: tail_sweep,
    },
];

pub fn rules_for(archetype: BossArchetype) -> &'static [BossRule] {
    match archetype {
        BossArchetype::Sovereign => SOVEREIGN,
        BossArchetype::Pursuer => PURSUER,
        BossArchetype::Conjurer => CONJURER,
        BossArchetype::Apex => APEX,
    }
}

/// Runs the archetype's rules top to bottom.
///
/// A rule only fires if the boss knows the ability, it is off cooldown and
/// it has a legal target; otherwise evaluation moves on to the next rule.
pub fn evaluate(
    state: &BattleState,
    boss: &BattleEntity,
    archetype: BossArchetype,
) -> Option<BossDecision> {
    for rule in rules_for(archetype) {
        let Some(ability) = (rule.select)(state, boss) else {
            continue;
        };
        if !boss.knows(ability) || !boss.is_ready(ability) {
            tracing::trace!(rule = rule.name, %ability, "boss rule skipped: not ready");
            continue;
        }
        let Some(target) = valid_targets(state, boss, ability).first().copied() else {
            tracing::trace!(rule = rule.name, %ability, "boss rule skipped: no target");
            continue;
        };
        let Some((action, _)) = ability_action(state, boss, ability, target) else {
            continue;
        };
        return Some(BossDecision {
            rule: rule.name,
            ability,
            action,
        });
    }
    None
}

fn player_adjacent(state: &BattleState, boss: &BattleEntity) -> bool {
    state.player.is_alive() && state.player.position.manhattan(boss.position) == 1
}

fn raise_court(state: &BattleState, boss: &BattleEntity) -> Option<AbilityKind> {
    (state.minion_count(boss.id) < state.config.summon_cap).then_some(AbilityKind::SummonMinions)
}

fn bind_the_restless(state: &BattleState, _boss: &BattleEntity) -> Option<AbilityKind> {
    let player = &state.player;
    let escapes = count_safe_escape_tiles(state, player.position, player.id);
    (escapes >= CHAINS_ESCAPE_THRESHOLD).then_some(AbilityKind::BindingChains)
}

fn royal_strike(state: &BattleState, boss: &BattleEntity) -> Option<AbilityKind> {
    player_adjacent(state, boss).then_some(AbilityKind::BasicAttack)
}

fn venom_lunge(state: &BattleState, boss: &BattleEntity) -> Option<AbilityKind> {
    let fresh = !state.player.statuses.has(StatusKind::Poisoned);
    (player_adjacent(state, boss) && fresh).then_some(AbilityKind::VenomBite)
}

fn vanish(state: &BattleState, boss: &BattleEntity) -> Option<AbilityKind> {
    let wounded = boss.hp_percent() < PURSUER_RETREAT_HP_PERCENT;
    let cornered =
        count_safe_escape_tiles(state, boss.position, boss.id) <= PURSUER_CORNERED_ESCAPES;
    (wounded && cornered).then_some(AbilityKind::ShadowLeap)
}

fn blink_away(state: &BattleState, boss: &BattleEntity) -> Option<AbilityKind> {
    player_adjacent(state, boss).then_some(AbilityKind::Blink)
}

fn arcane_barrage(_state: &BattleState, _boss: &BattleEntity) -> Option<AbilityKind> {
    Some(AbilityKind::ArcaneBolt)
}

fn opening_roar(state: &BattleState, _boss: &BattleEntity) -> Option<AbilityKind> {
    (state.turn == 1).then_some(AbilityKind::TerrorRoar)
}

fn tail_sweep(state: &BattleState, boss: &BattleEntity) -> Option<AbilityKind> {
    player_adjacent(state, boss).then_some(AbilityKind::TailSweep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::builder::grunt;
    use battle_core::{
        Behavior, Classification, EntityFlags, EntityId, Position, Side, StateBuilder,
    };

    fn boss(archetype: BossArchetype, abilities: &[AbilityKind], at: Position) -> BattleEntity {
        let mut stats = grunt("boss", 60);
        stats.abilities = abilities.iter().copied().collect();
        stats.flags = EntityFlags::BOSS;
        stats.classification = Classification::boss(Behavior::Aggressive, archetype);
        BattleEntity::new(EntityId(1), Side::Enemy, at, at, stats)
    }

    #[test]
    fn sovereign_summons_while_below_cap() {
        let state = StateBuilder::open(15, 11)
            .player_at(Position::new(2, 2))
            .enemy(boss(
                BossArchetype::Sovereign,
                &[
                    AbilityKind::BasicAttack,
                    AbilityKind::SummonMinions,
                    AbilityKind::BindingChains,
                ],
                Position::new(7, 5),
            ))
            .boss(true)
            .build();
        let decision = evaluate(&state, &state.enemies[0], BossArchetype::Sovereign).unwrap();
        assert_eq!(decision.rule, "raise_court");
        assert_eq!(decision.ability, AbilityKind::SummonMinions);
    }

    #[test]
    fn sovereign_chains_when_summons_are_spent() {
        let mut sovereign = boss(
            BossArchetype::Sovereign,
            &[
                AbilityKind::BasicAttack,
                AbilityKind::SummonMinions,
                AbilityKind::BindingChains,
            ],
            Position::new(7, 5),
        );
        sovereign.cooldowns.insert(AbilityKind::SummonMinions, 2);
        let state = StateBuilder::open(15, 11)
            .player_at(Position::new(5, 5))
            .enemy(sovereign)
            .boss(true)
            .build();
        let decision = evaluate(&state, &state.enemies[0], BossArchetype::Sovereign).unwrap();
        assert_eq!(decision.rule, "bind_the_restless");
        assert_eq!(
            decision.action,
            BattleAction::UseAbility {
                ability: AbilityKind::BindingChains,
                target: EntityId::PLAYER,
                at: None,
            }
        );
    }

    #[test]
    fn pursuer_skips_the_bite_on_a_poisoned_player() {
        let pursuer = boss(
            BossArchetype::Pursuer,
            &[AbilityKind::BasicAttack, AbilityKind::VenomBite],
            Position::new(6, 5),
        );
        let mut state = StateBuilder::open(15, 11)
            .player_at(Position::new(5, 5))
            .enemy(pursuer)
            .boss(true)
            .build();
        assert_eq!(
            evaluate(&state, &state.enemies[0], BossArchetype::Pursuer).map(|d| d.ability),
            Some(AbilityKind::VenomBite)
        );

        state.player.statuses.apply(StatusKind::Poisoned, 2);
        assert_eq!(evaluate(&state, &state.enemies[0], BossArchetype::Pursuer), None);
    }

    #[test]
    fn conjurer_blinks_away_from_melee() {
        let conjurer = boss(
            BossArchetype::Conjurer,
            &[AbilityKind::ArcaneBolt, AbilityKind::Blink],
            Position::new(6, 5),
        );
        let state = StateBuilder::open(15, 11)
            .player_at(Position::new(5, 5))
            .enemy(conjurer)
            .boss(true)
            .build();
        let decision = evaluate(&state, &state.enemies[0], BossArchetype::Conjurer).unwrap();
        assert_eq!(decision.rule, "blink_away");
        let BattleAction::UseAbility { at: Some(at), .. } = decision.action else {
            panic!("blink without a landing tile: {decision:?}");
        };
        assert!(at.manhattan(Position::new(5, 5)) > 1);
    }

    #[test]
    fn apex_roars_only_in_the_first_round() {
        let apex = || {
            boss(
                BossArchetype::Apex,
                &[AbilityKind::TerrorRoar, AbilityKind::TailSweep],
                Position::new(6, 5),
            )
        };
        let opening = StateBuilder::open(15, 11)
            .player_at(Position::new(5, 5))
            .enemy(apex())
            .boss(true)
            .build();
        assert_eq!(
            evaluate(&opening, &opening.enemies[0], BossArchetype::Apex).map(|d| d.rule),
            Some("opening_roar")
        );

        let later = StateBuilder::open(15, 11)
            .player_at(Position::new(5, 5))
            .enemy(apex())
            .boss(true)
            .turn(3)
            .build();
        assert_eq!(
            evaluate(&later, &later.enemies[0], BossArchetype::Apex).map(|d| d.rule),
            Some("tail_sweep")
        );
    }
}
