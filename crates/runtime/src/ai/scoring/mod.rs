//! Utility scoring for enumerated candidates.
//!
//! # Score Components
//!
//! Every candidate gets a [`Score`] whose components are kept separate so
//! decisions can be logged and inspected term by term:
//!
//! - **kill_shot**: flat bonus when the action can kill the primary target
//! - **offense**: expected damage, statuses inflicted, summons, buffs
//! - **positioning**: strategy-specific value of the destination tile
//! - **hazard**: penalty for the destination tile's hazard cost
//! - **transit**: penalty for hazards crossed on the way there
//! - **exposure**: penalty for ending next to the target without a kill
//! - **pressure**: bonus for taking safe escape tiles from the target
//!
//! ## Score Formula
//!
//! ```text
//! total = kill_shot + offense + positioning + hazard + transit + exposure + pressure
//! ```
//!
//! All arithmetic is integral so equal inputs give bit-identical scores.

pub mod kiting;
pub mod strategy;

use battle_core::action::summon_tiles;
use battle_core::pathing::{EscapeQuery, count_safe_escape_tiles_with};
use battle_core::{
    AbilityEffect, AbilityKind, BattleAction, BattleEntity, BattleState, Classification,
    EntityId, estimate_damage, hazard_cost, is_kill_shot,
};

pub use kiting::KitingStrategy;
pub use strategy::{MeleeStrategy, PositionContext, ScoringStrategy, strategy_for};

use super::candidates::CandidateAction;

/// Points per point of expected damage.
pub const DAMAGE_WEIGHT: i64 = 10;
/// Inflicting a status the target does not carry yet.
pub const STATUS_BONUS: i64 = 30;
/// Per minion a summon would add.
pub const SUMMON_VALUE: i64 = 60;
/// A defensive buff while a hostile is close.
pub const BUFF_VALUE: i64 = 45;
/// A buff that would change nothing; below waiting.
pub const IDLE_BUFF_PENALTY: i64 = -5;
/// Hostiles within this distance make a buff worthwhile.
pub const BUFF_THREAT_RANGE: u32 = 2;
/// Per safe escape tile taken from the target.
pub const PRESSURE_WEIGHT: i64 = 15;
/// Base penalty for ending adjacent to the target without a kill.
pub const EXPOSURE_BASE: i64 = 20;

/// Component breakdown of one candidate's utility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub kill_shot: i64,
    pub offense: i64,
    pub positioning: i64,
    pub hazard: i64,
    pub transit: i64,
    pub exposure: i64,
    pub pressure: i64,
}

impl Score {
    pub const fn total(&self) -> i64 {
        self.kill_shot
            + self.offense
            + self.positioning
            + self.hazard
            + self.transit
            + self.exposure
            + self.pressure
    }

    /// Everything except the destination hazard penalty.
    pub const fn positional(&self) -> i64 {
        self.total() - self.hazard
    }

    pub const fn is_kill_shot(&self) -> bool {
        self.kill_shot > 0
    }
}

/// The hostile an actor measures itself against: the nearest one, then the
/// first in raster order.
pub fn primary_target<'a>(state: &'a BattleState, actor: &BattleEntity) -> Option<&'a BattleEntity> {
    state
        .living_entities()
        .filter(|e| e.is_hostile_to(actor))
        .min_by_key(|e| {
            (
                e.position.manhattan(actor.position),
                e.position.raster_key(),
                e.id,
            )
        })
}

/// Scores one candidate for `actor` under the strategy `classification`
/// selects.
pub fn score_action(
    state: &BattleState,
    actor: &BattleEntity,
    candidate: &CandidateAction,
    classification: Classification,
) -> Score {
    let strategy = strategy_for(classification.behavior);
    let target = primary_target(state, actor);
    let destination = candidate.destination;
    let mut score = Score::default();

    let kill = match candidate.action {
        BattleAction::Attack { target } => {
            offense(state, actor, AbilityKind::BasicAttack, target, &mut score)
        }
        BattleAction::UseAbility {
            ability, target, ..
        } => offense(state, actor, ability, target, &mut score),
        BattleAction::Move { .. } | BattleAction::Wait => false,
    };
    if kill {
        score.kill_shot = state.config.kill_shot_bonus;
    }

    let weight = state.config.hazard_penalty_weight;
    let landing = hazard_cost(state, destination);
    score.hazard = -weight * i64::from(landing);
    if let Some(route) = candidate.route {
        let crossed = route.cost.saturating_sub(route.steps + landing);
        score.transit = -weight * i64::from(crossed);
    }

    let Some(target) = target else {
        return score;
    };
    let distance = destination.manhattan(target.position);

    score.positioning = strategy.positioning(&PositionContext {
        state,
        actor,
        target,
        destination,
        distance,
        kill_shot: kill,
    });

    if distance == 1 && !kill {
        let missing = i64::from(100 - actor.hp_percent().clamp(0, 100));
        score.exposure = -(EXPOSURE_BASE + missing * strategy.exposure_factor());
    }

    if destination != actor.position {
        let before = count_safe_escape_tiles_with(state, target.position, EscapeQuery::default());
        let after = count_safe_escape_tiles_with(
            state,
            target.position,
            EscapeQuery {
                ignore: Some(actor.id),
                blocker: Some(destination),
            },
        );
        score.pressure = (i64::from(before) - i64::from(after)) * PRESSURE_WEIGHT;
    }

    score
}

/// Adds the offensive value of `ability` to `score`; true on a kill-shot
/// against the primary target.
fn offense(
    state: &BattleState,
    actor: &BattleEntity,
    ability: AbilityKind,
    target: EntityId,
    score: &mut Score,
) -> bool {
    let def = ability.def();
    match def.effect {
        AbilityEffect::Strike => {
            let Some(primary) = state.entity(target) else {
                return false;
            };
            let struck = state.living_entities().filter(|e| {
                e.id == primary.id
                    || (e.is_hostile_to(actor)
                        && e.position.manhattan(primary.position) <= def.aoe_radius)
            });
            for hit in struck {
                let damage = estimate_damage(actor, hit, &def).min(hit.hp());
                score.offense += DAMAGE_WEIGHT * i64::from(damage);
                if let Some((status, _)) = def.status
                    && !hit.statuses.has(status)
                {
                    score.offense += STATUS_BONUS;
                }
            }
            is_kill_shot(actor, primary, &def)
        }
        AbilityEffect::Summon { count } => {
            let room = state
                .config
                .summon_cap
                .saturating_sub(state.minion_count(actor.id));
            let tiles = summon_tiles(state, actor, count.min(room)).len() as i64;
            score.offense += SUMMON_VALUE * tiles;
            false
        }
        AbilityEffect::Buff => {
            let threatened = state
                .living_entities()
                .any(|e| e.is_hostile_to(actor) && e.position.manhattan(actor.position) <= BUFF_THREAT_RANGE);
            let fresh = def.status.is_some_and(|(status, _)| !actor.statuses.has(status));
            score.offense += if threatened && fresh {
                BUFF_VALUE
            } else {
                IDLE_BUFF_PENALTY
            };
            false
        }
        AbilityEffect::Reposition { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::candidates::enumerate_candidate_actions;
    use battle_core::builder::enemy;
    use battle_core::{HazardKind, Position, StateBuilder};

    fn scored(state: &BattleState, actor: &BattleEntity) -> Vec<(CandidateAction, Score)> {
        enumerate_candidate_actions(state, actor)
            .into_iter()
            .map(|c| {
                let score = score_action(state, actor, &c, actor.classification());
                (c, score)
            })
            .collect()
    }

    #[test]
    fn kill_shot_outscores_everything_else() {
        let state = StateBuilder::open(9, 7)
            .player_at(Position::new(4, 3))
            .player_hp(3)
            .enemy_at(1, Position::new(5, 3))
            .build();
        let actor = &state.enemies[0];
        let scores = scored(&state, actor);

        let (attack, attack_score) = scores
            .iter()
            .find(|(c, _)| matches!(c.action, BattleAction::Attack { .. }))
            .unwrap();
        assert!(attack_score.is_kill_shot());
        for (other, score) in &scores {
            if other != attack {
                assert!(attack_score.total() > score.total(), "{other:?} {score:?}");
            }
        }
    }

    #[test]
    fn landing_on_lava_is_penalized_by_weight() {
        let state = StateBuilder::open(9, 7)
            .player_at(Position::new(1, 1))
            .hazard(Position::new(5, 4), HazardKind::Lava)
            .enemy_at(1, Position::new(5, 3))
            .build();
        let actor = &state.enemies[0];
        let scores = scored(&state, actor);
        let lava = scores
            .iter()
            .find(|(c, _)| c.destination == Position::new(5, 4))
            .map(|(_, s)| *s)
            .unwrap();
        let expected = -state.config.hazard_penalty_weight
            * i64::from(hazard_cost(&state, Position::new(5, 4)));
        assert_eq!(lava.hazard, expected);
        assert!(lava.hazard < 0);
    }

    #[test]
    fn closing_in_blocks_escape_routes() {
        let state = StateBuilder::open(9, 7)
            .player_at(Position::new(1, 1))
            .enemy_at(1, Position::new(4, 1))
            .build();
        let actor = &state.enemies[0];
        let scores = scored(&state, actor);
        let near = scores
            .iter()
            .find(|(c, _)| c.destination == Position::new(2, 1))
            .map(|(_, s)| *s)
            .unwrap();
        assert!(near.pressure > 0);
        assert!(near.exposure < 0);
    }

    #[test]
    fn idle_buff_ranks_below_waiting() {
        let mut actor = enemy(1, Position::new(6, 4));
        actor.stats.abilities = [AbilityKind::ShieldWall].into_iter().collect();
        actor.stats.speed = 0;
        let state = StateBuilder::open(9, 7)
            .player_at(Position::new(1, 1))
            .enemy(actor)
            .build();
        let actor = &state.enemies[0];
        let scores = scored(&state, actor);
        assert_eq!(scores.len(), 2);
        assert!(scores[0].1.total() < scores[1].1.total());
    }
}
