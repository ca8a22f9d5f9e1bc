//! Enemy decision-making.
//!
//! # Architecture
//!
//! ```text
//! decide_action
//!   ├─ boss?  -> boss::evaluate (ordered archetype rules)
//!   └─ else / no rule fired
//!        -> enumerate_candidate_actions
//!        -> score_action (strategy chosen by behavior)
//!        -> highest total wins, earliest candidate on ties
//! ```
//!
//! Every step is a pure function of the `BattleState`. Nothing is cached
//! between calls and no randomness is involved, so the same state always
//! produces the same action.

pub mod boss;
pub mod candidates;
pub mod scoring;

use battle_core::{
    ActionDecider, BattleAction, BattleState, Classification, EntityId, PlayerCommand,
};

pub use boss::{BossDecision, BossRule};
pub use candidates::{CandidateAction, enumerate_candidate_actions};
pub use scoring::{Score, score_action};

/// A candidate with its score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub candidate: CandidateAction,
    pub score: Score,
}

/// Scores every candidate and keeps the best.
///
/// Ties keep the earlier candidate. Returns `None` only for unknown or dead
/// actors.
pub fn choose_scored(
    state: &BattleState,
    actor: EntityId,
    classification: Classification,
) -> Option<ScoredCandidate> {
    let actor = state.entity(actor).filter(|e| e.is_alive())?;
    let mut best: Option<ScoredCandidate> = None;

    for candidate in enumerate_candidate_actions(state, actor) {
        let score = score_action(state, actor, &candidate, classification);

        tracing::debug!(
            actor = %actor.id,
            action = ?candidate.action,
            total = score.total(),
            kill = score.kill_shot,
            offense = score.offense,
            positioning = score.positioning,
            hazard = score.hazard,
            transit = score.transit,
            exposure = score.exposure,
            pressure = score.pressure,
            "candidate scored"
        );

        // Strict comparison: the first candidate keeps ties.
        if best.is_none_or(|b| score.total() > b.score.total()) {
            best = Some(ScoredCandidate { candidate, score });
        }
    }

    best
}

/// The scored decision for `actor`, or `Wait` when nothing better exists.
pub fn choose_action(
    state: &BattleState,
    actor: EntityId,
    classification: Classification,
) -> BattleAction {
    choose_scored(state, actor, classification).map_or(BattleAction::Wait, |best| {
        tracing::debug!(
            actor = %actor,
            action = ?best.candidate.action,
            total = best.score.total(),
            fingerprint = %hex::encode(best.candidate.fingerprint().to_be_bytes()),
            "action chosen"
        );
        best.candidate.action
    })
}

/// Full decision for one enemy: boss rules first, then scoring with the
/// combatant's baseline behavior.
pub fn decide_action(state: &BattleState, actor: EntityId) -> BattleAction {
    let Some(entity) = state.entity(actor).filter(|e| e.is_alive()) else {
        return BattleAction::Wait;
    };
    let classification = entity.classification();

    if let Some(archetype) = classification.boss
        && let Some(decision) = boss::evaluate(state, entity, archetype)
    {
        tracing::debug!(
            actor = %actor,
            %archetype,
            rule = decision.rule,
            ability = %decision.ability,
            "boss rule fired"
        );
        return decision.action;
    }

    choose_action(state, actor, classification)
}

/// Player hp percent at or below which auto-play drinks a potion.
pub const AUTO_POTION_HP_PERCENT: i32 = 30;

/// Command auto-play would issue for the player this turn.
///
/// The player is scored like an aggressive combatant; a potion comes first
/// when hp runs low and one is left.
pub fn suggest_command(state: &BattleState) -> PlayerCommand {
    let player = &state.player;
    if !player.is_alive() {
        return PlayerCommand::Wait;
    }
    if state.potions > 0 && player.hp_percent() <= AUTO_POTION_HP_PERCENT {
        return PlayerCommand::UseItem;
    }
    match choose_action(state, player.id, player.classification()) {
        BattleAction::Move { to } => PlayerCommand::Move { to },
        BattleAction::Attack { target } => PlayerCommand::Attack { target },
        BattleAction::UseAbility {
            ability, target, ..
        } => PlayerCommand::UseAbility {
            ability,
            target: Some(target),
        },
        BattleAction::Wait => PlayerCommand::Wait,
    }
}

/// [`ActionDecider`] backed by boss rules and utility scoring.
#[derive(Clone, Copy, Debug, Default)]
pub struct TacticalAi;

impl ActionDecider for TacticalAi {
    fn decide(&mut self, state: &BattleState, actor: EntityId) -> BattleAction {
        decide_action(state, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{Position, StateBuilder};

    #[test]
    fn dead_or_unknown_actors_wait() {
        let mut state = StateBuilder::open(9, 7)
            .enemy_at(1, Position::new(5, 3))
            .build();
        assert_eq!(decide_action(&state, EntityId(9)), BattleAction::Wait);

        state.enemies[0].stats.hp = 0;
        assert_eq!(decide_action(&state, EntityId(1)), BattleAction::Wait);
    }

    #[test]
    fn melee_actor_closes_distance() {
        let state = StateBuilder::open(11, 7)
            .player_at(Position::new(1, 3))
            .enemy_at(1, Position::new(9, 3))
            .build();
        let action = decide_action(&state, EntityId(1));
        let BattleAction::Move { to } = action else {
            panic!("expected a move, got {action:?}");
        };
        assert!(to.manhattan(Position::new(1, 3)) < 8);
    }

    #[test]
    fn auto_play_drinks_when_low_and_strikes_otherwise() {
        let state = StateBuilder::open(9, 7)
            .player_at(Position::new(4, 3))
            .player_hp(5)
            .enemy_at(1, Position::new(5, 3))
            .build();
        assert_eq!(suggest_command(&state), PlayerCommand::UseItem);

        let mut state = state;
        state.potions = 0;
        state.enemies[0].stats.hp = 2;
        assert!(matches!(
            suggest_command(&state),
            PlayerCommand::Attack { target: EntityId(1) }
                | PlayerCommand::UseAbility {
                    target: Some(EntityId(1)),
                    ..
                }
        ));
    }
}
