//! Round state machine.
//!
//! ```text
//! Pending -> PlayerTurn -> EnemyTurn -> EndOfRound -> PlayerTurn ...
//!                 |            |            |
//!                 +------------+------------+--> Victory | Defeat | Flee
//! ```
//!
//! Enemy decisions come from an [`ActionDecider`] supplied by the caller, so
//! the rules crate never depends on a particular AI.

use crate::action::{
    BattleAction, BattleEvent, CommandError, Outbox, PlayerCommand, execute_action,
    execute_player_command,
};
use crate::reinforcement::{ReinforcementTick, tick_reinforcements};
use crate::round::process_end_of_round;
use crate::state::{BattleOutcome, BattlePhase, BattleState, EntityId, Side};

/// Chooses an action for a non-player combatant.
pub trait ActionDecider {
    fn decide(&mut self, state: &BattleState, actor: EntityId) -> BattleAction;
}

impl<F> ActionDecider for F
where
    F: FnMut(&BattleState, EntityId) -> BattleAction,
{
    fn decide(&mut self, state: &BattleState, actor: EntityId) -> BattleAction {
        self(state, actor)
    }
}

/// Decider that always waits.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passive;

impl ActionDecider for Passive {
    fn decide(&mut self, _state: &BattleState, _actor: EntityId) -> BattleAction {
        BattleAction::Wait
    }
}

/// Executes the player's command and hands the round to the enemies.
pub fn player_phase(
    state: &mut BattleState,
    command: &PlayerCommand,
    out: &mut Outbox,
) -> Result<BattleOutcome, CommandError> {
    execute_player_command(state, command, out)?;
    let outcome = state.check_outcome();
    if !outcome.is_terminal() {
        state.phase = BattlePhase::EnemyTurn;
    }
    Ok(outcome)
}

/// Every living enemy acts once, in the turn order fixed at phase start.
///
/// Combatants that die mid-phase are skipped; combatants that join
/// mid-phase (summons) first act next round.
pub fn enemy_phase(
    state: &mut BattleState,
    decider: &mut dyn ActionDecider,
    out: &mut Outbox,
) -> BattleOutcome {
    if state.phase != BattlePhase::EnemyTurn || state.outcome.is_terminal() {
        return state.outcome;
    }

    let order = state.turn_order.clone();
    for id in order {
        let Some(actor) = state.entity(id).filter(|e| e.is_alive()) else {
            continue;
        };
        if actor.side != Side::Enemy {
            continue;
        }
        let frozen = actor.statuses.prevents_action();
        let name = actor.stats.name.clone();

        state.set_active(id);
        out.emit(BattleEvent::EnemyTurnStarted { entity: id });
        if frozen {
            out.narrate(format!("{name} is frozen and loses its turn."));
        } else {
            let action = decider.decide(state, id);
            execute_action(state, id, action, out);
        }
        out.emit(BattleEvent::EnemyTurnEnded { entity: id });

        if state.check_outcome().is_terminal() {
            return state.outcome;
        }
    }

    state.phase = BattlePhase::EndOfRound;
    state.outcome
}

/// Ticks statuses and reinforcements, then opens the next round.
pub fn end_of_round(state: &mut BattleState, out: &mut Outbox) -> ReinforcementTick {
    if state.phase != BattlePhase::EndOfRound || state.outcome.is_terminal() {
        return ReinforcementTick::default();
    }

    process_end_of_round(state, out);
    let tick = tick_reinforcements(state, out);
    state.turn += 1;
    state.recompute_turn_order();

    if !state.check_outcome().is_terminal() {
        state.phase = BattlePhase::PlayerTurn;
        state.set_active(EntityId::PLAYER);
    }
    tick
}

/// Result of one full round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundReport {
    pub outcome: BattleOutcome,
    pub reinforcements: ReinforcementTick,
}

/// Player command, enemy phase and end of round in one call.
///
/// Stops at the first terminal outcome. On error nothing has changed.
pub fn run_round(
    state: &mut BattleState,
    command: &PlayerCommand,
    decider: &mut dyn ActionDecider,
    out: &mut Outbox,
) -> Result<RoundReport, CommandError> {
    let mut report = RoundReport {
        outcome: player_phase(state, command, out)?,
        reinforcements: ReinforcementTick::default(),
    };
    if report.outcome.is_terminal() {
        return Ok(report);
    }

    report.outcome = enemy_phase(state, decider, out);
    if report.outcome.is_terminal() {
        return Ok(report);
    }

    report.reinforcements = end_of_round(state, out);
    report.outcome = state.outcome;
    Ok(report)
}
