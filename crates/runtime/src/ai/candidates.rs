//! Legal actions available to one combatant this turn.

use battle_core::action::{reposition_destination, valid_targets};
use battle_core::pathing::Reach;
use battle_core::{
    AbilityEffect, AbilityKind, ActionKind, BattleAction, BattleEntity, BattleState, EntityId,
    Position, reachable_tiles,
};

/// One enumerated action before scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateAction {
    pub action: BattleAction,
    /// Tile the actor stands on once the action resolves.
    pub destination: Position,
    /// Route length and hazard-weighted cost, for moves.
    pub route: Option<Reach>,
}

impl CandidateAction {
    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    pub fn target(&self) -> Option<EntityId> {
        self.action.target()
    }

    /// Ability used by this candidate, basic attacks included.
    pub fn ability(&self) -> Option<AbilityKind> {
        match self.action {
            BattleAction::Attack { .. } => Some(AbilityKind::BasicAttack),
            BattleAction::UseAbility { ability, .. } => Some(ability),
            BattleAction::Move { .. } | BattleAction::Wait => None,
        }
    }

    /// Stable digest of the action, for comparing decisions across runs.
    pub fn fingerprint(&self) -> u64 {
        self.action.fingerprint()
    }
}

/// Builds the action that uses `ability` on `target`, with the tile the
/// actor ends on. `None` when a repositioning ability has nowhere to go.
pub fn ability_action(
    state: &BattleState,
    actor: &BattleEntity,
    ability: AbilityKind,
    target: EntityId,
) -> Option<(BattleAction, Position)> {
    match ability.def().effect {
        AbilityEffect::Reposition { max_distance } => {
            let at = reposition_destination(state, actor, max_distance)?;
            Some((
                BattleAction::UseAbility {
                    ability,
                    target,
                    at: Some(at),
                },
                at,
            ))
        }
        _ if ability == AbilityKind::BasicAttack => {
            Some((BattleAction::Attack { target }, actor.position))
        }
        _ => Some((
            BattleAction::UseAbility {
                ability,
                target,
                at: None,
            },
            actor.position,
        )),
    }
}

/// Every legal action for `actor`, in a fixed order:
///
/// 1. abilities in the actor's ability order, each with its targets in
///    raster order (only abilities off cooldown with at least one target)
/// 2. moves to every reachable tile, in raster order
/// 3. wait
///
/// The order is the tie-break: when two candidates score the same, the one
/// listed first wins.
pub fn enumerate_candidate_actions(state: &BattleState, actor: &BattleEntity) -> Vec<CandidateAction> {
    let mut candidates = Vec::new();
    if !actor.is_alive() || actor.statuses.prevents_action() {
        candidates.push(wait(actor));
        return candidates;
    }

    for ability in actor.stats.abilities.iter().copied() {
        if !actor.is_ready(ability) {
            continue;
        }
        for target in valid_targets(state, actor, ability) {
            if let Some((action, destination)) = ability_action(state, actor, ability, target) {
                candidates.push(CandidateAction {
                    action,
                    destination,
                    route: None,
                });
            }
        }
    }

    let reach = reachable_tiles(state, actor.position, actor.move_range(), actor.id);
    candidates.extend(reach.destinations().map(|(to, route)| CandidateAction {
        action: BattleAction::Move { to },
        destination: to,
        route: Some(route),
    }));

    candidates.push(wait(actor));
    candidates
}

fn wait(actor: &BattleEntity) -> CandidateAction {
    CandidateAction {
        action: BattleAction::Wait,
        destination: actor.position,
        route: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::builder::enemy;
    use battle_core::{StateBuilder, StatusKind};

    #[test]
    fn order_is_abilities_then_moves_then_wait() {
        let state = StateBuilder::open(7, 7)
            .player_at(Position::new(3, 2))
            .enemy_at(1, Position::new(3, 3))
            .build();
        let actor = &state.enemies[0];
        let candidates = enumerate_candidate_actions(&state, actor);

        assert_eq!(
            candidates[0].action,
            BattleAction::Attack {
                target: EntityId::PLAYER
            }
        );
        assert_eq!(candidates.last().map(|c| c.action), Some(BattleAction::Wait));

        let moves: Vec<Position> = candidates
            .iter()
            .filter_map(|c| match c.action {
                BattleAction::Move { to } => Some(to),
                _ => None,
            })
            .collect();
        assert!(!moves.is_empty());
        assert!(moves.windows(2).all(|w| w[0].raster_key() < w[1].raster_key()));
        assert!(!moves.contains(&Position::new(3, 2)));
    }

    #[test]
    fn abilities_on_cooldown_are_skipped() {
        let mut actor = enemy(1, Position::new(3, 3));
        actor.cooldowns.insert(AbilityKind::BasicAttack, 1);
        let state = StateBuilder::open(7, 7)
            .player_at(Position::new(3, 2))
            .enemy(actor)
            .build();

        let candidates = enumerate_candidate_actions(&state, &state.enemies[0]);
        assert!(candidates.iter().all(|c| c.kind() != ActionKind::Attack));
    }

    #[test]
    fn rooted_actor_can_only_act_in_place() {
        let mut actor = enemy(1, Position::new(3, 3));
        actor.statuses.apply(StatusKind::Rooted, 2);
        let state = StateBuilder::open(7, 7)
            .player_at(Position::new(1, 1))
            .enemy(actor)
            .build();

        let candidates = enumerate_candidate_actions(&state, &state.enemies[0]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].action, BattleAction::Wait);
    }
}
