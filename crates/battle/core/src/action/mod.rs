//! Actions, player commands and their executors.
//!
//! [`BattleAction`] is what any combatant does on its turn (chosen by the AI
//! or translated from a [`PlayerCommand`]). Executors validate first and only
//! then mutate, so a rejected command leaves the state untouched.

mod execute;
mod outbox;
mod targeting;

use sha2::{Digest, Sha256};

use crate::error::{BattleError, ErrorSeverity};
use crate::state::{AbilityKind, EntityId, Position};

pub use execute::{execute_action, execute_player_command, validate_command};
pub(crate) use execute::{apply_damage, roll_initiative};
pub use outbox::{BattleEvent, DamageSource, Outbox};
pub use targeting::{
    is_valid_target, nearest_free_tile, reposition_destination, summon_tiles, valid_targets,
};

/// Discriminant of [`BattleAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Move,
    Attack,
    UseAbility,
    Wait,
}

/// A resolved action for one combatant's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleAction {
    Move {
        to: Position,
    },
    /// Basic attack.
    Attack {
        target: EntityId,
    },
    /// Any other ability. Self-targeted abilities name the user as target;
    /// `at` carries the landing tile of repositioning abilities.
    UseAbility {
        ability: AbilityKind,
        target: EntityId,
        at: Option<Position>,
    },
    Wait,
}

impl BattleAction {
    pub const fn kind(&self) -> ActionKind {
        match self {
            BattleAction::Move { .. } => ActionKind::Move,
            BattleAction::Attack { .. } => ActionKind::Attack,
            BattleAction::UseAbility { .. } => ActionKind::UseAbility,
            BattleAction::Wait => ActionKind::Wait,
        }
    }

    pub const fn target(&self) -> Option<EntityId> {
        match self {
            BattleAction::Attack { target } | BattleAction::UseAbility { target, .. } => {
                Some(*target)
            }
            _ => None,
        }
    }

    /// Stable 64-bit digest of this action, for test verification.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Sha256::new();
        match *self {
            BattleAction::Move { to } => {
                hasher.update([0u8]);
                hasher.update(to.x.to_le_bytes());
                hasher.update(to.y.to_le_bytes());
            }
            BattleAction::Attack { target } => {
                hasher.update([1u8]);
                hasher.update(target.0.to_le_bytes());
            }
            BattleAction::UseAbility {
                ability,
                target,
                at,
            } => {
                hasher.update([2u8]);
                hasher.update(ability.as_ref().as_bytes());
                hasher.update(target.0.to_le_bytes());
                if let Some(at) = at {
                    hasher.update(at.x.to_le_bytes());
                    hasher.update(at.y.to_le_bytes());
                }
            }
            BattleAction::Wait => hasher.update([3u8]),
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }
}

/// Input accepted from the player during their turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerCommand {
    Move {
        to: Position,
    },
    Attack {
        target: EntityId,
    },
    /// `target` is ignored for self-targeted abilities.
    UseAbility {
        ability: AbilityKind,
        target: Option<EntityId>,
    },
    /// Drink a healing potion.
    UseItem,
    Wait,
    Flee,
}

impl PlayerCommand {
    pub const fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Move { .. } => "move",
            PlayerCommand::Attack { .. } => "attack",
            PlayerCommand::UseAbility { .. } => "use_ability",
            PlayerCommand::UseItem => "use_item",
            PlayerCommand::Wait => "wait",
            PlayerCommand::Flee => "flee",
        }
    }
}

/// Reasons a player command is rejected. Rejection never mutates state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("no battle is in progress")]
    NoActiveBattle,

    #[error("commands are only accepted during the player turn")]
    NotPlayerTurn,

    #[error("unknown target {0}")]
    UnknownTarget(EntityId),

    #[error("target {0} is already defeated")]
    TargetDefeated(EntityId),

    #[error("target {target} is out of range ({distance} > {range})")]
    OutOfRange {
        target: EntityId,
        distance: u32,
        range: u32,
    },

    #[error("{0} is on cooldown for {1} more rounds")]
    AbilityOnCooldown(AbilityKind, u32),

    #[error("{0} is not known")]
    AbilityNotKnown(AbilityKind),

    #[error("{0} cannot be used right now")]
    AbilityUnavailable(AbilityKind),

    #[error("tile {0} cannot be reached this turn")]
    Unreachable(Position),

    #[error("no potions left")]
    NoItemsLeft,

    #[error("fleeing is not possible in this encounter")]
    FleeForbidden,
}

impl BattleError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoActiveBattle => "COMMAND_NO_ACTIVE_BATTLE",
            Self::NotPlayerTurn => "COMMAND_NOT_PLAYER_TURN",
            Self::UnknownTarget(_) => "COMMAND_UNKNOWN_TARGET",
            Self::TargetDefeated(_) => "COMMAND_TARGET_DEFEATED",
            Self::OutOfRange { .. } => "COMMAND_OUT_OF_RANGE",
            Self::AbilityOnCooldown(..) => "COMMAND_ABILITY_ON_COOLDOWN",
            Self::AbilityNotKnown(_) => "COMMAND_ABILITY_NOT_KNOWN",
            Self::AbilityUnavailable(_) => "COMMAND_ABILITY_UNAVAILABLE",
            Self::Unreachable(_) => "COMMAND_UNREACHABLE",
            Self::NoItemsLeft => "COMMAND_NO_ITEMS_LEFT",
            Self::FleeForbidden => "COMMAND_FLEE_FORBIDDEN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprints_distinguish_actions() {
        let a = BattleAction::Move {
            to: Position::new(1, 2),
        };
        let b = BattleAction::Move {
            to: Position::new(2, 1),
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a.fingerprint());
        assert_ne!(
            BattleAction::Wait.fingerprint(),
            BattleAction::Attack {
                target: EntityId(3)
            }
            .fingerprint()
        );
    }

    #[test]
    fn command_errors_are_validation() {
        assert!(CommandError::NotPlayerTurn.severity().is_recoverable());
        assert_eq!(CommandError::NoItemsLeft.error_code(), "COMMAND_NO_ITEMS_LEFT");
    }
}
