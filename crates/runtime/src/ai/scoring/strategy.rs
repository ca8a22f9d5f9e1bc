//! Positioning strategies selected by behavior.

use battle_core::pathing::{EscapeQuery, count_safe_escape_tiles_with};
use battle_core::{BattleEntity, BattleState, Behavior, Position};

use super::kiting::KitingStrategy;

/// What a strategy sees when valuing a destination.
#[derive(Clone, Copy, Debug)]
pub struct PositionContext<'a> {
    pub state: &'a BattleState,
    pub actor: &'a BattleEntity,
    pub target: &'a BattleEntity,
    pub destination: Position,
    /// Manhattan distance from `destination` to the target.
    pub distance: u32,
    pub kill_shot: bool,
}

/// A pure positioning policy.
///
/// Strategies hold no state; the same context always yields the same value.
pub trait ScoringStrategy: Sync {
    fn name(&self) -> &'static str;

    /// Value of ending the turn on `ctx.destination`.
    fn positioning(&self, ctx: &PositionContext<'_>) -> i64;

    /// Multiplier on missing hp percent in the exposure penalty.
    fn exposure_factor(&self) -> i64;
}

/// Closes distance to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeleeStrategy {
    name: &'static str,
    /// Points per tile of distance to the target.
    pub approach_weight: i64,
    pub exposure_factor: i64,
    /// Points per safe escape tile kept around the destination.
    pub safety_weight: i64,
}

impl MeleeStrategy {
    pub const fn aggressive() -> Self {
        Self {
            name: "aggressive",
            approach_weight: 40,
            exposure_factor: 1,
            safety_weight: 0,
        }
    }

    pub const fn defensive() -> Self {
        Self {
            name: "defensive",
            approach_weight: 30,
            exposure_factor: 3,
            safety_weight: 8,
        }
    }
}

impl ScoringStrategy for MeleeStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn positioning(&self, ctx: &PositionContext<'_>) -> i64 {
        let mut value = -self.approach_weight * i64::from(ctx.distance);
        if self.safety_weight != 0 {
            let escapes = count_safe_escape_tiles_with(
                ctx.state,
                ctx.destination,
                EscapeQuery {
                    ignore: Some(ctx.actor.id),
                    blocker: None,
                },
            );
            value += self.safety_weight * i64::from(escapes);
        }
        value
    }

    fn exposure_factor(&self) -> i64 {
        self.exposure_factor
    }
}

static AGGRESSIVE: MeleeStrategy = MeleeStrategy::aggressive();
static DEFENSIVE: MeleeStrategy = MeleeStrategy::defensive();
static KITING: KitingStrategy = KitingStrategy;

/// The strategy a behavior tag scores with.
pub fn strategy_for(behavior: Behavior) -> &'static dyn ScoringStrategy {
    match behavior {
        Behavior::Aggressive => &AGGRESSIVE,
        Behavior::Defensive => &DEFENSIVE,
        Behavior::Ranged | Behavior::Elemental => &KITING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaviors_map_to_strategies() {
        assert_eq!(strategy_for(Behavior::Aggressive).name(), "aggressive");
        assert_eq!(strategy_for(Behavior::Defensive).name(), "defensive");
        assert_eq!(strategy_for(Behavior::Ranged).name(), "kiting");
        assert_eq!(strategy_for(Behavior::Elemental).name(), "kiting");
    }
}
