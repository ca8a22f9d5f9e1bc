use super::common::{Position, WorldId};
use super::entity::CombatantSnapshot;

/// An off-arena enemy that joins after a countdown.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingReinforcement {
    pub world_id: WorldId,
    pub snapshot: CombatantSnapshot,
    pub world_position: Position,
    /// Rounds until arrival. Starts at or above the minimum arrival and only
    /// ever decreases.
    pub turns_until_arrival: u32,
    /// Rounds the arrival was postponed because no entry tile was free.
    pub delayed_rounds: u32,
}

impl PendingReinforcement {
    pub fn new(
        world_id: WorldId,
        snapshot: CombatantSnapshot,
        world_position: Position,
        turns_until_arrival: u32,
    ) -> Self {
        Self {
            world_id,
            snapshot,
            world_position,
            turns_until_arrival,
            delayed_rounds: 0,
        }
    }

    pub fn is_due(&self) -> bool {
        self.turns_until_arrival == 0
    }
}

/// Encounter size bucket used to cap reinforcements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EncounterSize {
    Solo,
    Small,
    Medium,
    Boss,
}

impl EncounterSize {
    /// Classifies an encounter by its starting enemy count.
    pub const fn classify(enemy_count: usize, is_boss: bool) -> Self {
        if is_boss {
            return EncounterSize::Boss;
        }
        match enemy_count {
            0 | 1 => EncounterSize::Solo,
            2 | 3 => EncounterSize::Small,
            _ => EncounterSize::Medium,
        }
    }
}
