use crate::state::EncounterSize;

/// Battle engine configuration constants and tunable parameters.
///
/// Compile-time constants size fixed-capacity collections; everything else is a
/// runtime-tunable default that content files or the environment may override.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Manhattan radius around the encounter origin scanned for reinforcements.
    pub detection_radius: u32,
    /// Lower bound for `turns_until_arrival`.
    pub min_arrival: u32,
    /// Distance-to-turns factor for reinforcement arrival, in percent.
    pub arrival_factor_percent: u32,
    /// Reinforcement caps indexed by encounter size.
    pub reinforcement_caps: ReinforcementCaps,
    /// Score penalty per point of hazard cost on a chosen destination.
    pub hazard_penalty_weight: i64,
    /// Score bonus awarded to any action that is a legal kill-shot.
    pub kill_shot_bonus: i64,
    /// Preferred distance band for ranged and elemental behaviors.
    pub kiting_band: RangeBand,
    /// Added to every attack roll.
    pub proficiency_bonus: i32,
    /// Maximum living minions a summoner may control.
    pub summon_cap: u32,
    /// Healing potions carried into every battle.
    pub starting_potions: u32,
    /// Noise added to the pressure accumulator per player command kind.
    pub noise: NoiseWeights,
    /// Narration lines retained by message buffers.
    pub message_capacity: usize,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STATUS_EFFECTS: usize = 8;
    pub const MAX_ABILITIES: usize = 6;
    pub const MAX_DICE: usize = 64;

    // ===== arena geometry (fixed per bucket, never derived) =====
    pub const REGULAR_ARENA_WIDTH: u32 = 15;
    pub const REGULAR_ARENA_HEIGHT: u32 = 11;
    pub const BOSS_ARENA_WIDTH: u32 = 21;
    pub const BOSS_ARENA_HEIGHT: u32 = 15;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DETECTION_RADIUS: u32 = 12;
    pub const DEFAULT_MIN_ARRIVAL: u32 = 2;
    pub const DEFAULT_ARRIVAL_FACTOR_PERCENT: u32 = 50;
    pub const DEFAULT_HAZARD_PENALTY_WEIGHT: i64 = 8;
    pub const DEFAULT_KILL_SHOT_BONUS: i64 = 10_000;
    pub const DEFAULT_PROFICIENCY_BONUS: i32 = 2;
    pub const DEFAULT_SUMMON_CAP: u32 = 3;
    pub const DEFAULT_STARTING_POTIONS: u32 = 2;
    pub const DEFAULT_MESSAGE_CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self {
            detection_radius: Self::DEFAULT_DETECTION_RADIUS,
            min_arrival: Self::DEFAULT_MIN_ARRIVAL,
            arrival_factor_percent: Self::DEFAULT_ARRIVAL_FACTOR_PERCENT,
            reinforcement_caps: ReinforcementCaps::default(),
            hazard_penalty_weight: Self::DEFAULT_HAZARD_PENALTY_WEIGHT,
            kill_shot_bonus: Self::DEFAULT_KILL_SHOT_BONUS,
            kiting_band: RangeBand::default(),
            proficiency_bonus: Self::DEFAULT_PROFICIENCY_BONUS,
            summon_cap: Self::DEFAULT_SUMMON_CAP,
            starting_potions: Self::DEFAULT_STARTING_POTIONS,
            noise: NoiseWeights::default(),
            message_capacity: Self::DEFAULT_MESSAGE_CAPACITY,
        }
    }

    pub fn with_detection_radius(mut self, detection_radius: u32) -> Self {
        self.detection_radius = detection_radius;
        self
    }

    pub fn with_hazard_penalty_weight(mut self, weight: i64) -> Self {
        self.hazard_penalty_weight = weight;
        self
    }

    /// Arena dimensions for the given bucket.
    pub const fn arena_size(is_boss: bool) -> (u32, u32) {
        if is_boss {
            (Self::BOSS_ARENA_WIDTH, Self::BOSS_ARENA_HEIGHT)
        } else {
            (Self::REGULAR_ARENA_WIDTH, Self::REGULAR_ARENA_HEIGHT)
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximum queued reinforcements per encounter size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReinforcementCaps {
    pub solo: u32,
    pub small: u32,
    pub medium: u32,
    pub boss: u32,
}

impl ReinforcementCaps {
    pub const fn for_size(&self, size: EncounterSize) -> u32 {
        match size {
            EncounterSize::Solo => self.solo,
            EncounterSize::Small => self.small,
            EncounterSize::Medium => self.medium,
            EncounterSize::Boss => self.boss,
        }
    }
}

impl Default for ReinforcementCaps {
    fn default() -> Self {
        Self {
            solo: 1,
            small: 2,
            medium: 3,
            boss: 4,
        }
    }
}

/// Inclusive distance band with a single preferred value inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeBand {
    pub min: u32,
    pub max: u32,
    pub sweet_spot: u32,
}

impl RangeBand {
    pub const fn new(min: u32, max: u32, sweet_spot: u32) -> Self {
        Self {
            min,
            max,
            sweet_spot,
        }
    }

    pub const fn contains(&self, distance: u32) -> bool {
        distance >= self.min && distance <= self.max
    }
}

impl Default for RangeBand {
    fn default() -> Self {
        Self::new(3, 5, 4)
    }
}

/// Noise weights per player command kind (attack > ability > item > move).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseWeights {
    pub attack: u32,
    pub ability: u32,
    pub item: u32,
    pub movement: u32,
}

impl Default for NoiseWeights {
    fn default() -> Self {
        Self {
            attack: 4,
            ability: 3,
            item: 2,
            movement: 1,
        }
    }
}
