//! Timed status effects carried by combatants.
//!
//! # Round-based Duration
//!
//! Each effect stores `remaining` rounds. The round processor ticks every
//! effect once at end-of-round: damage-per-tick is applied, `remaining` is
//! decremented and effects reaching zero are dropped. Ticking never mutates
//! the collection in place; it builds the next collection from the previous.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;

/// Types of status effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusKind {
    // ========================================================================
    // Damage over time
    // ========================================================================
    Burning,
    Poisoned,

    // ========================================================================
    // Movement
    // ========================================================================
    /// Cannot move or act.
    Frozen,
    /// Cannot move.
    Rooted,
    Slowed,
    Hasted,

    // ========================================================================
    // Defense
    // ========================================================================
    Feared,
    Sundered,
    Shielded,

    // ========================================================================
    // Visibility
    // ========================================================================
    /// Cannot be targeted from beyond melee range.
    Cloaked,
}

impl StatusKind {
    /// Builds the effect instance this kind applies for `duration` rounds.
    pub const fn effect(self, duration: u32) -> StatusEffect {
        let mut effect = StatusEffect {
            kind: self,
            remaining: duration,
            damage_per_tick: None,
            defense_percent: None,
            speed_percent: None,
            hidden: false,
        };
        match self {
            StatusKind::Burning => effect.damage_per_tick = Some(3),
            StatusKind::Poisoned => effect.damage_per_tick = Some(2),
            StatusKind::Frozen | StatusKind::Rooted => effect.speed_percent = Some(0),
            StatusKind::Slowed => effect.speed_percent = Some(50),
            StatusKind::Hasted => effect.speed_percent = Some(200),
            StatusKind::Feared => effect.defense_percent = Some(75),
            StatusKind::Sundered => effect.defense_percent = Some(50),
            StatusKind::Shielded => effect.defense_percent = Some(150),
            StatusKind::Cloaked => effect.hidden = true,
        }
        effect
    }

    pub const fn is_debuff(self) -> bool {
        !matches!(
            self,
            StatusKind::Hasted | StatusKind::Shielded | StatusKind::Cloaked
        )
    }
}

/// A single status effect with its remaining duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Rounds left, always > 0 while the effect is stored.
    pub remaining: u32,
    pub damage_per_tick: Option<i32>,
    /// Multiplier applied to defense, in percent.
    pub defense_percent: Option<u32>,
    /// Multiplier applied to movement range, in percent.
    pub speed_percent: Option<u32>,
    pub hidden: bool,
}

/// Outcome of one end-of-round tick over a status set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusTick {
    pub next: StatusEffects,
    /// Damage-per-tick summed over every effect, in application order.
    pub damage: Vec<(StatusKind, i32)>,
    pub expired: Vec<StatusKind>,
}

/// Active status effects on a combatant, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Applies `kind` for `duration` rounds.
    ///
    /// Re-applying an active effect refreshes it to the longer duration.
    /// A zero duration is ignored, as is a new kind when the set is full.
    pub fn apply(&mut self, kind: StatusKind, duration: u32) {
        if duration == 0 {
            return;
        }
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.remaining = existing.remaining.max(duration);
            return;
        }
        if !self.effects.is_full() {
            self.effects.push(kind.effect(duration));
        }
    }

    pub fn remove(&mut self, kind: StatusKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Combined defense multiplier in percent (multiplicative across effects).
    pub fn defense_percent(&self) -> u32 {
        self.effects
            .iter()
            .filter_map(|e| e.defense_percent)
            .fold(100, |acc, pct| acc * pct / 100)
    }

    /// Combined speed multiplier in percent (multiplicative across effects).
    pub fn speed_percent(&self) -> u32 {
        self.effects
            .iter()
            .filter_map(|e| e.speed_percent)
            .fold(100, |acc, pct| acc * pct / 100)
    }

    pub fn is_hidden(&self) -> bool {
        self.effects.iter().any(|e| e.hidden)
    }

    /// True when the carrier skips its action entirely.
    pub fn prevents_action(&self) -> bool {
        self.has(StatusKind::Frozen)
    }

    /// Computes the next status set after one round.
    pub fn tick(&self) -> StatusTick {
        let damage = self
            .effects
            .iter()
            .filter_map(|e| e.damage_per_tick.map(|dmg| (e.kind, dmg)))
            .collect();

        let expired = self
            .effects
            .iter()
            .filter(|e| e.remaining <= 1)
            .map(|e| e.kind)
            .collect();

        let next = StatusEffects {
            effects: self
                .effects
                .iter()
                .filter(|e| e.remaining > 1)
                .map(|e| StatusEffect {
                    remaining: e.remaining - 1,
                    ..*e
                })
                .collect(),
        };

        StatusTick {
            next,
            damage,
            expired,
        }
    }
}
