//! Combatants and their stat snapshots.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;
use bitflags::bitflags;

use super::ability::AbilityKind;
use super::common::{EntityId, Position, Side, WorldId};
use super::status::StatusEffects;
use crate::config::BattleConfig;
use crate::dice::DiceNotation;

bitflags! {
    /// Classification flags copied from the world entity.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EntityFlags: u8 {
        const ELITE    = 1 << 0;
        const BOSS     = 1 << 1;
        /// Called into the arena by another combatant; never exists in the world.
        const SUMMONED = 1 << 2;
    }
}

/// Baseline decision style of a combatant.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Behavior {
    #[default]
    Aggressive,
    Defensive,
    Ranged,
    Elemental,
}

impl Behavior {
    /// Ranged and elemental behaviors hold a distance band instead of closing in.
    pub const fn kites(self) -> bool {
        matches!(self, Behavior::Ranged | Behavior::Elemental)
    }
}

/// Scripted boss families with their own priority rules.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BossArchetype {
    Sovereign,
    Pursuer,
    Conjurer,
    Apex,
}

/// Everything the AI layer needs to know about "what kind of enemy" this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
    pub behavior: Behavior,
    pub boss: Option<BossArchetype>,
}

impl Classification {
    pub const fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            boss: None,
        }
    }

    pub const fn boss(behavior: Behavior, archetype: BossArchetype) -> Self {
        Self {
            behavior,
            boss: Some(archetype),
        }
    }
}

pub type AbilityList = ArrayVec<AbilityKind, { BattleConfig::MAX_ABILITIES }>;

/// Combat stats of one combatant.
///
/// Shared by live [`BattleEntity`] records and queued reinforcements so that
/// materializing an arrival is a plain move of this struct.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSnapshot {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    /// Base movement range in tiles per turn.
    pub speed: u32,
    pub luck: i32,
    /// Added to the initiative roll at battle start or on arrival.
    pub initiative_bonus: i32,
    pub damage: DiceNotation,
    /// Ordered; the order is the ability index used for enumeration.
    pub abilities: AbilityList,
    pub flags: EntityFlags,
    pub classification: Classification,
}

impl CombatantSnapshot {
    pub fn is_boss(&self) -> bool {
        self.flags.contains(EntityFlags::BOSS)
    }
}

/// One combatant inside the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleEntity {
    pub id: EntityId,
    pub side: Side,
    pub position: Position,
    /// Where the combatant stood in the world before the battle.
    pub world_position: Position,
    /// Registry identity; `None` for summons.
    pub world_id: Option<WorldId>,
    pub stats: CombatantSnapshot,
    /// Rolled initiative for this battle.
    pub initiative: i32,
    pub statuses: StatusEffects,
    /// Ability → rounds remaining. Only nonzero entries are stored.
    pub cooldowns: BTreeMap<AbilityKind, u32>,
    /// Set on summoned minions.
    pub summoner: Option<EntityId>,
}

impl BattleEntity {
    pub fn new(
        id: EntityId,
        side: Side,
        position: Position,
        world_position: Position,
        stats: CombatantSnapshot,
    ) -> Self {
        Self {
            id,
            side,
            position,
            world_position,
            world_id: None,
            stats,
            initiative: 0,
            statuses: StatusEffects::empty(),
            cooldowns: BTreeMap::new(),
            summoner: None,
        }
    }

    pub fn with_world_id(mut self, world_id: WorldId) -> Self {
        self.world_id = Some(world_id);
        self
    }

    #[inline]
    pub fn hp(&self) -> i32 {
        self.stats.hp
    }

    #[inline]
    pub fn max_hp(&self) -> i32 {
        self.stats.max_hp
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }

    pub fn is_boss(&self) -> bool {
        self.stats.is_boss()
    }

    pub fn is_summoned(&self) -> bool {
        self.stats.flags.contains(EntityFlags::SUMMONED)
    }

    pub fn behavior(&self) -> Behavior {
        self.stats.classification.behavior
    }

    pub fn classification(&self) -> Classification {
        self.stats.classification
    }

    /// HP as a percentage of max HP (0..=100).
    pub fn hp_percent(&self) -> i32 {
        if self.stats.max_hp <= 0 {
            return 0;
        }
        self.stats.hp * 100 / self.stats.max_hp
    }

    /// Defense after status multipliers.
    pub fn effective_defense(&self) -> i32 {
        self.stats.defense * self.statuses.defense_percent() as i32 / 100
    }

    /// Movement range after status multipliers.
    pub fn move_range(&self) -> u32 {
        self.stats.speed * self.statuses.speed_percent() / 100
    }

    pub fn knows(&self, ability: AbilityKind) -> bool {
        self.stats.abilities.contains(&ability)
    }

    pub fn cooldown(&self, ability: AbilityKind) -> u32 {
        self.cooldowns.get(&ability).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, ability: AbilityKind) -> bool {
        self.knows(ability) && self.cooldown(ability) == 0
    }

    /// Starts the ability's cooldown (zero cooldowns are not stored).
    pub fn trigger_cooldown(&mut self, ability: AbilityKind) {
        let cooldown = ability.def().cooldown;
        if cooldown > 0 {
            self.cooldowns.insert(ability, cooldown);
        }
    }

    /// Applies damage, clamping HP at zero. Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let dealt = amount.max(0).min(self.stats.hp);
        self.stats.hp -= dealt;
        dealt
    }

    /// Heals up to max HP. Returns the amount restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let restored = amount.max(0).min(self.stats.max_hp - self.stats.hp);
        self.stats.hp += restored;
        restored
    }

    pub fn is_hostile_to(&self, other: &BattleEntity) -> bool {
        self.side != other.side
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(hp: i32) -> CombatantSnapshot {
        CombatantSnapshot {
            name: "goblin".into(),
            hp,
            max_hp: hp,
            attack: 3,
            defense: 4,
            speed: 4,
            luck: 0,
            initiative_bonus: 1,
            damage: DiceNotation::new(1, 6, 0),
            abilities: [AbilityKind::BasicAttack].into_iter().collect(),
            flags: EntityFlags::empty(),
            classification: Classification::new(Behavior::Aggressive),
        }
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut entity = BattleEntity::new(
            EntityId(1),
            Side::Enemy,
            Position::new(1, 1),
            Position::ORIGIN,
            snapshot(5),
        );
        assert_eq!(entity.take_damage(9), 5);
        assert_eq!(entity.hp(), 0);
        assert!(!entity.is_alive());
    }

    #[test]
    fn cooldowns_only_store_nonzero() {
        let mut entity = BattleEntity::new(
            EntityId(1),
            Side::Enemy,
            Position::ORIGIN,
            Position::ORIGIN,
            snapshot(5),
        );
        entity.trigger_cooldown(AbilityKind::BasicAttack);
        assert!(entity.cooldowns.is_empty());
        entity.trigger_cooldown(AbilityKind::PowerStrike);
        assert_eq!(entity.cooldown(AbilityKind::PowerStrike), 3);
    }

    #[test]
    fn statuses_change_effective_stats() {
        use crate::state::StatusKind;

        let mut entity = BattleEntity::new(
            EntityId(1),
            Side::Enemy,
            Position::ORIGIN,
            Position::ORIGIN,
            snapshot(5),
        );
        entity.statuses.apply(StatusKind::Slowed, 2);
        entity.statuses.apply(StatusKind::Sundered, 2);
        assert_eq!(entity.move_range(), 2);
        assert_eq!(entity.effective_defense(), 2);
    }
}
