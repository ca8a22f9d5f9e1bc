//! Dice rolling primitives: d20 checks, dice notation, attacks, damage, saves.
//!
//! # Luck
//!
//! Luck never widens the legal range of a roll. It only changes the chance
//! that a bad (positive luck) or good (negative luck) natural result is
//! rerolled once. Every d20 result stays in `[1, 20]`.
//!
//! # Determinism
//!
//! All rolls draw from the battle's own [`BattleRng`]; identical generator
//! state and inputs always yield identical results.

pub mod notation;
pub mod rng;

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
pub use notation::{DiceNotation, NotationError};
pub use rng::{BattleRng, compute_seed};

/// Percent chance per point of luck that a qualifying die is rerolled.
const LUCK_REROLL_PERCENT: u32 = 10;
/// Luck beyond this magnitude has no further effect.
const MAX_LUCK: i32 = 5;
/// Natural d20 results at or below this are "bad" for positive luck.
const BAD_D20_THRESHOLD: u32 = 5;
/// Natural d20 results at or above this are "good" for negative luck.
const GOOD_D20_THRESHOLD: u32 = 16;

// A critical hit doubles the largest notation pool; it must still fit.
const _: () = assert!(2 * DiceNotation::MAX_COUNT as usize <= BattleConfig::MAX_DICE);

/// How many d20s are rolled and which is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl RollMode {
    /// Advantage and disadvantage cancel out.
    pub const fn from_flags(advantage: bool, disadvantage: bool) -> Self {
        match (advantage, disadvantage) {
            (true, false) => Self::Advantage,
            (false, true) => Self::Disadvantage,
            _ => Self::Normal,
        }
    }
}

/// Outcome of a d20 roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct D20Roll {
    /// Every natural die thrown, including luck rerolls, in throw order.
    pub naturals: ArrayVec<u32, 4>,
    /// The kept natural result.
    pub result: u32,
}

/// Outcome of a dice-notation roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiceTotal {
    pub notation: DiceNotation,
    pub rolls: ArrayVec<u32, { BattleConfig::MAX_DICE }>,
    pub sum: i32,
}

/// Outcome of an attack roll against a target's armor class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRoll {
    pub natural: u32,
    pub total: i32,
    pub is_hit: bool,
    /// Natural 20; always hits.
    pub is_critical: bool,
    /// Natural 1; always misses.
    pub is_fumble: bool,
}

/// Outcome of a damage roll. `total` is never below 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageRoll {
    pub rolls: ArrayVec<u32, { BattleConfig::MAX_DICE }>,
    pub total: i32,
}

/// Outcome of a saving throw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavingThrow {
    pub natural: u32,
    pub total: i32,
    pub success: bool,
}

/// Dice roller bound to one battle's generator.
pub struct DiceEngine<'a> {
    rng: &'a mut BattleRng,
}

impl<'a> DiceEngine<'a> {
    pub fn new(rng: &'a mut BattleRng) -> Self {
        Self { rng }
    }

    /// Rolls a d20 honoring luck and advantage/disadvantage.
    pub fn roll_d20(&mut self, luck: i32, advantage: bool, disadvantage: bool) -> D20Roll {
        let mode = RollMode::from_flags(advantage, disadvantage);
        let mut naturals = ArrayVec::new();

        let first = self.lucky_d20(luck, &mut naturals);
        let result = match mode {
            RollMode::Normal => first,
            RollMode::Advantage => first.max(self.lucky_d20(luck, &mut naturals)),
            RollMode::Disadvantage => first.min(self.lucky_d20(luck, &mut naturals)),
        };

        D20Roll { naturals, result }
    }

    /// Rolls one d20 and applies at most one luck reroll.
    fn lucky_d20(&mut self, luck: i32, naturals: &mut ArrayVec<u32, 4>) -> u32 {
        let luck = luck.clamp(-MAX_LUCK, MAX_LUCK);
        let natural = self.rng.roll_die(20);
        naturals.push(natural);

        let qualifies = (luck > 0 && natural <= BAD_D20_THRESHOLD)
            || (luck < 0 && natural >= GOOD_D20_THRESHOLD);
        if qualifies && self.rng.chance(luck.unsigned_abs() * LUCK_REROLL_PERCENT) {
            let reroll = self.rng.roll_die(20);
            naturals.push(reroll);
            return reroll;
        }

        natural
    }

    /// Rolls a dice expression given as text. Malformed text rolls `1d6`.
    pub fn roll_dice_notation(&mut self, notation: &str, luck: i32) -> DiceTotal {
        let notation = DiceNotation::parse_or_default(notation);
        self.roll_notation(notation, luck)
    }

    /// Rolls an already parsed dice expression.
    pub fn roll_notation(&mut self, notation: DiceNotation, luck: i32) -> DiceTotal {
        let rolls = self.roll_pool(notation.count, notation.sides, luck);
        let sum = rolls.iter().map(|&r| r as i32).sum::<i32>() + notation.modifier;
        DiceTotal {
            notation,
            rolls,
            sum,
        }
    }

    /// Rolls `count` dice of `sides` faces; positive luck may reroll natural 1s.
    fn roll_pool(
        &mut self,
        count: u32,
        sides: u32,
        luck: i32,
    ) -> ArrayVec<u32, { BattleConfig::MAX_DICE }> {
        let luck = luck.clamp(-MAX_LUCK, MAX_LUCK);
        debug_assert!(
            count as usize <= BattleConfig::MAX_DICE,
            "{count} dice exceed the pool; notation caps at {} and a crit doubles it",
            DiceNotation::MAX_COUNT
        );
        let count = (count as usize).min(BattleConfig::MAX_DICE);
        let mut rolls = ArrayVec::new();
        for _ in 0..count {
            let mut roll = self.rng.roll_die(sides);
            if roll == 1 && luck > 0 && self.rng.chance(luck as u32 * LUCK_REROLL_PERCENT) {
                roll = self.rng.roll_die(sides);
            }
            rolls.push(roll);
        }
        rolls
    }

    /// Resolves an attack roll against `target_armor_class`.
    pub fn make_attack_roll(
        &mut self,
        attack_modifier: i32,
        target_armor_class: i32,
        luck: i32,
        proficiency: i32,
        mode: RollMode,
    ) -> AttackRoll {
        let roll = self.roll_d20(
            luck,
            mode == RollMode::Advantage,
            mode == RollMode::Disadvantage,
        );
        let natural = roll.result;
        let total = natural as i32 + attack_modifier + proficiency;

        let is_critical = natural == 20;
        let is_fumble = natural == 1;
        let is_hit = is_critical || (!is_fumble && total >= target_armor_class);

        AttackRoll {
            natural,
            total,
            is_hit,
            is_critical,
            is_fumble,
        }
    }

    /// Rolls weapon damage. A critical hit doubles the dice pool (not the
    /// modifier). The total is clamped to at least 1.
    pub fn make_damage_roll(
        &mut self,
        weapon_dice: DiceNotation,
        damage_modifier: i32,
        is_critical: bool,
        luck: i32,
    ) -> DamageRoll {
        let count = if is_critical {
            weapon_dice.count * 2
        } else {
            weapon_dice.count
        };
        let rolls = self.roll_pool(count, weapon_dice.sides, luck);
        let dice: i32 = rolls.iter().map(|&r| r as i32).sum();
        let total = (dice + weapon_dice.modifier + damage_modifier).max(1);

        DamageRoll { rolls, total }
    }

    /// Natural 20 always succeeds, natural 1 always fails.
    pub fn make_saving_throw(&mut self, ability_modifier: i32, dc: i32, luck: i32) -> SavingThrow {
        let natural = self.roll_d20(luck, false, false).result;
        let total = natural as i32 + ability_modifier;
        let success = match natural {
            20 => true,
            1 => false,
            _ => total >= dc,
        };

        SavingThrow {
            natural,
            total,
            success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_on_the_largest_pool_rolls_every_die() {
        let mut rng = BattleRng::new(5);
        let widest = DiceNotation::new(DiceNotation::MAX_COUNT, 6, 0);
        let mut dice = DiceEngine::new(&mut rng);
        assert_eq!(dice.make_damage_roll(widest, 0, false, 0).rolls.len(), 32);
        assert_eq!(dice.make_damage_roll(widest, 0, true, 0).rolls.len(), 64);
    }

    #[test]
    fn advantage_keeps_higher_roll() {
        let mut rng = BattleRng::new(3);
        for _ in 0..200 {
            let roll = DiceEngine::new(&mut rng).roll_d20(0, true, false);
            assert_eq!(roll.naturals.len(), 2);
            assert_eq!(roll.result, *roll.naturals.iter().max().unwrap());
        }
    }

    #[test]
    fn disadvantage_keeps_lower_roll() {
        let mut rng = BattleRng::new(4);
        for _ in 0..200 {
            let roll = DiceEngine::new(&mut rng).roll_d20(0, false, true);
            assert_eq!(roll.result, *roll.naturals.iter().min().unwrap());
        }
    }

    #[test]
    fn advantage_and_disadvantage_cancel() {
        let mut rng = BattleRng::new(5);
        let roll = DiceEngine::new(&mut rng).roll_d20(0, true, true);
        assert_eq!(roll.naturals.len(), 1);
    }

    #[test]
    fn natural_twenty_always_hits_and_one_always_misses() {
        let mut rng = BattleRng::new(11);
        let mut saw_crit = false;
        let mut saw_fumble = false;
        for _ in 0..2000 {
            let roll = DiceEngine::new(&mut rng).make_attack_roll(0, 99, 0, 0, RollMode::Normal);
            if roll.natural == 20 {
                assert!(roll.is_hit && roll.is_critical);
                saw_crit = true;
            } else {
                assert!(!roll.is_hit);
            }
            let easy = DiceEngine::new(&mut rng).make_attack_roll(50, 0, 0, 0, RollMode::Normal);
            if easy.natural == 1 {
                assert!(!easy.is_hit && easy.is_fumble);
                saw_fumble = true;
            } else {
                assert!(easy.is_hit);
            }
        }
        assert!(saw_crit && saw_fumble);
    }

    #[test]
    fn critical_doubles_dice_pool_only() {
        let mut rng = BattleRng::new(8);
        let weapon = DiceNotation::new(2, 8, 1);
        let normal = DiceEngine::new(&mut rng).make_damage_roll(weapon, 3, false, 0);
        let crit = DiceEngine::new(&mut rng).make_damage_roll(weapon, 3, true, 0);
        assert_eq!(normal.rolls.len(), 2);
        assert_eq!(crit.rolls.len(), 4);
    }

    #[test]
    fn damage_total_is_at_least_one() {
        let mut rng = BattleRng::new(9);
        for _ in 0..200 {
            let roll =
                DiceEngine::new(&mut rng).make_damage_roll(DiceNotation::new(1, 4, 0), -50, false, 0);
            assert_eq!(roll.total, 1);
        }
    }

    #[test]
    fn saving_throw_extremes_override_dc() {
        let mut rng = BattleRng::new(12);
        for _ in 0..2000 {
            let save = DiceEngine::new(&mut rng).make_saving_throw(0, 15, 0);
            match save.natural {
                20 => assert!(save.success),
                1 => assert!(!save.success),
                n => assert_eq!(save.success, n as i32 >= 15),
            }
        }
    }

    #[test]
    fn malformed_notation_rolls_one_d6() {
        let mut rng = BattleRng::new(13);
        let total = DiceEngine::new(&mut rng).roll_dice_notation("fireball!", 0);
        assert_eq!(total.notation, DiceNotation::DEFAULT);
        assert_eq!(total.rolls.len(), 1);
        assert!((1..=6).contains(&total.sum));
    }

    #[test]
    fn luck_shifts_average_without_leaving_range() {
        let mut lucky_rng = BattleRng::new(21);
        let mut cursed_rng = BattleRng::new(21);
        let mut lucky_sum = 0;
        let mut cursed_sum = 0;
        for _ in 0..5000 {
            let lucky = DiceEngine::new(&mut lucky_rng).roll_d20(5, false, false).result;
            let cursed = DiceEngine::new(&mut cursed_rng).roll_d20(-5, false, false).result;
            assert!((1..=20).contains(&lucky));
            assert!((1..=20).contains(&cursed));
            lucky_sum += lucky;
            cursed_sum += cursed;
        }
        assert!(lucky_sum > cursed_sum);
    }
}
