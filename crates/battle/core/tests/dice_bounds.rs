//! Dice invariants under arbitrary seeds and luck.

use battle_core::{BattleRng, DiceEngine, DiceNotation};
use proptest::prelude::*;

proptest! {
    #[test]
    fn d20_stays_in_range(seed in any::<u64>(), luck in -10i32..=10, adv in any::<bool>(), dis in any::<bool>()) {
        let mut rng = BattleRng::new(seed);
        let mut dice = DiceEngine::new(&mut rng);
        for _ in 0..16 {
            let roll = dice.roll_d20(luck, adv, dis);
            prop_assert!((1..=20).contains(&roll.result));
            prop_assert!(roll.naturals.iter().all(|n| (1..=20).contains(n)));
        }
    }

    #[test]
    fn damage_is_at_least_one(
        seed in any::<u64>(),
        count in 1u32..=8,
        sides in prop::sample::select(DiceNotation::SUPPORTED_SIDES.to_vec()),
        modifier in -40i32..=5,
        critical in any::<bool>(),
        luck in -5i32..=5,
    ) {
        let mut rng = BattleRng::new(seed);
        let roll = DiceEngine::new(&mut rng)
            .make_damage_roll(DiceNotation::new(count, sides, 0), modifier, critical, luck);
        prop_assert!(roll.total >= 1);
        prop_assert!(roll.rolls.iter().all(|&r| r >= 1 && r <= sides));
    }

    #[test]
    fn critical_doubles_the_dice_pool(seed in any::<u64>(), count in 1u32..=32, luck in -5i32..=5) {
        let weapon = DiceNotation::new(count, 6, 2);
        let mut rng = BattleRng::new(seed);
        let mut dice = DiceEngine::new(&mut rng);
        let normal = dice.make_damage_roll(weapon, 0, false, luck);
        let critical = dice.make_damage_roll(weapon, 0, true, luck);
        prop_assert_eq!(normal.rolls.len(), count as usize);
        prop_assert_eq!(critical.rolls.len(), 2 * normal.rolls.len());
    }

    #[test]
    fn natural_extremes_decide_attacks(seed in any::<u64>(), modifier in -30i32..=30, ac in 0i32..=40) {
        let mut rng = BattleRng::new(seed);
        let roll = DiceEngine::new(&mut rng).make_attack_roll(modifier, ac, 0, 2, battle_core::RollMode::Normal);
        if roll.natural == 20 {
            prop_assert!(roll.is_hit && roll.is_critical);
        }
        if roll.natural == 1 {
            prop_assert!(!roll.is_hit && roll.is_fumble);
        }
    }

    #[test]
    fn malformed_notation_rolls_default(text in "[a-z+ -]{0,8}") {
        let mut rng = BattleRng::new(1);
        let total = DiceEngine::new(&mut rng).roll_dice_notation(&text, 0);
        if text.parse::<DiceNotation>().is_err() {
            prop_assert_eq!(total.notation, DiceNotation::DEFAULT);
            prop_assert!((1..=6).contains(&total.sum));
        }
    }
}

#[test]
fn same_seed_same_rolls() {
    let mut a = BattleRng::new(2024);
    let mut b = BattleRng::new(2024);
    let left: Vec<_> = (0..64).map(|_| DiceEngine::new(&mut a).roll_d20(2, false, false).result).collect();
    let right: Vec<_> = (0..64).map(|_| DiceEngine::new(&mut b).roll_d20(2, false, false).result).collect();
    assert_eq!(left, right);
}
