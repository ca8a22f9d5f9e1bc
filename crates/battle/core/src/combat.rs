//! Attack resolution and damage estimates.

use crate::dice::{AttackRoll, DiceEngine, RollMode};
use crate::state::{AbilityDef, BattleEntity};

/// Base armor class before defense is added.
pub const BASE_ARMOR_CLASS: i32 = 10;

/// Armor class of `target` after status multipliers.
pub fn armor_class(target: &BattleEntity) -> i32 {
    BASE_ARMOR_CLASS + target.effective_defense()
}

/// Scales raw damage by the ability multiplier and subtracts mitigation.
///
/// # Formula
///
/// ```text
/// scaled   = raw * damage_percent / 100
/// final    = max(scaled - defense / 2, 1)
/// ```
pub fn mitigate(raw: i32, damage_percent: u32, defense: i32) -> i32 {
    (raw * damage_percent as i32 / 100 - defense / 2).max(1)
}

/// Deterministic expected damage of `ability` from `attacker` on `target`.
///
/// Uses the average of the attacker's damage dice, so repeated calls never
/// touch the dice stream. Non-damaging abilities estimate to 0.
pub fn estimate_damage(attacker: &BattleEntity, target: &BattleEntity, ability: &AbilityDef) -> i32 {
    if !ability.deals_damage() {
        return 0;
    }
    let raw = attacker.stats.damage.average() + attacker.stats.attack;
    mitigate(raw, ability.damage_percent, target.effective_defense())
}

/// Most damage `ability` can deal to `target` in one resolution: every die
/// at its highest face on a critical hit.
pub fn damage_ceiling(attacker: &BattleEntity, target: &BattleEntity, ability: &AbilityDef) -> i32 {
    if !ability.deals_damage() {
        return 0;
    }
    let raw = attacker.stats.damage.maximum(true) + attacker.stats.attack;
    mitigate(raw, ability.damage_percent, target.effective_defense())
}

/// True if a resolution of `ability` can bring the target to 0 hp or below.
pub fn is_kill_shot(attacker: &BattleEntity, target: &BattleEntity, ability: &AbilityDef) -> bool {
    target.is_alive() && ability.deals_damage() && damage_ceiling(attacker, target, ability) >= target.hp()
}

/// Rolled outcome of one strike against one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrikeRoll {
    pub attack: AttackRoll,
    /// Zero on a miss.
    pub damage: i32,
}

/// Rolls to hit and, on a hit, rolls and mitigates damage.
pub fn roll_strike(
    dice: &mut DiceEngine<'_>,
    attacker: &BattleEntity,
    target: &BattleEntity,
    ability: &AbilityDef,
    proficiency: i32,
) -> StrikeRoll {
    let attack = dice.make_attack_roll(
        attacker.stats.attack,
        armor_class(target),
        attacker.stats.luck,
        proficiency,
        RollMode::Normal,
    );
    if !attack.is_hit {
        return StrikeRoll { attack, damage: 0 };
    }

    let roll = dice.make_damage_roll(
        attacker.stats.damage,
        attacker.stats.attack,
        attack.is_critical,
        attacker.stats.luck,
    );
    let damage = mitigate(roll.total, ability.damage_percent, target.effective_defense());
    StrikeRoll { attack, damage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::enemy;
    use crate::dice::BattleRng;
    use crate::state::{AbilityKind, Position};

    #[test]
    fn estimate_uses_average_and_mitigation() {
        let attacker = enemy(1, Position::new(1, 1));
        let target = enemy(2, Position::new(2, 1));
        // (1d6 avg 3 + attack 3) * 100% - defense 2 / 2 = 5
        assert_eq!(
            estimate_damage(&attacker, &target, &AbilityKind::BasicAttack.def()),
            5
        );
        assert_eq!(
            estimate_damage(&attacker, &target, &AbilityKind::ShieldWall.def()),
            0
        );
    }

    #[test]
    fn mitigation_never_drops_below_one() {
        assert_eq!(mitigate(1, 50, 40), 1);
    }

    #[test]
    fn kill_shot_compares_against_remaining_hp() {
        let attacker = enemy(1, Position::new(1, 1));
        let mut target = enemy(2, Position::new(2, 1));
        let basic = AbilityKind::BasicAttack.def();
        // crit ceiling: (2d6 max 12 + attack 3) - defense 2 / 2 = 14
        assert_eq!(damage_ceiling(&attacker, &target, &basic), 14);
        target.stats.hp = 15;
        assert!(!is_kill_shot(&attacker, &target, &basic));
        target.stats.hp = 14;
        assert!(is_kill_shot(&attacker, &target, &basic));
    }

    #[test]
    fn weak_attacker_can_still_finish_a_wounded_target() {
        let mut attacker = enemy(1, Position::new(1, 1));
        attacker.stats.attack = 0;
        attacker.stats.damage = crate::dice::DiceNotation::new(1, 2, 0);
        let mut target = enemy(2, Position::new(2, 1));
        target.stats.defense = 3;
        target.stats.hp = 3;
        let basic = AbilityKind::BasicAttack.def();
        assert_eq!(estimate_damage(&attacker, &target, &basic), 1);
        assert!(is_kill_shot(&attacker, &target, &basic));
    }

    #[test]
    fn strike_damage_is_positive_on_hit() {
        let attacker = enemy(1, Position::new(1, 1));
        let target = enemy(2, Position::new(2, 1));
        let mut rng = BattleRng::new(11);
        for _ in 0..200 {
            let roll = roll_strike(
                &mut DiceEngine::new(&mut rng),
                &attacker,
                &target,
                &AbilityKind::BasicAttack.def(),
                2,
            );
            if roll.attack.is_hit {
                assert!(roll.damage >= 1);
            } else {
                assert_eq!(roll.damage, 0);
            }
        }
    }
}
