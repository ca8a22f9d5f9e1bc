//! End-of-round bookkeeping: status ticks and cooldowns.

use std::collections::BTreeMap;

use crate::action::{DamageSource, Outbox, apply_damage};
use crate::state::{BattleState, EntityId};

/// Ticks status effects and cooldowns of every living combatant.
///
/// Damage-per-tick lands first, then durations drop by one and expired
/// effects are removed. Every nonzero cooldown drops by one and entries that
/// reach zero are removed.
pub fn process_end_of_round(state: &mut BattleState, out: &mut Outbox) {
    let living: Vec<EntityId> = state.living_entities().map(|e| e.id).collect();

    for id in living {
        let Some(entity) = state.entity(id) else {
            continue;
        };
        let tick = entity.statuses.tick();
        let name = entity.stats.name.clone();

        for &(kind, damage) in &tick.damage {
            out.narrate(format!("{name} suffers {damage} from being {kind}."));
            if apply_damage(state, id, damage, DamageSource::Status(kind), out) {
                break;
            }
        }
        for kind in &tick.expired {
            out.narrate(format!("{name} is no longer {kind}."));
        }

        if let Some(entity) = state.entity_mut(id) {
            entity.statuses = tick.next;
            entity.cooldowns = next_cooldowns(&entity.cooldowns);
        }
    }
}

fn next_cooldowns<K: Ord + Copy>(cooldowns: &BTreeMap<K, u32>) -> BTreeMap<K, u32> {
    cooldowns
        .iter()
        .filter(|&(_, &remaining)| remaining > 1)
        .map(|(&ability, &remaining)| (ability, remaining - 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateBuilder;
    use crate::state::{AbilityKind, Position, StatusKind};

    #[test]
    fn poison_ticks_then_expires() {
        let mut state = StateBuilder::open(9, 7)
            .enemy_at(1, Position::new(5, 5))
            .build();
        state.player.statuses.apply(StatusKind::Poisoned, 2);
        let mut out = Outbox::new();

        process_end_of_round(&mut state, &mut out);
        assert_eq!(state.player.hp(), 28);
        assert!(state.player.statuses.has(StatusKind::Poisoned));

        process_end_of_round(&mut state, &mut out);
        assert_eq!(state.player.hp(), 26);
        assert!(!state.player.statuses.has(StatusKind::Poisoned));

        process_end_of_round(&mut state, &mut out);
        assert_eq!(state.player.hp(), 26);
    }

    #[test]
    fn cooldowns_decrement_and_clear() {
        let mut state = StateBuilder::open(9, 7)
            .enemy_at(1, Position::new(5, 5))
            .build();
        state.player.cooldowns.insert(AbilityKind::PowerStrike, 2);
        state.player.cooldowns.insert(AbilityKind::ShieldWall, 1);
        let mut out = Outbox::new();

        process_end_of_round(&mut state, &mut out);
        assert_eq!(state.player.cooldown(AbilityKind::PowerStrike), 1);
        assert!(!state.player.cooldowns.contains_key(&AbilityKind::ShieldWall));

        process_end_of_round(&mut state, &mut out);
        assert!(state.player.cooldowns.is_empty());
    }

    #[test]
    fn burning_can_defeat() {
        let mut state = StateBuilder::open(9, 7)
            .enemy_at(1, Position::new(5, 5))
            .build();
        state.enemies[0].stats.hp = 2;
        state.enemies[0].statuses.apply(StatusKind::Burning, 3);
        let mut out = Outbox::new();

        process_end_of_round(&mut state, &mut out);
        assert!(!state.enemies[0].is_alive());
        assert!(!state.turn_order.contains(&EntityId(1)));
        state.validate().unwrap();
    }
}
