//! World registry the manager reads combatants from and syncs results into.

use std::collections::BTreeMap;

use battle_content::{EnemyTemplate, RosterError};
use battle_core::{Position, WorldCombatant, WorldId};

/// Persistent overworld roster as seen by battles.
pub trait WorldRegistry: Send + Sync {
    fn player(&self) -> &WorldCombatant;

    fn get(&self, id: WorldId) -> Option<&WorldCombatant>;

    /// Living combatants within Manhattan `radius` of `origin`, in id order.
    fn within(&self, origin: Position, radius: u32) -> Vec<WorldCombatant>;

    fn set_player_hp(&mut self, hp: i32);

    /// Removes a combatant defeated in battle.
    fn remove(&mut self, id: WorldId) -> Option<WorldCombatant>;
}

/// Registry backed by a sorted map.
#[derive(Clone, Debug)]
pub struct InMemoryWorld {
    player: WorldCombatant,
    combatants: BTreeMap<WorldId, WorldCombatant>,
}

impl InMemoryWorld {
    pub fn new(player: WorldCombatant) -> Self {
        Self {
            player,
            combatants: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, combatant: WorldCombatant) {
        self.combatants.insert(combatant.world_id, combatant);
    }

    /// Adds a fresh combatant built from a roster template.
    pub fn spawn(
        &mut self,
        id: WorldId,
        position: Position,
        template: &EnemyTemplate,
    ) -> Result<(), RosterError> {
        self.insert(WorldCombatant {
            world_id: id,
            position,
            snapshot: template.to_snapshot()?,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = WorldId> + '_ {
        self.combatants.keys().copied()
    }
}

impl WorldRegistry for InMemoryWorld {
    fn player(&self) -> &WorldCombatant {
        &self.player
    }

    fn get(&self, id: WorldId) -> Option<&WorldCombatant> {
        self.combatants.get(&id)
    }

    fn within(&self, origin: Position, radius: u32) -> Vec<WorldCombatant> {
        self.combatants
            .values()
            .filter(|c| c.snapshot.hp > 0 && c.position.manhattan(origin) <= radius)
            .cloned()
            .collect()
    }

    fn set_player_hp(&mut self, hp: i32) {
        self.player.snapshot.hp = hp.clamp(0, self.player.snapshot.max_hp);
    }

    fn remove(&mut self, id: WorldId) -> Option<WorldCombatant> {
        self.combatants.remove(&id)
    }
}
