use crate::state::{AbilityKind, BattleOutcome, EntityId, HazardKind, Position, StatusKind, WorldId};

/// What caused a [`BattleEvent::DamageApplied`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageSource {
    Ability {
        attacker: EntityId,
        ability: AbilityKind,
    },
    Status(StatusKind),
    Hazard(HazardKind),
}

/// Notifications emitted for external collaborators.
///
/// The vocabulary is fixed; the engine emits these but never consumes them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    BattleStarted {
        seed: u64,
        is_boss: bool,
        enemies: Vec<EntityId>,
    },
    BattleEnded {
        outcome: BattleOutcome,
        turn: u32,
    },
    EnemyTurnStarted {
        entity: EntityId,
    },
    EnemyTurnEnded {
        entity: EntityId,
    },
    EnemyMoved {
        entity: EntityId,
        from: Position,
        to: Position,
    },
    EnemyAttacked {
        entity: EntityId,
        target: EntityId,
        ability: AbilityKind,
        hit: bool,
        critical: bool,
    },
    DamageApplied {
        target: EntityId,
        amount: i32,
        remaining_hp: i32,
        source: DamageSource,
    },
    EntityDefeated {
        entity: EntityId,
        world_id: Option<WorldId>,
    },
}

/// Events and narration produced by one engine call, in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outbox {
    pub events: Vec<BattleEvent>,
    pub messages: Vec<String>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn narrate(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn append(&mut self, other: &mut Outbox) {
        self.events.append(&mut other.events);
        self.messages.append(&mut other.messages);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.messages.is_empty()
    }
}
