//! Topic-based event bus.

use std::collections::HashMap;

use battle_core::BattleEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::EventSink;

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Battle started and ended.
    Lifecycle,
    /// Enemy turn boundaries.
    Turn,
    /// Movement, attacks, damage and defeats.
    Combat,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Lifecycle, Topic::Turn, Topic::Combat];

    pub fn of(event: &BattleEvent) -> Self {
        match event {
            BattleEvent::BattleStarted { .. } | BattleEvent::BattleEnded { .. } => Topic::Lifecycle,
            BattleEvent::EnemyTurnStarted { .. } | BattleEvent::EnemyTurnEnded { .. } => {
                Topic::Turn
            }
            BattleEvent::EnemyMoved { .. }
            | BattleEvent::EnemyAttacked { .. }
            | BattleEvent::DamageApplied { .. }
            | BattleEvent::EntityDefeated { .. } => Topic::Combat,
        }
    }
}

/// Broadcasts battle events to any number of subscribers per topic.
///
/// Publishing never blocks; events sent while a topic has no subscribers
/// are dropped.
pub struct EventBus {
    channels: HashMap<Topic, broadcast::Sender<BattleEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();
        Self { channels }
    }

    pub fn publish(&self, event: BattleEvent) {
        let topic = Topic::of(&event);
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            tracing::trace!("no subscribers for topic {:?}", topic);
        }
    }

    pub fn subscribe(&self, topic: Topic) -> Option<broadcast::Receiver<BattleEvent>> {
        self.channels.get(&topic).map(broadcast::Sender::subscribe)
    }

    pub fn subscribe_all(&self) -> HashMap<Topic, broadcast::Receiver<BattleEvent>> {
        self.channels
            .iter()
            .map(|(&topic, tx)| (topic, tx.subscribe()))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: &BattleEvent) {
        EventBus::publish(self, event.clone());
    }
}
