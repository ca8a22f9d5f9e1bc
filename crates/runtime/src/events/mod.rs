//! Event and narration plumbing.
//!
//! The core emits a fixed vocabulary of [`BattleEvent`]s and free-form
//! narration. The manager forwards events to an [`EventSink`] and keeps the
//! most recent narration lines in a [`MessageBuffer`].
//!
//! [`BattleEvent`]: battle_core::BattleEvent
mod bus;
mod sink;

pub use bus::{EventBus, Topic};
pub use sink::{EventSink, MessageBuffer, RecordingSink};
