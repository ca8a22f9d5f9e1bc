//! Battle lifecycle on top of the core state machine.
//!
//! ```text
//! start_battle ──> process_command* ──> end_battle
//!      │                 │                  │
//!      │   (player turn, enemy phase,       │
//!      │    end of round per command)       │
//!      └── suspend / resume at any player turn
//! ```
//!
//! The manager owns at most one battle. It reads combatants from the world
//! registry, runs rounds with [`TacticalAi`] as the enemy decider, forwards
//! core events to the configured [`EventSink`], and writes results back to
//! the registry when the battle ends.

use std::sync::Arc;

use battle_core::{
    BattleAction, BattleConfig, BattleError, BattleEvent, BattleOutcome, BattlePhase, BattleState,
    CommandError, EncounterSetup, EntityId, Outbox, PlayerCommand, Position, RoundReport,
    TemplatePool, WorldId, compute_seed, run_round,
};
use serde::{Deserialize, Serialize};

use crate::ai::{TacticalAi, decide_action};
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, EventSink, MessageBuffer};
use crate::repository::{RepositoryError, SnapshotRepository};
use crate::world::WorldRegistry;

/// What a finished battle changed in the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub outcome: BattleOutcome,
    pub seed: u64,
    /// Round the battle ended in.
    pub turns: u32,
    pub player_hp: i32,
    /// Removed from the world registry.
    pub defeated: Vec<WorldId>,
    /// Still in the world where they stood.
    pub survivors: Vec<WorldId>,
}

pub struct BattleManager<W: WorldRegistry> {
    world: W,
    pool: TemplatePool,
    config: BattleConfig,
    runtime: RuntimeConfig,
    sink: Arc<dyn EventSink>,
    messages: MessageBuffer,
    battle: Option<BattleState>,
    ai: TacticalAi,
    battles_started: u64,
}

impl<W: WorldRegistry> BattleManager<W> {
    /// Loads engine tuning as described by `runtime`.
    pub fn new(world: W, pool: TemplatePool, runtime: RuntimeConfig) -> Result<Self> {
        let config = runtime.battle_config()?;
        Ok(Self::with_config(world, pool, runtime, config))
    }

    pub fn with_config(
        world: W,
        pool: TemplatePool,
        runtime: RuntimeConfig,
        config: BattleConfig,
    ) -> Self {
        Self {
            messages: MessageBuffer::new(config.message_capacity),
            world,
            pool,
            config,
            runtime,
            sink: Arc::new(EventBus::new()),
            battle: None,
            ai: TacticalAi,
            battles_started: 0,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn battle(&self) -> Option<&BattleState> {
        self.battle.as_ref()
    }

    pub fn messages(&self) -> &MessageBuffer {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageBuffer {
        &mut self.messages
    }

    /// True while a battle exists and has not reached a terminal outcome.
    pub fn is_active(&self) -> bool {
        self.battle
            .as_ref()
            .is_some_and(|b| !b.outcome.is_terminal())
    }

    /// Opens an encounter against `enemy_ids` around `origin`.
    ///
    /// Without an explicit seed one is derived from the configured base
    /// seed, the number of battles started so far and the origin.
    pub fn start_battle(
        &mut self,
        enemy_ids: &[WorldId],
        origin: Position,
        seed: Option<u64>,
        is_boss: bool,
    ) -> Result<&BattleState> {
        if self.battle.is_some() {
            return Err(RuntimeError::BattleInProgress);
        }

        let enemies = enemy_ids
            .iter()
            .map(|&id| {
                self.world
                    .get(id)
                    .cloned()
                    .ok_or(RuntimeError::UnknownWorldEntity(id))
            })
            .collect::<Result<Vec<_>>>()?;
        let nearby = self.world.within(origin, self.config.detection_radius);
        let seed = seed.unwrap_or_else(|| {
            compute_seed(
                self.runtime.base_seed,
                self.battles_started,
                origin.x as u64,
                origin.y as u64,
            )
        });

        let setup = EncounterSetup {
            player: self.world.player().clone(),
            enemies,
            nearby,
            origin,
            theme: self.runtime.theme,
            is_boss,
            seed,
            config: self.config.clone(),
        };
        let mut out = Outbox::new();
        let state = battle_core::start_battle(setup, &self.pool, &mut out)?;
        self.battles_started += 1;

        tracing::info!(
            seed,
            is_boss,
            arena = %state.arena.template,
            enemies = state.enemies.len(),
            reinforcements = state.reinforcements.len(),
            "battle started"
        );
        self.drain(out);
        Ok(self.battle.insert(state))
    }

    /// Runs one full round: the player's command, every enemy's turn and the
    /// end-of-round ticks.
    ///
    /// Rejected commands leave the battle untouched.
    pub fn process_command(&mut self, command: PlayerCommand) -> Result<RoundReport> {
        let Some(state) = self.battle.as_mut() else {
            tracing::warn!(command = command.name(), "command rejected: no active battle");
            return Err(CommandError::NoActiveBattle.into());
        };
        if state.phase != BattlePhase::PlayerTurn || state.outcome.is_terminal() {
            tracing::warn!(
                command = command.name(),
                phase = %state.phase,
                "command rejected: not the player's turn"
            );
            return Err(CommandError::NotPlayerTurn.into());
        }

        let mut out = Outbox::new();
        let report = match run_round(state, &command, &mut self.ai, &mut out) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(
                    command = command.name(),
                    code = err.error_code(),
                    "command rejected: {err}"
                );
                return Err(err.into());
            }
        };

        for (world_id, entity, position) in &report.reinforcements.arrived {
            tracing::info!(%world_id, %entity, %position, turn = state.turn, "reinforcement arrived");
        }
        for world_id in &report.reinforcements.delayed {
            tracing::warn!(%world_id, turn = state.turn, "reinforcement delayed: no free entry tile");
        }
        if report.outcome.is_terminal() {
            tracing::info!(outcome = %report.outcome, turn = state.turn, "battle resolved");
        }

        self.drain(out);
        Ok(report)
    }

    /// What the AI would do for `actor` in the current state.
    pub fn preview_decision(&self, actor: EntityId) -> Option<BattleAction> {
        self.battle.as_ref().map(|state| decide_action(state, actor))
    }

    /// Closes the battle and syncs its results into the world.
    ///
    /// A battle that already reached a terminal outcome keeps it; `outcome`
    /// only applies to battles abandoned while still pending. Defeated
    /// combatants are removed from the registry, survivors stay where they
    /// were, summons are never synced.
    pub fn end_battle(&mut self, outcome: BattleOutcome) -> Result<BattleSummary> {
        if !outcome.is_terminal() {
            return Err(RuntimeError::OutcomePending);
        }
        let Some(mut state) = self.battle.take() else {
            return Err(CommandError::NoActiveBattle.into());
        };
        if state.outcome.is_terminal() && state.outcome != outcome {
            tracing::warn!(
                requested = %outcome,
                resolved = %state.outcome,
                "end_battle outcome differs from the resolved one; keeping the resolved outcome"
            );
        }
        if !state.outcome.is_terminal() {
            state.outcome = outcome;
        }

        self.world.set_player_hp(state.player.hp());
        let mut defeated = Vec::new();
        let mut survivors = Vec::new();
        for enemy in state.enemies.iter().filter(|e| !e.is_summoned()) {
            let Some(world_id) = enemy.world_id else {
                continue;
            };
            if enemy.is_alive() {
                survivors.push(world_id);
            } else {
                self.world.remove(world_id);
                defeated.push(world_id);
            }
        }

        let summary = BattleSummary {
            outcome: state.outcome,
            seed: state.seed,
            turns: state.turn,
            player_hp: state.player.hp(),
            defeated,
            survivors,
        };

        let mut out = Outbox::new();
        out.emit(BattleEvent::BattleEnded {
            outcome: summary.outcome,
            turn: summary.turns,
        });
        out.narrate(format!("The battle ends: {}.", summary.outcome));
        self.drain(out);

        tracing::info!(
            outcome = %summary.outcome,
            turns = summary.turns,
            player_hp = summary.player_hp,
            defeated = summary.defeated.len(),
            survivors = summary.survivors.len(),
            "battle ended"
        );
        Ok(summary)
    }

    /// Saves the current battle under `slot`.
    pub fn suspend(&self, repository: &dyn SnapshotRepository, slot: &str) -> Result<()> {
        let state = self.battle.as_ref().ok_or(CommandError::NoActiveBattle)?;
        repository.save_state(slot, state)?;
        tracing::info!(slot, turn = state.turn, "battle suspended");
        Ok(())
    }

    /// Restores the battle saved under `slot`.
    ///
    /// Corrupt snapshots fail with [`RuntimeError::Snapshot`]; the caller
    /// should discard the slot and start fresh.
    pub fn resume(&mut self, repository: &dyn SnapshotRepository, slot: &str) -> Result<&BattleState> {
        if self.battle.is_some() {
            return Err(RuntimeError::BattleInProgress);
        }
        let state = match repository.load_state(slot) {
            Ok(Some(state)) => state,
            Ok(None) => return Err(RuntimeError::NoSnapshot(slot.to_owned())),
            Err(RepositoryError::Corrupted(err)) => {
                tracing::warn!(slot, code = err.error_code(), "discarding corrupt snapshot: {err}");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        tracing::info!(slot, turn = state.turn, phase = %state.phase, "battle resumed");
        Ok(self.battle.insert(state))
    }

    fn drain(&mut self, out: Outbox) {
        for event in &out.events {
            self.sink.publish(event);
        }
        for line in &out.messages {
            tracing::trace!(target: "battle::narration", "{line}");
        }
        self.messages.extend(out.messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::world::InMemoryWorld;
    use battle_core::builder::grunt;
    use battle_core::WorldCombatant;

    fn world() -> InMemoryWorld {
        let mut world = InMemoryWorld::new(WorldCombatant {
            world_id: WorldId(0),
            position: Position::new(10, 10),
            snapshot: grunt("hero", 40),
        });
        world.insert(WorldCombatant {
            world_id: WorldId(1),
            position: Position::new(11, 10),
            snapshot: grunt("goblin", 6),
        });
        world
    }

    fn manager() -> BattleManager<InMemoryWorld> {
        BattleManager::with_config(
            world(),
            TemplatePool::builtin(),
            RuntimeConfig::default(),
            BattleConfig::default(),
        )
    }

    #[test]
    fn commands_without_a_battle_are_rejected() {
        let mut manager = manager();
        let err = manager.process_command(PlayerCommand::Wait).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Command(CommandError::NoActiveBattle)
        ));
    }

    #[test]
    fn unknown_enemies_cannot_start_a_battle() {
        let mut manager = manager();
        let err = manager
            .start_battle(&[WorldId(77)], Position::new(10, 10), Some(1), false)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownWorldEntity(WorldId(77))));
        assert!(manager.battle().is_none());
    }

    #[test]
    fn second_battle_waits_for_the_first() {
        let mut manager = manager();
        manager
            .start_battle(&[WorldId(1)], Position::new(10, 10), Some(1), false)
            .unwrap();
        assert!(matches!(
            manager.start_battle(&[WorldId(1)], Position::new(10, 10), Some(2), false),
            Err(RuntimeError::BattleInProgress)
        ));
    }

    #[test]
    fn abandoning_keeps_survivors_in_the_world() {
        let sink = Arc::new(RecordingSink::new());
        let mut manager = manager().with_sink(sink.clone());
        manager
            .start_battle(&[WorldId(1)], Position::new(10, 10), Some(3), false)
            .unwrap();

        assert!(matches!(
            manager.end_battle(BattleOutcome::Pending),
            Err(RuntimeError::OutcomePending)
        ));
        let summary = manager.end_battle(BattleOutcome::Flee).unwrap();
        assert_eq!(summary.outcome, BattleOutcome::Flee);
        assert_eq!(summary.survivors, vec![WorldId(1)]);
        assert!(manager.world().get(WorldId(1)).is_some());
        assert!(!manager.is_active());

        let events = sink.events();
        assert!(matches!(events.first(), Some(BattleEvent::BattleStarted { .. })));
        assert!(matches!(
            events.last(),
            Some(BattleEvent::BattleEnded {
                outcome: BattleOutcome::Flee,
                ..
            })
        ));
    }
}
