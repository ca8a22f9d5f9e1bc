//! Decode a saved snapshot and print it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_core::{BattleState, decode_snapshot, snapshot};
use clap::Parser;

/// Print a saved battle snapshot
#[derive(Parser)]
pub struct Inspect {
    /// Snapshot file written by a snapshot repository (`*.btl`)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print a short summary instead of the full JSON
    #[arg(short, long)]
    summary: bool,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let bytes = std::fs::read(&self.file)
            .with_context(|| format!("Failed to read snapshot: {}", self.file.display()))?;
        let state = decode_snapshot(&bytes)
            .with_context(|| format!("Corrupt snapshot: {}", self.file.display()))?;

        if self.summary {
            print_summary(&state);
        } else {
            println!("{}", snapshot::to_json(&state)?);
        }
        Ok(())
    }
}

fn print_summary(state: &BattleState) {
    println!("arena      {} ({})", state.arena.template, state.arena.theme);
    println!("seed       {}", state.seed);
    println!("round      {} / {}", state.turn, state.phase);
    println!("outcome    {}", state.outcome);
    println!(
        "player     {} hp {}/{} at {}",
        state.player.stats.name,
        state.player.hp(),
        state.player.max_hp(),
        state.player.position
    );
    for enemy in &state.enemies {
        println!(
            "enemy {:>4} {} hp {}/{} at {}",
            enemy.id.to_string(),
            enemy.stats.name,
            enemy.hp(),
            enemy.max_hp(),
            enemy.position
        );
    }
    for pending in &state.reinforcements {
        println!(
            "incoming   {} in {} round(s)",
            pending.world_id, pending.turns_until_arrival
        );
    }
}
