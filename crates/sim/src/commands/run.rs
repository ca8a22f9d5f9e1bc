//! Bulk auto-played battles.
//!
//! Every battle owns its state, world and seed, so battles run side by side
//! on blocking tasks and the results only depend on the base seed.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::{ContentFactory, Roster};
use battle_core::{
    AbilityKind, ArenaTheme, BattleConfig, BattleOutcome, BattleRng, Behavior, BossArchetype,
    Classification, CombatantSnapshot, DiceNotation, EntityFlags, PlayerCommand, Position,
    TemplatePool, WorldCombatant, WorldId, compute_seed,
};
use battle_runtime::{
    BattleManager, BattleSummary, FileSnapshotRepository, InMemoryWorld, RuntimeConfig,
    suggest_command,
};
use clap::Parser;
use serde::Serialize;
use strum::IntoEnumIterator;
use tokio::task::JoinSet;

/// Auto-play battles and summarize the outcomes
#[derive(Parser)]
pub struct Run {
    /// Number of battles
    #[arg(short = 'n', long, default_value_t = 16)]
    battles: u32,

    /// Base seed (defaults to BATTLE_BASE_SEED)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Fight this boss archetype in every battle
    #[arg(long, value_parser = parse_variant::<BossArchetype>)]
    boss: Option<BossArchetype>,

    /// Arena theme (defaults to BATTLE_ARENA_THEME)
    #[arg(long, value_parser = parse_variant::<ArenaTheme>)]
    theme: Option<ArenaTheme>,

    /// Rounds after which a battle is abandoned
    #[arg(long, default_value_t = 200)]
    max_rounds: u32,

    /// Directory with roster.ron / arenas.ron / config.toml overrides
    #[arg(long, value_name = "DIR")]
    content_dir: Option<PathBuf>,

    /// Save abandoned battles here for `inspect`
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Print one JSON record per battle instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_variant<T>(value: &str) -> Result<T, String>
where
    T: FromStr + IntoEnumIterator + Display,
{
    value.parse().map_err(|_| {
        let known: Vec<String> = T::iter().map(|v| v.to_string()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

/// Inputs shared by every battle of a run.
struct Plan {
    base_seed: u64,
    boss: Option<BossArchetype>,
    max_rounds: u32,
    roster: Roster,
    pool: TemplatePool,
    runtime: RuntimeConfig,
    config: BattleConfig,
    repository: Option<FileSnapshotRepository>,
}

/// How a simulated battle finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
enum Verdict {
    Victory,
    Defeat,
    Flee,
    /// Abandoned after `max_rounds`; the world is left as a flight leaves it.
    Stalled,
}

impl Verdict {
    fn of(outcome: BattleOutcome) -> Self {
        match outcome {
            BattleOutcome::Victory => Self::Victory,
            BattleOutcome::Defeat => Self::Defeat,
            BattleOutcome::Flee => Self::Flee,
            BattleOutcome::Pending => Self::Stalled,
        }
    }
}

#[derive(Debug, Serialize)]
struct Record {
    index: u32,
    enemies: Vec<String>,
    outcome: Verdict,
    seed: u64,
    rounds: u32,
    player_hp: i32,
    defeated: Vec<WorldId>,
    survivors: Vec<WorldId>,
}

impl Record {
    fn new(index: u32, enemies: Vec<String>, outcome: Verdict, summary: BattleSummary) -> Self {
        Self {
            index,
            enemies,
            outcome,
            seed: summary.seed,
            rounds: summary.turns,
            player_hp: summary.player_hp,
            defeated: summary.defeated,
            survivors: summary.survivors,
        }
    }
}

impl Run {
    pub async fn execute(self) -> Result<()> {
        let mut runtime = RuntimeConfig::from_env()?;
        if let Some(theme) = self.theme {
            runtime.theme = theme;
        }
        let config = runtime.battle_config()?;

        let factory = match &self.content_dir {
            Some(dir) => ContentFactory::new(dir),
            None => ContentFactory::bundled(),
        };
        let roster = factory.load_roster()?;
        let pool = factory.load_arenas()?;
        pool.validate().context("Arena templates failed validation")?;

        let repository = self
            .save_dir
            .as_ref()
            .map(FileSnapshotRepository::new)
            .transpose()?;

        let plan = Arc::new(Plan {
            base_seed: self.seed.unwrap_or(runtime.base_seed),
            boss: self.boss,
            max_rounds: self.max_rounds,
            roster,
            pool,
            runtime,
            config,
            repository,
        });
        tracing::info!(
            battles = self.battles,
            base_seed = plan.base_seed,
            theme = %plan.runtime.theme,
            boss = ?plan.boss,
            "simulation started"
        );

        let mut tasks = JoinSet::new();
        for index in 0..self.battles {
            let plan = Arc::clone(&plan);
            tasks.spawn_blocking(move || simulate(&plan, index));
        }

        let mut records = Vec::with_capacity(self.battles as usize);
        while let Some(joined) = tasks.join_next().await {
            records.push(joined.context("Battle task panicked")??);
        }
        records.sort_by_key(|r| r.index);

        if self.json {
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        } else {
            print_table(&records);
        }
        Ok(())
    }
}

fn simulate(plan: &Plan, index: u32) -> Result<Record> {
    let seed = compute_seed(plan.base_seed, u64::from(index), 0, 0);
    let span = tracing::info_span!("battle", index, seed);
    let _entered = span.enter();

    let encounter = Encounter::roll(plan, seed)?;
    let mut manager = BattleManager::with_config(
        encounter.world,
        plan.pool.clone(),
        plan.runtime.clone(),
        plan.config.clone(),
    );
    manager.start_battle(&encounter.engaged, Position::ORIGIN, Some(seed), plan.boss.is_some())?;

    let mut outcome = BattleOutcome::Pending;
    for _ in 0..plan.max_rounds {
        let Some(state) = manager.battle() else {
            break;
        };
        let command = suggest_command(state);
        let report = match manager.process_command(command) {
            Ok(report) => report,
            Err(err) => {
                tracing::debug!(command = command.name(), "auto-play fell back to waiting: {err}");
                manager.process_command(PlayerCommand::Wait)?
            }
        };
        outcome = report.outcome;
        if outcome.is_terminal() {
            break;
        }
    }

    if !outcome.is_terminal() {
        tracing::warn!(rounds = plan.max_rounds, "battle abandoned");
        if let Some(repository) = &plan.repository {
            manager.suspend(repository, &format!("battle-{index}"))?;
        }
        let summary = manager.end_battle(BattleOutcome::Flee)?;
        return Ok(Record::new(index, encounter.names, Verdict::Stalled, summary));
    }

    let summary = manager.end_battle(outcome)?;
    let verdict = Verdict::of(summary.outcome);
    Ok(Record::new(index, encounter.names, verdict, summary))
}

/// World roster for one battle.
struct Encounter {
    world: InMemoryWorld,
    engaged: Vec<WorldId>,
    names: Vec<String>,
}

impl Encounter {
    /// Up to three regulars engaged next to the player plus up to two
    /// bystanders within reinforcement range; a boss fights alone.
    fn roll(plan: &Plan, seed: u64) -> Result<Self> {
        let mut rng = BattleRng::new(compute_seed(seed, 0, 0, 1));
        let mut world = InMemoryWorld::new(WorldCombatant {
            world_id: WorldId(0),
            position: Position::ORIGIN,
            snapshot: hero(),
        });
        let mut engaged = Vec::new();
        let mut names = Vec::new();
        let mut next_id = 1;

        if let Some(archetype) = plan.boss {
            let template = plan
                .roster
                .boss(archetype)
                .with_context(|| format!("Roster has no {archetype} boss"))?;
            world.spawn(WorldId(next_id), Position::new(2, 0), template)?;
            engaged.push(WorldId(next_id));
            names.push(template.name.clone());
            return Ok(Self {
                world,
                engaged,
                names,
            });
        }

        let regulars: Vec<_> = plan.roster.regulars().collect();
        anyhow::ensure!(!regulars.is_empty(), "Roster has no regular enemies");

        let engaged_count = 1 + rng.below(3);
        for slot in 0..engaged_count {
            let template = regulars[rng.below(regulars.len())];
            let at = Position::new(1 + slot as i32, (slot % 2) as i32);
            world.spawn(WorldId(next_id), at, template)?;
            engaged.push(WorldId(next_id));
            names.push(template.name.clone());
            next_id += 1;
        }

        for _ in 0..rng.below(3) {
            let template = regulars[rng.below(regulars.len())];
            let distance = 4 + rng.below(9) as i32;
            let across = rng.below(distance as usize + 1) as i32;
            let at = Position::new(distance - across, across);
            world.spawn(WorldId(next_id), at, template)?;
            next_id += 1;
        }

        Ok(Self {
            world,
            engaged,
            names,
        })
    }
}

fn hero() -> CombatantSnapshot {
    CombatantSnapshot {
        name: "Hero".to_owned(),
        hp: 40,
        max_hp: 40,
        attack: 5,
        defense: 3,
        speed: 4,
        luck: 1,
        initiative_bonus: 2,
        damage: DiceNotation::new(1, 8, 0),
        abilities: [
            AbilityKind::BasicAttack,
            AbilityKind::PowerStrike,
            AbilityKind::Firebolt,
            AbilityKind::ShieldWall,
        ]
        .into_iter()
        .collect(),
        flags: EntityFlags::empty(),
        classification: Classification::new(Behavior::Aggressive),
    }
}

/// Battles per verdict plus the mean round count.
#[derive(Debug, Default, PartialEq)]
struct Totals {
    victories: usize,
    defeats: usize,
    fled: usize,
    stalled: usize,
    avg_rounds: f64,
}

impl Totals {
    fn of(records: &[Record]) -> Self {
        let mut totals = Self::default();
        for record in records {
            match record.outcome {
                Verdict::Victory => totals.victories += 1,
                Verdict::Defeat => totals.defeats += 1,
                Verdict::Flee => totals.fled += 1,
                Verdict::Stalled => totals.stalled += 1,
            }
        }
        let rounds: u64 = records.iter().map(|r| u64::from(r.rounds)).sum();
        totals.avg_rounds = rounds as f64 / records.len().max(1) as f64;
        totals
    }
}

fn print_table(records: &[Record]) {
    println!(
        "{:>5} {:>20} {:>8} {:>6} {:>4}  enemies",
        "#", "seed", "outcome", "rounds", "hp"
    );
    for record in records {
        println!(
            "{:>5} {:>20} {:>8} {:>6} {:>4}  {}",
            record.index,
            record.seed,
            record.outcome.to_string(),
            record.rounds,
            record.player_hp,
            record.enemies.join(", ")
        );
    }

    let totals = Totals::of(records);
    println!();
    println!(
        "victories {}  defeats {}  fled {}  stalled {}  avg rounds {:.1}",
        totals.victories, totals.defeats, totals.fled, totals.stalled, totals.avg_rounds
    );
}
