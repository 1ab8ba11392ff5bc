//! Headless autoplay: a heuristic player against the level table.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use furysweep_core::{ActiveEchoes, LEVEL_COUNT, LevelOutcome, floor_for_level, level_config};
use furysweep_session::{CycleOutcome, EnemyDecisionPolicy, HeuristicPolicy, PhaseStateMachine};

use crate::config::SimConfig;

mod config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of the configured one
    #[arg(short, long)]
    seed: Option<u64>,

    /// TOML file with `[session]` and `[run]` tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of levels to attempt
    #[arg(short, long)]
    levels: Option<u32>,

    /// Extra echo to install, may be repeated
    #[arg(short, long = "echo")]
    echoes: Vec<String>,

    /// Skip the pauses between phases
    #[arg(long)]
    instant: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.session.seed = seed;
        }
        if let Some(levels) = self.levels {
            config.run.levels = levels;
        }
        config.run.echoes.extend(self.echoes);
        if self.instant {
            config.session = config.session.instant();
        }
        Ok(config)
    }
}

struct LevelSummary {
    level: u32,
    outcome: LevelOutcome,
    cycles: u32,
}

async fn play_level(
    machine: &mut PhaseStateMachine,
    autopilot: &HeuristicPolicy,
    level: u32,
    max_cycles: u32,
) -> anyhow::Result<LevelSummary> {
    machine.begin_level(&level_config(level)?)?;

    for cycle in 1..=max_cycles {
        let view = machine.view();
        let opponent = machine.encounter().opponent.clone();
        let player = machine.encounter().player.public();
        let Some(target) = autopilot.decide(&view, &opponent, &player).await else {
            bail!("Autopilot ran out of cells on level {level}");
        };

        let outcome = machine
            .play(target)
            .await
            .with_context(|| format!("Cycle {cycle} of level {level} failed"))?;
        for event in machine.drain_events() {
            log::info!("[{:?}] {}", event.kind, event.text);
        }

        match outcome {
            CycleOutcome::Ignored => log::warn!("Reveal at {:?} changed nothing", target),
            CycleOutcome::Completed => {}
            CycleOutcome::LevelEnded(outcome) => {
                return Ok(LevelSummary {
                    level,
                    outcome,
                    cycles: cycle,
                });
            }
            CycleOutcome::Interrupted => {
                bail!("Level {level} was interrupted in {:?}", machine.phase())
            }
        }
    }

    bail!(
        "Level {level} did not finish within {max_cycles} cycles, stuck in {:?}",
        machine.phase()
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = args.into_config()?;
    log::debug!("config: {:?}", config);

    let echoes = ActiveEchoes::from_keys(config.run.echoes.iter().map(String::as_str))
        .context("Could not install echoes")?;
    let seed = config.session.seed;
    let mut machine = PhaseStateMachine::new(
        config.session.clone(),
        Arc::new(HeuristicPolicy::new(seed)),
        echoes,
    );
    let autopilot = HeuristicPolicy::new(seed.wrapping_add(1));

    let first = config.run.start_level.max(1);
    let last = first
        .saturating_add(config.run.levels)
        .saturating_sub(1)
        .min(LEVEL_COUNT);
    for level in first..=last {
        let summary = play_level(&mut machine, &autopilot, level, config.run.max_cycles).await?;
        let player = &machine.encounter().player.vitals;
        println!(
            "level {} (floor {}): {:?} after {} cycles, hp {}/{}",
            summary.level,
            floor_for_level(summary.level).unwrap_or(0),
            summary.outcome,
            summary.cycles,
            player.hp,
            player.max_hp,
        );
        if summary.outcome == LevelOutcome::Defeat {
            break;
        }
    }

    let snapshot = serde_json::to_string_pretty(&machine.snapshot())
        .context("Could not serialize snapshot")?;
    println!("{snapshot}");
    Ok(())
}
