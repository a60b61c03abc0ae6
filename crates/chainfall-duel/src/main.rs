//! chainfall-duel: two engines, one seeded input stream each, chain reports
//! as JSON lines on stdout.
//!
//! Each finished cascade damages the opponent by `chains * tokens vanished`;
//! a cascade of two or more chains also freezes one opponent column. The duel
//! ends when a player's health reaches zero or the tick budget runs out.

mod player;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chainfall_core::Rules;
use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::{info, Level};

use player::{ChainEvent, Player, Totals};

/// Headless two-player duel for the Chainfall engine.
#[derive(Debug, Parser)]
#[command(name = "chainfall-duel", version, about)]
struct Args {
    /// Master seed; player boards and inputs derive from it.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Maximum number of ticks to play.
    #[arg(short, long, default_value_t = 5_000, value_name = "N")]
    ticks: u64,

    /// Starting health of each player.
    #[arg(long, default_value_t = 2_000, value_name = "HP")]
    health: u32,

    /// Rules file (JSON). Missing fields take their defaults.
    #[arg(short, long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Log verbosity on stderr (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tick: u64,
    player: usize,
    #[serde(flatten)]
    event: &'a ChainEvent,
}

#[derive(Debug, Serialize)]
struct Summary {
    event: &'static str,
    ticks: u64,
    winner: Option<usize>,
    health: [u32; 2],
    totals: [Totals; 2],
    state_hashes: [u64; 2],
}

fn load_rules(path: Option<&PathBuf>) -> Result<Rules> {
    let Some(path) = path else {
        return Ok(Rules::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading rules from {}", path.display()))?;
    Rules::from_json_str(&text).with_context(|| format!("loading rules from {}", path.display()))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let rules = load_rules(args.rules.as_ref())?;
    let mut players = [
        Player::new(rules.clone(), args.seed)?,
        Player::new(rules.clone(), args.seed ^ 0x5555_5555_5555_5555)?,
    ];
    let mut health = [args.health; 2];
    info!(seed = args.seed, ticks = args.ticks, "duel started");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut tick = 0;
    let mut winner = None;

    while tick < args.ticks && winner.is_none() {
        for index in 0..players.len() {
            let opponent = 1 - index;
            let finished = players[index].step();

            for event in players[index].drain_events() {
                let report = Report {
                    tick,
                    player: index,
                    event: &event,
                };
                serde_json::to_writer(&mut out, &report)?;
                writeln!(out)?;
            }

            let Some(score) = finished else {
                continue;
            };
            let damage = score.chain_count() * score.total_vanished();
            health[opponent] = health[opponent].saturating_sub(damage);
            if score.chain_count() >= 2 {
                #[allow(clippy::cast_possible_truncation)]
                let column = (tick % u64::from(rules.width)) as u32;
                let frozen = players[opponent].freeze_column(column);
                info!(player = index, column, frozen, "opponent column frozen");
            }
            info!(
                player = index,
                chains = score.chain_count(),
                damage,
                opponent_health = health[opponent],
                "cascade landed"
            );
            if health[opponent] == 0 {
                winner = Some(index);
                break;
            }
        }
        tick += 1;
    }

    let summary = Summary {
        event: "summary",
        ticks: tick,
        winner,
        health,
        totals: [players[0].totals(), players[1].totals()],
        state_hashes: [
            players[0].engine().state_hash(),
            players[1].engine().state_hash(),
        ],
    };
    serde_json::to_writer(&mut out, &summary)?;
    writeln!(out)?;
    out.flush()?;

    info!(?winner, ticks = tick, "duel finished");
    Ok(())
}
