#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that lays out Limes boards and reports their territories and score.

mod board;
mod report;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use limes_core::Variants;
use limes_rendering::BoardLayout;
use tracing_subscriber::EnvFilter;

use crate::board::{CardSpec, Session};

/// Limes board inspector.
#[derive(Parser, Debug)]
#[command(name = "limes", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with a `[layout]` table used when printing outlines
    #[arg(long, global = true)]
    layout: Option<PathBuf>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay the given cards in order and report the resulting board
    Inspect {
        /// Cards as space separated `x,y:id:rotation` entries, e.g. "0,0:1:0 1,0:7:2"
        #[arg(long, required = true)]
        cards: String,

        /// Worker zones as space separated `x,y` entries
        #[arg(long, default_value = "")]
        workers: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Deal a full four-by-four board from a seeded shuffle
    Deal {
        /// Seed of the deterministic shuffle
        #[arg(short, long)]
        seed: u64,

        /// Number of workers dropped onto random zones
        #[arg(short, long, default_value = "0")]
        workers: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Comma separated rule variants: diagonals, ferrymen, profis
    #[arg(long, default_value = "")]
    variants: Variants,

    /// Print projected territory outlines
    #[arg(long)]
    outlines: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let layout = load_layout(args.layout.as_deref())?;

    let (session, output) = match args.command {
        Commands::Inspect {
            cards,
            workers,
            output,
        } => {
            let cards = CardSpec::parse_list(&cards)?;
            let workers = board::parse_workers(&workers)?;
            let session = Session::lay(output.variants, &cards, &workers)?;
            (session, output)
        }
        Commands::Deal {
            seed,
            workers,
            output,
        } => (Session::deal(seed, output.variants, workers)?, output),
    };

    let summary = report::summarize(&session, &layout, output.outlines)?;
    if output.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode report as json")?
        );
    } else {
        print!("{}", report::render_text(&session, &summary));
    }
    Ok(())
}

fn load_layout(path: Option<&std::path::Path>) -> Result<BoardLayout> {
    let Some(path) = path else {
        return Ok(BoardLayout::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout file at {}", path.display()))?;
    BoardLayout::from_toml_str(&contents)
        .with_context(|| format!("invalid layout file {}", path.display()))
}
