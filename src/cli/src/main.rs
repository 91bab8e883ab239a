#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]

mod config;

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, bail, eyre};
use config::CliConfig;
use env_logger::TimestampPrecision;
use log::{LevelFilter, info};
use twophase::{
    CubeState, SharedTables, SolveOutcome, Tables, TwoPhaseSolver, cache, facelet,
    moves::{self, format_moves, parse_compact, parse_moves},
};

/// Solves the 3x3x3 Rubik's Cube with Kociemba's two-phase algorithm
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The configuration file to use, in TOML format. Defaults to
    /// `twophase/config.toml` in the user configuration directory.
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    log_level: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a cube given as a scramble or as facelets
    Solve {
        /// The scramble to solve, e.g. "R U' F2"
        scramble: Option<String>,
        /// Read the scramble in the compact letters-only encoding
        #[arg(long, requires = "scramble")]
        compact_input: bool,
        /// The 54 facelets of the cube in U R F D L B order
        #[arg(long, short, conflicts_with = "scramble")]
        facelets: Option<String>,
        /// Print the solution in the compact letters-only encoding
        #[arg(long)]
        compact: bool,
        /// Give up after this many moves
        #[arg(long)]
        max_depth: Option<u8>,
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<f64>,
        /// Build the tables in memory and skip the cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Print a random-walk scramble and the facelets it produces
    Scramble {
        /// The number of moves
        #[arg(long, short, default_value_t = 20)]
        length: usize,
        /// Seed for a reproducible scramble
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Build the pruning tables and write them to the cache
    BuildTables {
        /// Where to write the tables, overriding the configuration
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.log_level {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let mut config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Solve {
            scramble,
            compact_input,
            facelets,
            compact,
            max_depth,
            timeout,
            no_cache,
        } => {
            let state = match (scramble, facelets) {
                (Some(scramble), None) => {
                    let moves = if compact_input {
                        parse_compact(&scramble)?
                    } else {
                        parse_moves(&scramble)?
                    };
                    CubeState::from_moves(&moves)
                }
                (None, Some(facelets)) => facelet::parse(&facelets)?,
                _ => bail!("Give either a scramble or --facelets"),
            };
            if let Some(max_depth) = max_depth {
                config.solver.max_depth = max_depth;
            }
            config.no_cache |= no_cache;
            run_solve(&config, &state, compact, timeout)?;
        }
        Commands::Scramble { length, seed } => {
            let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
            let scramble = moves::random_scramble(&mut rng, length);
            println!("{}", format_moves(&scramble));
            println!("{}", CubeState::from_moves(&scramble).to_facelets());
        }
        Commands::BuildTables { cache: path } => {
            let path = path
                .or_else(|| config.cache_path())
                .ok_or_else(|| eyre!("No cache directory is available, pass --cache"))?;
            let tables = Tables::build();
            cache::save(&path, tables.pruning())
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn shared_tables(config: &CliConfig) -> SharedTables {
    match config.cache_path() {
        Some(path) => SharedTables::with_cache(path),
        None => SharedTables::new(),
    }
}

fn run_solve(
    config: &CliConfig,
    state: &CubeState,
    compact: bool,
    timeout: Option<f64>,
) -> color_eyre::Result<()> {
    let tables = shared_tables(config).get();

    let interrupt = Arc::new(AtomicBool::new(false));
    if let Some(timeout) = timeout {
        let duration = Duration::try_from_secs_f64(timeout)
            .wrap_err("The timeout must be a non-negative number of seconds")?;
        let interrupt = Arc::clone(&interrupt);
        thread::spawn(move || {
            thread::sleep(duration);
            interrupt.store(true, Ordering::Relaxed);
        });
    }

    let solver = TwoPhaseSolver::new(&tables)
        .with_config(config.solver.clone())
        .with_interrupt(interrupt);
    match solver.solve(state) {
        SolveOutcome::Solved(solution) => {
            info!("Solution has {} moves", solution.len());
            if compact {
                println!("{}", solution.to_compact());
            } else {
                println!("{solution}");
            }
            Ok(())
        }
        SolveOutcome::Exhausted => Err(eyre!(
            "No solution within {} moves",
            config.solver.max_depth
        )),
        SolveOutcome::Cancelled => Err(eyre!("Timed out before finding a solution")),
    }
}
