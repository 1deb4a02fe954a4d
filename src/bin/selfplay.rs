//! Random self-play CLI.
//!
//! Plays matches with random legal commands and outputs one JSON record per
//! game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N         Number of games to play (default: 10)
//!   --players N       2 or 3 players (default: 2)
//!   --characters R    Chance of trying an affordable character (default: 0.1)
//!   --max-actions N   Cap on commands per game (default: 5000)
//!   --seed N          Base random seed (default: 0)
//!   --output FILE     Output file path (default: stdout)
//!   --quiet           Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use eriantys::config::GameParameters;
use eriantys::selfplay::{self, SelfPlayConfig};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run(env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{}", msg);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    args.get(i)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("invalid {} value", flag))
}

fn run(args: Vec<String>) -> Result<(), String> {
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;
    let mut quiet = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = value(&args, i, "--games")?;
            }
            "--players" => {
                i += 1;
                let n: usize = value(&args, i, "--players")?;
                config.params = GameParameters::for_players(n).map_err(|e| e.to_string())?;
            }
            "--characters" => {
                i += 1;
                let rate: f64 = value(&args, i, "--characters")?;
                if !(0.0..=1.0).contains(&rate) {
                    return Err("--characters must be between 0 and 1".to_string());
                }
                config.character_rate = rate;
            }
            "--max-actions" => {
                i += 1;
                config.max_actions = value(&args, i, "--max-actions")?;
            }
            "--seed" => {
                i += 1;
                config.seed = value(&args, i, "--seed")?;
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, "--output")?);
            }
            "--quiet" => quiet = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    if !quiet {
        eprintln!(
            "Self-play: {} games, {} players, character rate {:.2}, seed {}",
            config.num_games, config.params.player_count, config.character_rate, config.seed
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config).map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();

    if !quiet {
        eprintln!(
            "Completed {} games in {:.2}s",
            games.len(),
            elapsed.as_secs_f64()
        );
        selfplay::print_summary(&games);
    }

    let written = match &output_path {
        Some(path) => {
            let file = File::create(path).map_err(|e| format!("{}: {}", path, e))?;
            selfplay::write_jsonl(&games, &mut BufWriter::new(file))
        }
        None => {
            let stdout = io::stdout();
            selfplay::write_jsonl(&games, &mut BufWriter::new(stdout.lock()))
        }
    };
    written.map_err(|e| format!("failed to write output: {}", e))?;
    if let (Some(path), false) = (&output_path, quiet) {
        eprintln!("Wrote {} games to {}", games.len(), path);
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N         Number of games to play (default: 10)");
    eprintln!("  --players N       2 or 3 players (default: 2)");
    eprintln!("  --characters R    Chance of trying an affordable character (default: 0.1)");
    eprintln!("  --max-actions N   Cap on commands per game (default: 5000)");
    eprintln!("  --seed N          Base random seed (default: 0)");
    eprintln!("  --output FILE     Output file path (default: stdout)");
    eprintln!("  --quiet           Suppress summary output");
    eprintln!("  --help            Show this help");
}
