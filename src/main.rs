//! Eriantys -- a line-oriented driver for the rules engine.
//!
//! Reads commands from stdin and writes results to stdout. Logs go to
//! stderr, filtered by `RUST_LOG` (default `warn`). An optional first
//! argument names a JSON file with the game parameters.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use eriantys::config::GameParameters;
use eriantys::engine::Engine;
use eriantys::protocol::{parse_command, Command};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let params = match env::args().nth(1) {
        Some(path) => match load_params(&path) {
            Ok(p) => p,
            Err(e) => {
                error!(path = %path, error = %e, "cannot load parameters");
                return ExitCode::FAILURE;
            }
        },
        None => GameParameters::two_players(),
    };

    let engine = match Engine::new(params) {
        Ok(e) => e,
        Err(e) => {
            error!(error = %e, "invalid parameters");
            return ExitCode::FAILURE;
        }
    };

    match run(engine) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "i/o failure");
            ExitCode::FAILURE
        }
    }
}

fn load_params(path: &str) -> Result<GameParameters, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(GameParameters::from_json(&text)?)
}

/// Runs the command loop until `quit` or end of input.
fn run(mut engine: Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = line?;
        let cmd = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line.trim(), error = %e, "unparsable command");
                writeln!(out, "error {}", e)?;
                out.flush()?;
                continue;
            }
        };

        match cmd {
            Command::Game(game) => engine.handle_game(&game, &mut out)?,
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => {
                if let Err(e) = engine.set_option(name, value) {
                    warn!(error = %e, "option rejected");
                    writeln!(out, "error {}", e)?;
                    out.flush()?;
                }
            }
            Command::NewGame => {
                if let Err(e) = engine.new_game() {
                    warn!(error = %e, "cannot open a new game");
                    writeln!(out, "error {}", e)?;
                    out.flush()?;
                }
            }
            Command::Dump => engine.handle_dump(&mut out)?,
            Command::Quit => break,
        }
    }
    out.flush()
}
