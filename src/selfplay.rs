//! Random self-play.
//!
//! Plays complete matches by feeding random candidate commands to the phase
//! machine, retrying when a candidate is refused. Records per-game statistics
//! and writes them as JSON lines.

use std::io::Write;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GameParameters;
use crate::error::GameError;
use crate::movegen::{legal_commands, random_command};
use crate::phase::Phase;

/// Configuration for self-play runs.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Game parameters shared by every game.
    pub params: GameParameters,
    /// Hard cap on accepted commands per game.
    pub max_actions: usize,
    /// Chance of trying a character when one is affordable.
    pub character_rate: f64,
    /// Random seed; game `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            params: GameParameters::two_players(),
            max_actions: 5_000,
            character_rate: 0.1,
            seed: 0,
        }
    }
}

/// Outcome of one self-play game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub seed: u64,
    pub finished: bool,
    pub rounds: u32,
    pub actions: usize,
    pub rejected: usize,
    pub characters_played: usize,
    pub winners: Vec<String>,
    /// Island group count after each accepted command.
    pub group_counts: Vec<usize>,
    /// Every accepted command, in text form.
    pub commands: Vec<String>,
}

/// Plays one game to completion or to the action cap.
pub fn play_game(config: &SelfPlayConfig, game_id: usize) -> Result<GameRecord, GameError> {
    let seed = config.seed.wrapping_add(game_id as u64);
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut phase = Phase::new(config.params.clone())
        .map_err(|e| GameError::precondition(e.to_string()))?;
    let mut record = GameRecord {
        game_id,
        seed,
        finished: false,
        rounds: 0,
        actions: 0,
        rejected: 0,
        characters_played: 0,
        winners: Vec::new(),
        group_counts: Vec::new(),
        commands: Vec::new(),
    };

    while !phase.is_over() && record.actions < config.max_actions {
        let first = random_command(&phase, config.character_rate, &mut rng);
        let mut fallback = legal_commands(&phase);
        fallback.shuffle(&mut rng);
        let mut accepted = None;
        for cmd in first.into_iter().chain(fallback) {
            match cmd.apply(&phase, &mut rng) {
                Ok(next) => {
                    accepted = Some((cmd, next));
                    break;
                }
                Err(e) => {
                    debug!(command = %cmd, error = %e, "candidate refused");
                    record.rejected += 1;
                }
            }
        }
        let Some((cmd, next)) = accepted else {
            return Err(GameError::precondition(format!(
                "no playable command in the {} phase",
                phase.name()
            )));
        };
        if matches!(cmd, crate::protocol::GameCommand::PlayCharacter { .. }) {
            record.characters_played += 1;
        }
        record.commands.push(cmd.to_string());
        record.actions += 1;
        phase = next;
        if let Some(table) = phase.table() {
            record.group_counts.push(table.islands().group_count());
        }
    }

    record.finished = phase.is_over();
    record.rounds = phase.round().unwrap_or(0);
    if let (Some(winners), Some(table)) = (phase.winners(), phase.table()) {
        record.winners = winners.iter().map(|&w| table.nickname(w)).collect();
    }
    info!(
        game_id,
        rounds = record.rounds,
        actions = record.actions,
        winners = ?record.winners,
        "self-play game finished"
    );
    Ok(record)
}

/// Plays `config.num_games` games sequentially.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, GameError> {
    (0..config.num_games).map(|i| play_game(config, i)).collect()
}

/// Writes one JSON object per game.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints aggregate statistics to stderr.
pub fn print_summary(games: &[GameRecord]) {
    if games.is_empty() {
        return;
    }
    let n = games.len() as f64;
    let finished = games.iter().filter(|g| g.finished).count();
    let rounds: u32 = games.iter().map(|g| g.rounds).sum();
    let actions: usize = games.iter().map(|g| g.actions).sum();
    let characters: usize = games.iter().map(|g| g.characters_played).sum();
    let shared = games.iter().filter(|g| g.winners.len() > 1).count();
    eprintln!("--- Self-play summary ---");
    eprintln!("Games: {} ({} finished)", games.len(), finished);
    eprintln!("Avg rounds: {:.1}", f64::from(rounds) / n);
    eprintln!("Avg actions: {:.1}", actions as f64 / n);
    eprintln!("Avg characters played: {:.2}", characters as f64 / n);
    eprintln!("Shared wins: {}", shared);
}
