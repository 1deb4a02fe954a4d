//! Match context of the driver binary.
//!
//! Holds the current phase, the parameters the next match will use, driver
//! options and the random source. Every accepted game command replaces the
//! phase and yields the change record against the previous one.

use std::collections::HashMap;
use std::io::{self, Write};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::character::CharacterType;
use crate::config::GameParameters;
use crate::error::{ConfigError, GameError};
use crate::phase::{Phase, UpdateRecord};
use crate::protocol::GameCommand;

/// Holds the mutable state of the driver between commands.
pub struct Engine {
    pub phase: Phase,
    pub params: GameParameters,
    pub options: HashMap<String, String>,
    rng: SmallRng,
}

impl Engine {
    /// Opens a lobby with `params`, seeding from entropy.
    pub fn new(params: GameParameters) -> Result<Self, ConfigError> {
        Engine::with_rng(params, SmallRng::from_entropy())
    }

    /// Opens a lobby with a deterministic random source.
    pub fn with_seed(params: GameParameters, seed: u64) -> Result<Self, ConfigError> {
        Engine::with_rng(params, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(params: GameParameters, rng: SmallRng) -> Result<Self, ConfigError> {
        Ok(Engine {
            phase: Phase::new(params.clone())?,
            params,
            options: HashMap::new(),
            rng,
        })
    }

    /// Discards the current match and opens a new lobby.
    pub fn new_game(&mut self) -> Result<(), ConfigError> {
        self.phase = Phase::new(self.params.clone())?;
        debug!(players = self.params.player_count, "new game");
        Ok(())
    }

    /// Sets a driver option. Game options take effect at the next `newgame`.
    ///
    /// Known options: `Players` (2 or 3), `Characters` (comma-separated
    /// names, or `random`), `Params` (inline JSON), `Seed`.
    pub fn set_option(&mut self, name: String, value: Option<String>) -> Result<(), ConfigError> {
        let raw = value.clone().unwrap_or_default();
        match name.as_str() {
            "Players" => {
                let n = raw.trim().parse::<usize>().map_err(|_| ConfigError::Invalid {
                    name: "Players",
                    reason: format!("'{}' is not a number", raw),
                })?;
                let mut params = GameParameters::for_players(n)?;
                params.characters = self.params.characters.clone();
                params.characters_per_game = self.params.characters_per_game;
                params.validate()?;
                self.params = params;
            }
            "Characters" => {
                let params = match parse_characters(&raw)? {
                    Some(list) => self.params.clone().with_characters(list),
                    None => GameParameters { characters: None, ..self.params.clone() },
                };
                params.validate()?;
                self.params = params;
            }
            "Params" => {
                self.params = GameParameters::from_json(&raw)?;
            }
            "Seed" => {
                let seed = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "Seed",
                    reason: format!("'{}' is not a number", raw),
                })?;
                self.rng = SmallRng::seed_from_u64(seed);
            }
            _ => {}
        }
        self.options.insert(name, value.unwrap_or_default());
        Ok(())
    }

    /// Applies one game command. On success the phase advances and the
    /// change record is returned; on failure nothing changes.
    pub fn apply(&mut self, cmd: &GameCommand) -> Result<UpdateRecord, GameError> {
        let next = cmd.apply(&self.phase, &mut self.rng)?;
        let record = next.compare(&self.phase);
        self.phase = next;
        Ok(record)
    }

    /// Handles a game command: writes `ok <description>` and the update
    /// record, or `error <reason>`.
    pub fn handle_game<W: Write>(&mut self, cmd: &GameCommand, out: &mut W) -> io::Result<()> {
        match self.apply(cmd) {
            Ok(record) => {
                writeln!(out, "ok {}", cmd.describe())?;
                writeln!(out, "update {}", to_json(&record)?)?;
                if let (Some(winners), Some(table)) = (self.phase.winners(), self.phase.table()) {
                    let names: Vec<String> = winners.iter().map(|&w| table.nickname(w)).collect();
                    writeln!(out, "winners {}", names.join(" "))?;
                }
            }
            Err(e) if e.is_protocol_error() => {
                warn!(command = %cmd, error = %e, "command rejected");
                writeln!(out, "error {}", e)?;
            }
            Err(e) => {
                debug!(command = %cmd, error = %e, "move refused");
                writeln!(out, "error {}", e)?;
            }
        }
        out.flush()
    }

    /// Writes the full state of the current phase.
    pub fn handle_dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "dump {}", to_json(&self.phase.dump())?)?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }
}

fn to_json(record: &UpdateRecord) -> io::Result<String> {
    serde_json::to_string(record).map_err(io::Error::from)
}

fn parse_characters(raw: &str) -> Result<Option<Vec<CharacterType>>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("random") {
        return Ok(None);
    }
    raw.split(',')
        .map(|name| {
            CharacterType::from_name(name).ok_or_else(|| ConfigError::Invalid {
                name: "Characters",
                reason: format!("unknown character '{}'", name.trim()),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(engine: &mut Engine, name: &str) {
        engine.apply(&GameCommand::Join { nickname: name.into() }).unwrap();
    }

    #[test]
    fn new_engine_starts_in_the_lobby() {
        let engine = Engine::with_seed(GameParameters::two_players(), 1).unwrap();
        assert_eq!(engine.phase.name(), "Lobby");
        assert!(engine.options.is_empty());
    }

    #[test]
    fn invalid_parameters_are_refused_up_front() {
        let params = GameParameters { characters_per_game: 13, ..GameParameters::two_players() };
        assert!(Engine::with_seed(params, 1).is_err());
    }

    #[test]
    fn new_game_resets_the_phase() {
        let mut engine = Engine::with_seed(GameParameters::two_players(), 1).unwrap();
        join(&mut engine, "ann");
        join(&mut engine, "bob");
        assert_eq!(engine.phase.name(), "Prepare");
        engine.new_game().unwrap();
        assert_eq!(engine.phase.name(), "Lobby");
    }

    #[test]
    fn players_option_applies_at_next_game() {
        let mut engine = Engine::with_seed(GameParameters::two_players(), 1).unwrap();
        engine.set_option("Players".into(), Some("3".into())).unwrap();
        assert_eq!(engine.params.player_count, 3);
        assert_eq!(engine.phase.params().player_count, 2);
        engine.new_game().unwrap();
        assert_eq!(engine.phase.params().player_count, 3);
        assert!(engine.set_option("Players".into(), Some("5".into())).is_err());
        assert!(engine.set_option("Players".into(), Some("many".into())).is_err());
    }

    #[test]
    fn characters_option_fixes_the_draw() {
        let mut engine = Engine::with_seed(GameParameters::two_players(), 1).unwrap();
        engine
            .set_option("Characters".into(), Some("monk,thief,knight".into()))
            .unwrap();
        assert_eq!(
            engine.params.characters,
            Some(vec![CharacterType::Monk, CharacterType::Thief, CharacterType::Knight])
        );
        assert!(engine.set_option("Characters".into(), Some("monk,wizard".into())).is_err());
    }

    #[test]
    fn rejected_commands_leave_the_phase_alone() {
        let mut engine = Engine::with_seed(GameParameters::two_players(), 1).unwrap();
        let before = engine.phase.clone();
        let mut out = Vec::new();
        let cmd = GameCommand::PlayAssistant { nickname: "ann".into(), value: 3 };
        engine.handle_game(&cmd, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("error "), "{}", text);
        assert_eq!(engine.phase, before);
    }

    #[test]
    fn accepted_commands_print_updates() {
        let mut engine = Engine::with_seed(GameParameters::two_players(), 1).unwrap();
        let mut out = Vec::new();
        engine
            .handle_game(&GameCommand::Join { nickname: "ann".into() }, &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ok ann joins the game"));
        let update = lines.next().unwrap().strip_prefix("update ").unwrap();
        let json: serde_json::Value = serde_json::from_str(update).unwrap();
        assert_eq!(json["attributes"]["phase"], "Lobby");
    }

    #[test]
    fn handle_isready_outputs_readyok() {
        let engine = Engine::with_seed(GameParameters::two_players(), 1).unwrap();
        let mut output = Vec::new();
        engine.handle_isready(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap().trim(), "readyok");
    }
}
