//! Driver command parser.
//!
//! Parses incoming text lines into structured `Command` variants that the
//! driver loop can dispatch on. Game commands address players by nickname.

use crate::board::{IslandId, Mage, PawnColor};
use crate::character::{CharacterStep, CharacterType};

use super::command::GameCommand;

/// A parsed driver command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A move in the match.
    Game(GameCommand),

    /// Synchronization ping; the driver replies `readyok`.
    IsReady,

    /// Set a driver option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Discard the match and open a new lobby.
    NewGame,

    /// Print the full state of the current phase.
    Dump,

    /// Terminate the driver.
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("malformed {command}: expected '{usage}'")]
    Usage {
        command: &'static str,
        usage: &'static str,
    },

    #[error("invalid {what}: '{raw}'")]
    Value { what: &'static str, raw: String },
}

/// Parses a single line of input into a `Command`.
///
/// Returns `Ok(None)` for empty lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };

    let cmd = match head {
        "isready" => Command::IsReady,
        "quit" => Command::Quit,
        "newgame" => Command::NewGame,
        "dump" => Command::Dump,
        "setoption" => parse_setoption(&tokens)?,
        "join" => {
            let [nickname] = args(&tokens, "join", "join <nickname>")?;
            Command::Game(GameCommand::Join { nickname: nickname.to_string() })
        }
        "leave" => {
            let [nickname] = args(&tokens, "leave", "leave <nickname>")?;
            Command::Game(GameCommand::Leave { nickname: nickname.to_string() })
        }
        "mage" => {
            let [nickname, mage] = args(&tokens, "mage", "mage <nickname> <mage>")?;
            let mage = Mage::from_name(mage).ok_or_else(|| bad_value("mage", mage))?;
            Command::Game(GameCommand::ChooseMage { nickname: nickname.to_string(), mage })
        }
        "assistant" => {
            let [nickname, v] = args(&tokens, "assistant", "assistant <nickname> <value>")?;
            let value = v.parse::<u8>().map_err(|_| bad_value("assistant", v))?;
            Command::Game(GameCommand::PlayAssistant { nickname: nickname.to_string(), value })
        }
        "hall" => {
            let [nickname, color] = args(&tokens, "hall", "hall <nickname> <color>")?;
            Command::Game(GameCommand::MoveToHall {
                nickname: nickname.to_string(),
                color: parse_color(color)?,
            })
        }
        "island" => {
            let [nickname, color, island] =
                args(&tokens, "island", "island <nickname> <color> <island>")?;
            let index = island.parse::<u8>().map_err(|_| bad_value("island", island))?;
            Command::Game(GameCommand::MoveToIsland {
                nickname: nickname.to_string(),
                color: parse_color(color)?,
                island: IslandId(index),
            })
        }
        "mn" => {
            let [nickname, s] = args(&tokens, "mn", "mn <nickname> <steps>")?;
            let steps = s.parse::<u32>().map_err(|_| bad_value("step count", s))?;
            Command::Game(GameCommand::MoveMotherNature { nickname: nickname.to_string(), steps })
        }
        "cloud" => {
            let [nickname, c] = args(&tokens, "cloud", "cloud <nickname> <index>")?;
            let cloud = c.parse::<usize>().map_err(|_| bad_value("cloud", c))?;
            Command::Game(GameCommand::PickCloud { nickname: nickname.to_string(), cloud })
        }
        "character" => parse_character(&tokens)?,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

/// Returns exactly `N` arguments following the command word.
fn args<'a, const N: usize>(
    tokens: &[&'a str],
    command: &'static str,
    usage: &'static str,
) -> Result<[&'a str; N], ParseError> {
    <[&'a str; N]>::try_from(&tokens[1..]).map_err(|_| ParseError::Usage { command, usage })
}

fn bad_value(what: &'static str, raw: &str) -> ParseError {
    ParseError::Value { what, raw: raw.to_string() }
}

fn parse_color(raw: &str) -> Result<PawnColor, ParseError> {
    PawnColor::from_name(raw).ok_or_else(|| bad_value("color", raw))
}

/// Parses `character <nickname> <name> [k=v,k=v ...]`, one token per step.
fn parse_character(tokens: &[&str]) -> Result<Command, ParseError> {
    const USAGE: &str = "character <nickname> <name> [key=value,... ...]";
    if tokens.len() < 3 {
        return Err(ParseError::Usage { command: "character", usage: USAGE });
    }
    let character =
        CharacterType::from_name(tokens[2]).ok_or_else(|| bad_value("character", tokens[2]))?;
    let mut steps = Vec::new();
    for raw in &tokens[3..] {
        let mut step = CharacterStep::new();
        for pair in raw.split(',').filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').ok_or_else(|| bad_value("step", raw))?;
            if k.is_empty() {
                return Err(bad_value("step", raw));
            }
            step = step.with(k, v);
        }
        steps.push(step);
    }
    Ok(Command::Game(GameCommand::PlayCharacter {
        nickname: tokens[1].to_string(),
        character,
        steps,
    }))
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, ParseError> {
    let malformed = || ParseError::Usage {
        command: "setoption",
        usage: "setoption name <id> [value <x>]",
    };
    if tokens.len() < 3 || tokens[1] != "name" {
        return Err(malformed());
    }

    let (name, value) = match tokens.iter().position(|&t| t == "value") {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                return Err(malformed());
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Ok(Command::SetOption { name, value })
}
