//! Match parameters.
//!
//! A [`GameParameters`] value is supplied to the lobby and never changes
//! afterwards. Every count used by the rules (entrance size, towers, clouds,
//! students moved per turn, ...) is read from it.

use serde::{Deserialize, Serialize};

use crate::character::CharacterType;
use crate::error::ConfigError;

/// Number of islands on a fresh ring.
pub const DEFAULT_ISLAND_COUNT: usize = 12;

/// Students of each color in the whole game (bag + seeding pool).
pub const DEFAULT_STUDENTS_PER_COLOR: u32 = 26;

/// Students of each color set aside to seed the islands at setup. Islands
/// beyond the pool stay empty; leftovers go to the bag.
pub const SEED_STUDENTS_PER_COLOR: u32 = 2;

/// Read-only parameters of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameParameters {
    pub player_count: usize,
    pub island_count: usize,
    pub entrance_size: u32,
    pub hall_capacity: u32,
    pub towers_per_player: u32,
    pub students_per_turn: u32,
    pub cloud_count: usize,
    pub cloud_size: u32,
    pub students_per_color: u32,
    pub initial_coins: u32,
    pub coin_supply: u32,
    pub characters_per_game: usize,
    /// Fixed character line-up; drawn at random when absent.
    pub characters: Option<Vec<CharacterType>>,
    /// Extra mother nature steps granted by the Postman.
    pub postman_bonus: u32,
    /// Extra influence granted by the Knight.
    pub knight_bonus: i32,
    /// Students moved back to the bag by the Thief, per player.
    pub thief_quota: u32,
}

impl Default for GameParameters {
    fn default() -> Self {
        GameParameters::two_players()
    }
}

impl GameParameters {
    /// Standard parameters for a two-player match.
    pub fn two_players() -> Self {
        GameParameters {
            player_count: 2,
            island_count: DEFAULT_ISLAND_COUNT,
            entrance_size: 7,
            hall_capacity: 10,
            towers_per_player: 8,
            students_per_turn: 3,
            cloud_count: 2,
            cloud_size: 3,
            students_per_color: DEFAULT_STUDENTS_PER_COLOR,
            initial_coins: 1,
            coin_supply: 20,
            characters_per_game: 3,
            characters: None,
            postman_bonus: 2,
            knight_bonus: 2,
            thief_quota: 3,
        }
    }

    /// Standard parameters for a three-player match.
    pub fn three_players() -> Self {
        GameParameters {
            player_count: 3,
            entrance_size: 9,
            towers_per_player: 6,
            students_per_turn: 4,
            cloud_count: 3,
            cloud_size: 4,
            ..GameParameters::two_players()
        }
    }

    /// Returns the standard parameters for `player_count` players.
    pub fn for_players(player_count: usize) -> Result<Self, ConfigError> {
        match player_count {
            2 => Ok(GameParameters::two_players()),
            3 => Ok(GameParameters::three_players()),
            n => Err(ConfigError::PlayerCount(n)),
        }
    }

    /// Parses and validates parameters from JSON. Missing fields take the
    /// two-player defaults.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let params: GameParameters = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Replaces the character line-up with a fixed one.
    pub fn with_characters(mut self, characters: Vec<CharacterType>) -> Self {
        self.characters_per_game = characters.len();
        self.characters = Some(characters);
        self
    }

    /// Checks the cross-field constraints the rules rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=3).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount(self.player_count));
        }
        if self.island_count < 4 || self.island_count > u8::MAX as usize {
            return Err(invalid("island_count", "must be between 4 and 255"));
        }
        if self.cloud_count != self.player_count {
            return Err(invalid("cloud_count", "must equal player_count"));
        }
        if self.students_per_turn == 0 || self.students_per_turn > self.entrance_size {
            return Err(invalid(
                "students_per_turn",
                "must be between 1 and entrance_size",
            ));
        }
        if self.cloud_size != self.students_per_turn {
            return Err(invalid("cloud_size", "must equal students_per_turn"));
        }
        if self.hall_capacity == 0 || self.towers_per_player == 0 {
            return Err(invalid("hall_capacity", "hall and towers must be non-empty"));
        }
        if self.students_per_color < SEED_STUDENTS_PER_COLOR {
            return Err(invalid(
                "students_per_color",
                format!("must be at least {}", SEED_STUDENTS_PER_COLOR),
            ));
        }
        if let Some(list) = &self.characters {
            if list.len() != self.characters_per_game {
                return Err(invalid(
                    "characters",
                    "length must equal characters_per_game",
                ));
            }
            let mut seen = list.clone();
            seen.sort_unstable();
            seen.dedup();
            if seen.len() != list.len() {
                return Err(invalid("characters", "duplicates are not allowed"));
            }
        } else if self.characters_per_game > CharacterType::ALL.len() {
            return Err(invalid("characters_per_game", "more than available"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { name, reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_parameters_validate() {
        assert!(GameParameters::two_players().validate().is_ok());
        assert!(GameParameters::three_players().validate().is_ok());
    }

    #[test]
    fn for_players_rejects_unsupported_counts() {
        assert!(matches!(
            GameParameters::for_players(5),
            Err(ConfigError::PlayerCount(5))
        ));
        assert_eq!(GameParameters::for_players(3).unwrap().entrance_size, 9);
    }

    #[test]
    fn from_json_fills_defaults() {
        let params = GameParameters::from_json(r#"{"island_count": 10}"#).unwrap();
        assert_eq!(params.island_count, 10);
        assert_eq!(params.player_count, 2);
        assert_eq!(params.entrance_size, 7);
    }

    #[test]
    fn from_json_reads_character_list() {
        let params = GameParameters::from_json(
            r#"{"characters_per_game": 2, "characters": ["Monk", "Knight"]}"#,
        )
        .unwrap();
        assert_eq!(
            params.characters,
            Some(vec![CharacterType::Monk, CharacterType::Knight])
        );
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let err = GameParameters::from_json(r#"{"islands": 3}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn validate_rejects_mismatched_clouds() {
        let params = GameParameters { cloud_count: 3, ..GameParameters::two_players() };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::Invalid { name: "cloud_count", .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_characters() {
        let params = GameParameters::two_players()
            .with_characters(vec![CharacterType::Monk, CharacterType::Monk]);
        assert!(params.validate().is_err());
    }
}
