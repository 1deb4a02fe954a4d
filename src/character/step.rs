//! Character step arguments.
//!
//! A step is a free-form bag of string parameters, e.g. `color=red island=4`.
//! Effects pull typed values out of it and report malformed content as
//! `InvalidParameter`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{IslandId, IslandRing, PawnColor};
use crate::error::GameError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStep {
    params: BTreeMap<String, String>,
}

impl CharacterStep {
    pub fn new() -> Self {
        CharacterStep::default()
    }

    /// Returns the step with `key` set to `value`.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    fn required(&self, key: &str) -> Result<&str, GameError> {
        self.get(key)
            .ok_or_else(|| GameError::invalid_parameter(format!("missing '{}'", key)))
    }

    /// Reads a color parameter.
    pub fn color(&self, key: &str) -> Result<PawnColor, GameError> {
        let raw = self.required(key)?;
        PawnColor::from_name(raw)
            .ok_or_else(|| GameError::invalid_parameter(format!("'{}' is not a color", raw)))
    }

    /// Reads an island parameter and checks it names a node of `ring`.
    pub fn island(&self, key: &str, ring: &IslandRing) -> Result<IslandId, GameError> {
        let raw = self.required(key)?;
        let index: u8 = raw
            .trim()
            .parse()
            .map_err(|_| GameError::invalid_parameter(format!("'{}' is not an island", raw)))?;
        let id = IslandId(index);
        if !ring.contains(id) {
            return Err(GameError::invalid_parameter(format!("no island {}", index)));
        }
        Ok(id)
    }
}

impl fmt::Display for CharacterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        f.write_str(&parts.join(","))
    }
}
