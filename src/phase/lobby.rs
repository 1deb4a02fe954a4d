//! Pre-game phases: gathering players and choosing mages.

use tracing::debug;

use super::planning::Planning;
use super::Phase;
use crate::board::{Mage, Player, PlayerId, Table};
use crate::config::GameParameters;
use crate::error::{ConfigError, GameError};
use crate::rng::RandomSource;

/// Players join and leave until the table is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lobby {
    params: GameParameters,
    nicknames: Vec<String>,
}

impl Lobby {
    /// Opens an empty lobby. Fails when `params` are inconsistent.
    pub fn new(params: GameParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Lobby { params, nicknames: Vec::new() })
    }

    pub fn params(&self) -> &GameParameters {
        &self.params
    }

    pub fn nicknames(&self) -> &[String] {
        &self.nicknames
    }

    pub fn join(&self, nickname: &str) -> Result<Phase, GameError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::precondition("empty nickname"));
        }
        if self.nicknames.iter().any(|n| n == nickname) {
            return Err(GameError::invalid_update(format!(
                "nickname '{}' is already taken",
                nickname
            )));
        }
        let mut nicknames = self.nicknames.clone();
        nicknames.push(nickname.to_string());
        debug!(nickname, seated = nicknames.len(), "player joined");
        if nicknames.len() < self.params.player_count {
            return Ok(Phase::Lobby(Lobby { params: self.params.clone(), nicknames }));
        }
        let players = nicknames
            .into_iter()
            .enumerate()
            .map(|(seat, nickname)| Player { id: PlayerId(seat as u8), nickname, mage: None })
            .collect();
        Ok(Phase::Prepare(Prepare { params: self.params.clone(), players }))
    }

    pub fn leave(&self, nickname: &str) -> Result<Phase, GameError> {
        let idx = self
            .nicknames
            .iter()
            .position(|n| n == nickname)
            .ok_or_else(|| GameError::unauthorized(nickname, "leave the lobby"))?;
        let mut nicknames = self.nicknames.clone();
        nicknames.remove(idx);
        debug!(nickname, seated = nicknames.len(), "player left");
        Ok(Phase::Lobby(Lobby { params: self.params.clone(), nicknames }))
    }
}

/// Every seated player picks a distinct mage; the last pick deals the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepare {
    params: GameParameters,
    players: Vec<Player>,
}

impl Prepare {
    pub fn params(&self) -> &GameParameters {
        &self.params
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Mages nobody has picked yet.
    pub fn free_mages(&self) -> Vec<Mage> {
        crate::board::ALL_MAGES
            .iter()
            .copied()
            .filter(|m| self.players.iter().all(|p| p.mage != Some(*m)))
            .collect()
    }

    pub fn choose_mage(
        &self,
        player: PlayerId,
        mage: Mage,
        rng: &mut dyn RandomSource,
    ) -> Result<Phase, GameError> {
        let seated = self
            .players
            .get(player.seat())
            .ok_or_else(|| GameError::unauthorized(player.to_string(), "choose a mage"))?;
        if seated.mage.is_some() {
            return Err(GameError::invalid_update(format!(
                "{} already chose a mage",
                seated.nickname
            )));
        }
        if !self.free_mages().contains(&mage) {
            return Err(GameError::invalid_update(format!(
                "mage {} is already taken",
                mage.name()
            )));
        }
        let mut players = self.players.clone();
        players[player.seat()].mage = Some(mage);
        debug!(player = %player, mage = mage.name(), "mage chosen");
        if players.iter().any(|p| p.mage.is_none()) {
            return Ok(Phase::Prepare(Prepare { params: self.params.clone(), players }));
        }
        let table = Table::setup(self.params.clone(), players, rng);
        Ok(Phase::Planning(Planning::start(table, 1, 0, rng)?))
    }
}
