//! Players, their mages and assistants, and their personal boards.
//!
//! Players are identified by seat ([`PlayerId`]); every other structure
//! refers to players by id and resolves it against the table when needed.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::color::{PawnColor, StudentSet};
use crate::error::GameError;

/// Seat index of a player; stable for the whole match once seated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const fn seat(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// One of the four selectable mages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mage {
    Druid,
    King,
    Witch,
    Sage,
}

pub const ALL_MAGES: [Mage; 4] = [Mage::Druid, Mage::King, Mage::Witch, Mage::Sage];

impl Mage {
    pub const fn name(self) -> &'static str {
        match self {
            Mage::Druid => "druid",
            Mage::King => "king",
            Mage::Witch => "witch",
            Mage::Sage => "sage",
        }
    }

    pub fn from_name(s: &str) -> Option<Mage> {
        ALL_MAGES
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
    }
}

/// Tower color, assigned by seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerColor {
    White,
    Black,
    Grey,
}

impl TowerColor {
    pub fn for_seat(seat: usize) -> TowerColor {
        match seat {
            0 => TowerColor::White,
            1 => TowerColor::Black,
            _ => TowerColor::Grey,
        }
    }
}

/// An assistant card: its priority value and mother nature step budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assistant {
    pub value: u8,
    pub steps: u8,
}

impl Assistant {
    /// Number of assistants in a fresh hand.
    pub const DECK_SIZE: u8 = 10;

    /// Returns the assistant printed with `value`, if it exists.
    pub fn with_value(value: u8) -> Option<Assistant> {
        if (1..=Self::DECK_SIZE).contains(&value) {
            Some(Assistant { value, steps: value.div_ceil(2) })
        } else {
            None
        }
    }

    /// The full ten-card hand in ascending value.
    pub fn deck() -> Vec<Assistant> {
        (1..=Self::DECK_SIZE).filter_map(Assistant::with_value).collect()
    }
}

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub mage: Option<Mage>,
}

/// A player's personal board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerBoard {
    pub owner: PlayerId,
    pub tower_color: TowerColor,
    pub towers: u32,
    pub hand: Vec<Assistant>,
    pub last_played: Option<Assistant>,
    pub entrance: StudentSet,
    pub hall: StudentSet,
    pub coins: u32,
    pub entrance_capacity: u32,
    pub hall_capacity: u32,
}

impl PlayerBoard {
    /// Creates a board with a full hand and an empty entrance.
    pub fn new(
        owner: PlayerId,
        towers: u32,
        coins: u32,
        entrance_capacity: u32,
        hall_capacity: u32,
    ) -> Self {
        PlayerBoard {
            owner,
            tower_color: TowerColor::for_seat(owner.seat()),
            towers,
            hand: Assistant::deck(),
            last_played: None,
            entrance: StudentSet::new(),
            hall: StudentSet::new(),
            coins,
            entrance_capacity,
            hall_capacity,
        }
    }

    /// Room left in the entrance.
    pub fn entrance_room(&self) -> u32 {
        self.entrance_capacity.saturating_sub(self.entrance.total())
    }

    /// Room left in the hall row of `color`.
    pub fn hall_room(&self, color: PawnColor) -> u32 {
        self.hall_capacity.saturating_sub(self.hall.count(color))
    }

    pub fn has_assistant(&self, value: u8) -> bool {
        self.hand.iter().any(|a| a.value == value)
    }

    /// Removes the assistant with `value` from the hand and records it as
    /// played.
    pub(crate) fn play_assistant(&mut self, value: u8) -> Result<Assistant, GameError> {
        let idx = self
            .hand
            .iter()
            .position(|a| a.value == value)
            .ok_or_else(|| {
                GameError::invalid_update(format!("assistant {} is not in hand", value))
            })?;
        let card = self.hand.remove(idx);
        self.last_played = Some(card);
        Ok(card)
    }

    /// Adds students to the entrance, refusing to overflow it.
    pub(crate) fn fill_entrance(&mut self, students: &StudentSet) -> Result<(), GameError> {
        if students.total() > self.entrance_room() {
            return Err(GameError::invalid_update("the entrance is full"));
        }
        self.entrance.absorb(students);
        Ok(())
    }

    /// Adds one student to the hall, refusing to overflow the row.
    pub(crate) fn add_to_hall(&mut self, color: PawnColor) -> Result<u32, GameError> {
        if self.hall_room(color) == 0 {
            return Err(GameError::invalid_update(format!("the {} hall row is full", color)));
        }
        self.hall.add(color, 1);
        Ok(self.hall.count(color))
    }
}
