//! Characters: one-shot special effects bought with coins.
//!
//! A [`CharacterType`] carries the static data of a card (base cost, what it
//! stores, how many steps its effect takes). A [`Character`] is one card in
//! play with its own stored students or locks and its escalated price.
//!
//! Playing a card is split in two hooks: [`Character::prepare`] runs once at
//! setup to stock the card, and [`Character::play`] (see `effects`) resolves
//! the effect against an action phase.

pub mod effects;
pub mod step;

use serde::{Deserialize, Serialize};

use crate::board::{StudentSet, Table};
use crate::rng::RandomSource;

pub use step::CharacterStep;

/// The twelve character cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterType {
    Monk,
    Farmer,
    Herald,
    Postman,
    Herbalist,
    Centaur,
    Jester,
    Knight,
    Mushroom,
    Minstrel,
    Princess,
    Thief,
}

impl CharacterType {
    pub const ALL: [CharacterType; 12] = [
        CharacterType::Monk,
        CharacterType::Farmer,
        CharacterType::Herald,
        CharacterType::Postman,
        CharacterType::Herbalist,
        CharacterType::Centaur,
        CharacterType::Jester,
        CharacterType::Knight,
        CharacterType::Mushroom,
        CharacterType::Minstrel,
        CharacterType::Princess,
        CharacterType::Thief,
    ];

    /// Base price in coins.
    pub const fn cost(self) -> u32 {
        match self {
            CharacterType::Monk
            | CharacterType::Postman
            | CharacterType::Jester
            | CharacterType::Minstrel => 1,
            CharacterType::Farmer
            | CharacterType::Herbalist
            | CharacterType::Knight
            | CharacterType::Princess => 2,
            CharacterType::Herald
            | CharacterType::Centaur
            | CharacterType::Mushroom
            | CharacterType::Thief => 3,
        }
    }

    /// Students stocked on the card at setup.
    pub const fn stored_students(self) -> u32 {
        match self {
            CharacterType::Monk | CharacterType::Princess => 4,
            CharacterType::Jester => 6,
            _ => 0,
        }
    }

    /// Locks stocked on the card at setup.
    pub const fn stored_locks(self) -> u32 {
        match self {
            CharacterType::Herbalist => 4,
            _ => 0,
        }
    }

    pub const fn holds_students(self) -> bool {
        self.stored_students() > 0
    }

    pub const fn holds_locks(self) -> bool {
        self.stored_locks() > 0
    }

    pub const fn min_steps(self) -> usize {
        match self {
            CharacterType::Farmer
            | CharacterType::Postman
            | CharacterType::Centaur
            | CharacterType::Knight => 0,
            _ => 1,
        }
    }

    pub const fn max_steps(self) -> usize {
        match self {
            CharacterType::Jester => 3,
            CharacterType::Minstrel => 2,
            other => other.min_steps(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CharacterType::Monk => "monk",
            CharacterType::Farmer => "farmer",
            CharacterType::Herald => "herald",
            CharacterType::Postman => "postman",
            CharacterType::Herbalist => "herbalist",
            CharacterType::Centaur => "centaur",
            CharacterType::Jester => "jester",
            CharacterType::Knight => "knight",
            CharacterType::Mushroom => "mushroom",
            CharacterType::Minstrel => "minstrel",
            CharacterType::Princess => "princess",
            CharacterType::Thief => "thief",
        }
    }

    pub fn from_name(s: &str) -> Option<CharacterType> {
        CharacterType::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
    }
}

/// One character card in play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    kind: CharacterType,
    /// Set by the first play; raises the price by one for good.
    used: bool,
    students: StudentSet,
    locks: u32,
}

impl Character {
    pub fn new(kind: CharacterType) -> Self {
        Character {
            kind,
            used: false,
            students: StudentSet::new(),
            locks: 0,
        }
    }

    pub fn kind(&self) -> CharacterType {
        self.kind
    }

    /// Current price in coins.
    pub fn price(&self) -> u32 {
        self.kind.cost() + u32::from(self.used)
    }

    pub fn has_been_used(&self) -> bool {
        self.used
    }

    pub fn students(&self) -> StudentSet {
        self.students
    }

    pub fn locks(&self) -> u32 {
        self.locks
    }

    /// Setup hook: stocks the card from the bag (students) or from the box
    /// (locks). A no-op for cards that store nothing.
    pub fn prepare(mut self, table: &mut Table, rng: &mut dyn RandomSource) -> Self {
        if self.kind.holds_students() {
            self.students = table.draw_students(self.kind.stored_students(), rng);
        }
        self.locks = self.kind.stored_locks();
        self
    }

    pub(crate) fn mark_used(&mut self) {
        self.used = true;
    }

    pub(crate) fn students_mut(&mut self) -> &mut StudentSet {
        &mut self.students
    }

    pub(crate) fn set_locks(&mut self, locks: u32) {
        self.locks = locks;
    }
}
