//! Student colors and student multisets.
//!
//! There are five colors; each color has one professor. A [`StudentSet`] is
//! a fixed-size count array indexed by `PawnColor as usize`, so it is `Copy`
//! and compares by value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The number of student colors.
pub const COLOR_COUNT: usize = 5;

/// A student (and professor) color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum PawnColor {
    Yellow = 0,
    Blue = 1,
    Green = 2,
    Red = 3,
    Pink = 4,
}

/// All colors in discriminant order.
pub const ALL_COLORS: [PawnColor; COLOR_COUNT] = [
    PawnColor::Yellow,
    PawnColor::Blue,
    PawnColor::Green,
    PawnColor::Red,
    PawnColor::Pink,
];

impl PawnColor {
    /// Returns the lowercase color name used by the text protocol.
    pub const fn name(self) -> &'static str {
        match self {
            PawnColor::Yellow => "yellow",
            PawnColor::Blue => "blue",
            PawnColor::Green => "green",
            PawnColor::Red => "red",
            PawnColor::Pink => "pink",
        }
    }

    /// Parses a color name, ignoring ASCII case.
    pub fn from_name(s: &str) -> Option<PawnColor> {
        ALL_COLORS
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for PawnColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A multiset of students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StudentSet {
    counts: [u32; COLOR_COUNT],
}

impl StudentSet {
    /// Creates an empty set.
    pub const fn new() -> Self {
        StudentSet { counts: [0; COLOR_COUNT] }
    }

    /// Creates a set from per-color counts in discriminant order.
    pub const fn from_counts(counts: [u32; COLOR_COUNT]) -> Self {
        StudentSet { counts }
    }

    /// Creates a set holding `n` students of every color.
    pub const fn uniform(n: u32) -> Self {
        StudentSet { counts: [n; COLOR_COUNT] }
    }

    /// Creates a set holding `n` students of one color.
    pub fn single(color: PawnColor, n: u32) -> Self {
        let mut set = StudentSet::new();
        set.counts[color as usize] = n;
        set
    }

    pub fn count(&self, color: PawnColor) -> u32 {
        self.counts[color as usize]
    }

    pub fn counts(&self) -> [u32; COLOR_COUNT] {
        self.counts
    }

    /// Total number of students in the set.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn contains(&self, color: PawnColor) -> bool {
        self.count(color) > 0
    }

    /// Adds `n` students of `color`.
    pub fn add(&mut self, color: PawnColor, n: u32) {
        self.counts[color as usize] += n;
    }

    /// Removes one student of `color`. Returns false if there is none.
    pub fn take(&mut self, color: PawnColor) -> bool {
        let slot = &mut self.counts[color as usize];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Removes up to `n` students of `color` and returns how many were removed.
    pub fn take_up_to(&mut self, color: PawnColor, n: u32) -> u32 {
        let slot = &mut self.counts[color as usize];
        let taken = (*slot).min(n);
        *slot -= taken;
        taken
    }

    /// Removes every student and returns them.
    pub fn drain(&mut self) -> StudentSet {
        std::mem::take(self)
    }

    /// Returns the union of two sets.
    pub fn union(&self, other: &StudentSet) -> StudentSet {
        let mut out = *self;
        out.absorb(other);
        out
    }

    /// Adds every student of `other` to this set.
    pub fn absorb(&mut self, other: &StudentSet) {
        for (slot, n) in self.counts.iter_mut().zip(other.counts) {
            *slot += n;
        }
    }

    /// Returns the color of the `index`-th student when the set is laid out
    /// color by color. Used to turn a uniform index into a weighted draw.
    pub fn nth(&self, mut index: u32) -> Option<PawnColor> {
        for color in ALL_COLORS {
            let n = self.count(color);
            if index < n {
                return Some(color);
            }
            index -= n;
        }
        None
    }

    /// Iterates over `(color, count)` pairs with a non-zero count.
    pub fn iter(&self) -> impl Iterator<Item = (PawnColor, u32)> + '_ {
        ALL_COLORS
            .iter()
            .map(move |&c| (c, self.count(c)))
            .filter(|&(_, n)| n > 0)
    }
}

impl fmt::Display for StudentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(c, n)| format!("{}x{}", n, c)).collect();
        if parts.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&parts.join(","))
        }
    }
}
