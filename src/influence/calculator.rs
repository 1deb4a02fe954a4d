//! Influence calculation.
//!
//! The base calculator scores every player on one island group; modifiers
//! installed by characters are folded over its result left to right. Every
//! step works on `Option<Influence>`: a locked group yields `None`, which
//! tells the caller to pop a lock instead of resolving, and every modifier
//! passes `None` through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{IslandId, PawnColor, PlayerId, Table, ALL_COLORS};

/// Score per player. Players with a zero score are absent.
pub type Influence = BTreeMap<PlayerId, i32>;

/// A temporary change to how influence is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfluenceModifier {
    /// Towers do not count.
    IgnoreTowers,
    /// Students of this color count for nobody.
    IgnoreColor(PawnColor),
    /// The player gets a flat bonus, even with no base influence. A total of
    /// zero or less leaves the player out, like any other zero score.
    ExtraPoints { player: PlayerId, points: i32 },
}

/// Scores each player on the group of `island`: students of every color
/// whose professor they own, plus the group's towers for its controller.
pub fn base_influence(table: &Table, island: IslandId) -> Option<Influence> {
    let ring = table.islands();
    if ring.is_locked(island) {
        return None;
    }
    let students = ring.students(island);
    let mut scores = Influence::new();
    for color in ALL_COLORS {
        if let Some(owner) = table.professor(color) {
            *scores.entry(owner).or_insert(0) += students.count(color) as i32;
        }
    }
    if let Some(controller) = ring.controller(island) {
        *scores.entry(controller).or_insert(0) += ring.tower_count(island) as i32;
    }
    scores.retain(|_, score| *score != 0);
    Some(scores)
}

impl InfluenceModifier {
    /// Applies this modifier to the result of the previous step.
    pub fn apply(
        &self,
        table: &Table,
        island: IslandId,
        current: Option<Influence>,
    ) -> Option<Influence> {
        let mut scores = current?;
        let ring = table.islands();
        match *self {
            InfluenceModifier::IgnoreTowers => {
                if let Some(controller) = ring.controller(island) {
                    subtract(&mut scores, controller, ring.tower_count(island) as i32);
                }
            }
            InfluenceModifier::IgnoreColor(color) => {
                if let Some(owner) = table.professor(color) {
                    subtract(&mut scores, owner, ring.students(island).count(color) as i32);
                }
            }
            InfluenceModifier::ExtraPoints { player, points } => {
                let score = scores.entry(player).or_insert(0);
                *score += points;
                if *score <= 0 {
                    scores.remove(&player);
                }
            }
        }
        Some(scores)
    }
}

fn subtract(scores: &mut Influence, player: PlayerId, amount: i32) {
    if amount == 0 {
        return;
    }
    if let Some(score) = scores.get_mut(&player) {
        *score -= amount;
        if *score <= 0 {
            scores.remove(&player);
        }
    }
}

/// Runs the base calculator followed by `modifiers`, in order.
pub fn compute_influence(
    table: &Table,
    island: IslandId,
    modifiers: &[InfluenceModifier],
) -> Option<Influence> {
    modifiers
        .iter()
        .fold(base_influence(table, island), |acc, m| m.apply(table, island, acc))
}
