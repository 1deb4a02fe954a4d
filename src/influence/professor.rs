//! Professor assignment.
//!
//! Professors go to the player with the most students of their color in the
//! hall. The same extractors used for islands decide ties: by default the
//! current owner is favored, so a challenger needs strictly more students.
//! When the extractor names nobody, an owner tied at the top keeps the
//! professor; an owner below the top loses it.

use tracing::debug;

use super::calculator::Influence;
use super::extractor::MaxExtractor;
use crate::board::{PawnColor, PlayerId, Table, ALL_COLORS};

/// Hall counts of `color` per player, without zero entries.
pub fn hall_scores(table: &Table, color: PawnColor) -> Influence {
    table
        .boards()
        .iter()
        .map(|b| (b.owner, b.hall.count(color) as i32))
        .filter(|&(_, n)| n > 0)
        .collect()
}

/// Recomputes the owner of `color`'s professor. `favor` overrides the default
/// extractor (see the Farmer). Returns the new owner.
pub(crate) fn reassign_professor(
    table: &mut Table,
    color: PawnColor,
    favor: Option<MaxExtractor>,
) -> Option<PlayerId> {
    let scores = hall_scores(table, color);
    let current = table.professor(color);
    let extractor = favor.unwrap_or(match current {
        Some(owner) => MaxExtractor::Inclusive { favorite: owner },
        None => MaxExtractor::Exclusive,
    });
    let top = scores.values().max();
    let owner = extractor
        .extract(&scores)
        .or_else(|| current.filter(|owner| top.is_some() && scores.get(owner) == top));
    if owner != current {
        debug!(?color, from = ?current, to = ?owner, "professor moved");
    }
    table.set_professor(color, owner);
    owner
}

/// Recomputes every professor.
pub(crate) fn reassign_all(table: &mut Table, favor: Option<MaxExtractor>) {
    for color in ALL_COLORS {
        reassign_professor(table, color, favor);
    }
}
