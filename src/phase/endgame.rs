//! Terminal phase: winners are fixed when it is entered.

use tracing::info;

use crate::board::{PlayerId, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endgame {
    table: Table,
    round: u32,
    winners: Vec<PlayerId>,
}

impl Endgame {
    pub(crate) fn new(table: Table, round: u32) -> Self {
        let winners = compute_winners(&table);
        let names: Vec<String> = winners.iter().map(|&w| table.nickname(w)).collect();
        info!(round, winners = ?names, "game over");
        Endgame { table, round, winners }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn winners(&self) -> &[PlayerId] {
        &self.winners
    }
}

/// Fewest towers left wins; ties go to the most professors; any remaining tie
/// is shared.
pub fn compute_winners(table: &Table) -> Vec<PlayerId> {
    let Some(fewest) = table.boards().iter().map(|b| b.towers).min() else {
        return Vec::new();
    };
    let leaders: Vec<PlayerId> = table
        .boards()
        .iter()
        .filter(|b| b.towers == fewest)
        .map(|b| b.owner)
        .collect();
    let most = leaders
        .iter()
        .map(|&p| table.professor_count(p))
        .max()
        .unwrap_or(0);
    leaders
        .into_iter()
        .filter(|&p| table.professor_count(p) == most)
        .collect()
}
