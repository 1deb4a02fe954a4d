//! Picking a single winner out of a score map.

use serde::{Deserialize, Serialize};

use super::calculator::Influence;
use crate::board::PlayerId;

/// Strategy for turning scores into at most one winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaxExtractor {
    /// The unique maximum; nobody on a tie or an empty map.
    Exclusive,
    /// Like `Exclusive`, but a tie at the maximum goes to `favorite` when it
    /// is one of the tied players.
    Inclusive { favorite: PlayerId },
}

impl MaxExtractor {
    pub fn extract(&self, scores: &Influence) -> Option<PlayerId> {
        let max = *scores.values().max()?;
        let leaders: Vec<PlayerId> = scores
            .iter()
            .filter(|&(_, &score)| score == max)
            .map(|(&player, _)| player)
            .collect();
        match (leaders.as_slice(), self) {
            ([only], _) => Some(*only),
            (_, MaxExtractor::Inclusive { favorite }) if leaders.contains(favorite) => {
                Some(*favorite)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);
    const D: PlayerId = PlayerId(3);

    fn scores(entries: &[(PlayerId, i32)]) -> Influence {
        entries.iter().copied().collect()
    }

    #[test]
    fn exclusive_returns_nothing_on_tie() {
        let s = scores(&[(A, 2), (B, 1), (C, 2)]);
        assert_eq!(MaxExtractor::Exclusive.extract(&s), None);
    }

    #[test]
    fn exclusive_returns_unique_max() {
        let s = scores(&[(A, 2), (B, 1), (C, 2), (D, 3)]);
        assert_eq!(MaxExtractor::Exclusive.extract(&s), Some(D));
    }

    #[test]
    fn exclusive_returns_nothing_on_empty_map() {
        assert_eq!(MaxExtractor::Exclusive.extract(&Influence::new()), None);
    }

    #[test]
    fn inclusive_breaks_tie_for_favorite() {
        let s = scores(&[(A, 2), (B, 1), (C, 2)]);
        assert_eq!(MaxExtractor::Inclusive { favorite: C }.extract(&s), Some(C));
    }

    #[test]
    fn inclusive_ignores_favorite_outside_the_tie() {
        let s = scores(&[(A, 2), (B, 1), (C, 2)]);
        assert_eq!(MaxExtractor::Inclusive { favorite: B }.extract(&s), None);
        let s = scores(&[(A, 3), (B, 1)]);
        assert_eq!(MaxExtractor::Inclusive { favorite: B }.extract(&s), Some(A));
    }
}
