//! Turn-order iterators.
//!
//! Both iterators walk the seated players exactly once and then stop. They
//! are plain cursors (an ordering plus a position) so a phase can store one by
//! value and hand a copy to the next phase.

use crate::board::PlayerId;
use crate::error::GameError;

/// Yields every seat once, starting at a given seat and wrapping at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatingOrder {
    seats: usize,
    start: usize,
    yielded: usize,
}

impl SeatingOrder {
    pub fn new(seats: usize, start: usize) -> Result<Self, GameError> {
        if seats == 0 {
            return Err(GameError::precondition("no seated players"));
        }
        if start >= seats {
            return Err(GameError::precondition(format!(
                "start seat {} out of range for {} seats",
                start, seats
            )));
        }
        Ok(SeatingOrder { seats, start, yielded: 0 })
    }

    pub fn has_more(&self) -> bool {
        self.yielded < self.seats
    }

    /// The seat the walk started from.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The seat the next call to `next` will return, without consuming it.
    pub fn peek(&self) -> Option<PlayerId> {
        self.has_more()
            .then(|| PlayerId(((self.start + self.yielded) % self.seats) as u8))
    }
}

impl Iterator for SeatingOrder {
    type Item = PlayerId;

    fn next(&mut self) -> Option<PlayerId> {
        let seat = self.peek()?;
        self.yielded += 1;
        Some(seat)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.seats - self.yielded;
        (left, Some(left))
    }
}

impl ExactSizeIterator for SeatingOrder {}

/// Yields seats in ascending order of the value each player played this
/// round. Equal values go to whichever seat comes first when scanning forward
/// (cyclically) from the start seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOrder {
    order: Vec<PlayerId>,
    pos: usize,
}

impl PriorityOrder {
    /// `values[seat]` is the value played by that seat this round.
    pub fn new(values: &[Option<u8>], start: usize) -> Result<Self, GameError> {
        let scan = SeatingOrder::new(values.len(), start)?;
        let mut keyed = Vec::with_capacity(values.len());
        for seat in scan {
            let value = values[seat.seat()].ok_or_else(|| {
                GameError::precondition(format!("{} has not played an assistant", seat))
            })?;
            keyed.push((value, seat));
        }
        // Stable: ties keep scan order.
        keyed.sort_by_key(|&(value, _)| value);
        Ok(PriorityOrder {
            order: keyed.into_iter().map(|(_, seat)| seat).collect(),
            pos: 0,
        })
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.order.len()
    }

    /// The first player this iterator yields, once it has been consumed.
    pub fn first_consumed(&self) -> Option<PlayerId> {
        if self.pos > 0 {
            self.order.first().copied()
        } else {
            None
        }
    }

    /// The player most recently yielded.
    pub fn current(&self) -> Option<PlayerId> {
        self.pos.checked_sub(1).map(|i| self.order[i])
    }

    /// The full ordering, consumed or not.
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }
}

impl Iterator for PriorityOrder {
    type Item = PlayerId;

    fn next(&mut self) -> Option<PlayerId> {
        let seat = self.order.get(self.pos).copied()?;
        self.pos += 1;
        Some(seat)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.order.len() - self.pos;
        (left, Some(left))
    }
}

impl ExactSizeIterator for PriorityOrder {}
