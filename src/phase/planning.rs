//! Planning: every player plays one assistant card.

use tracing::debug;

use super::action::{ActionContext, StudentMove};
use super::Phase;
use crate::board::{PlayerId, Table};
use crate::error::GameError;
use crate::rng::RandomSource;
use crate::turn::{PriorityOrder, SeatingOrder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planning {
    table: Table,
    round: u32,
    order: SeatingOrder,
    /// Value played this round, by seat.
    played: Vec<Option<u8>>,
}

impl Planning {
    /// Opens a planning round: refills the clouds and hands the first play to
    /// `start_seat`.
    pub(crate) fn start(
        mut table: Table,
        round: u32,
        start_seat: usize,
        rng: &mut dyn RandomSource,
    ) -> Result<Planning, GameError> {
        let seats = table.players().len();
        let order = SeatingOrder::new(seats, start_seat)?;
        table.refill_clouds(rng);
        debug!(round, start_seat, bag = table.bag().total(), "planning started");
        Ok(Planning {
            played: vec![None; seats],
            table,
            round,
            order,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// The player expected to play an assistant next.
    pub fn current_player(&self) -> Option<PlayerId> {
        self.order.peek()
    }

    /// Values played so far this round, by seat.
    pub fn played(&self) -> &[Option<u8>] {
        &self.played
    }

    pub fn play_assistant(&self, player: PlayerId, value: u8) -> Result<Phase, GameError> {
        if self.order.peek() != Some(player) {
            return Err(GameError::unauthorized(
                self.table.nickname(player),
                "play an assistant",
            ));
        }
        let board = self
            .table
            .board(player)
            .ok_or_else(|| GameError::precondition(format!("no board for {}", player)))?;
        if !board.has_assistant(value) {
            return Err(GameError::invalid_update(format!(
                "assistant {} is not in hand",
                value
            )));
        }
        let taken = |v: u8| self.played.iter().any(|p| *p == Some(v));
        if taken(value) && !board.hand.iter().all(|a| taken(a.value)) {
            return Err(GameError::invalid_update(format!(
                "assistant {} was already played this round",
                value
            )));
        }

        let mut next = self.clone();
        next.table.board_mut(player)?.play_assistant(value)?;
        next.played[player.seat()] = Some(value);
        next.order.next();
        debug!(player = %player, value, "assistant played");
        if next.order.has_more() {
            return Ok(Phase::Planning(next));
        }

        let order = PriorityOrder::new(&next.played, next.order.start())?;
        match ActionContext::next_turn(next.table, next.round, order) {
            Ok(ctx) => Ok(StudentMove::begin(ctx)),
            Err(_) => Err(GameError::precondition("empty turn order")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Assistant;
    use crate::phase::testing::table_with;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    fn planning(start_seat: usize, rng: &mut SmallRng) -> Planning {
        let table = table_with(&[], rng);
        Planning::start(table, 1, start_seat, rng).unwrap()
    }

    fn next_planning(phase: Phase) -> Planning {
        match phase {
            Phase::Planning(p) => p,
            other => panic!("expected Planning, got {}", other.name()),
        }
    }

    #[test]
    fn start_refills_every_cloud() {
        let mut rng = SmallRng::seed_from_u64(1);
        let table = table_with(&[], &mut rng);
        let bag = table.bag().total();
        let p = Planning::start(table, 1, 0, &mut rng).unwrap();
        assert!(p.table().clouds().iter().all(|c| c.total() == 3));
        assert_eq!(p.table().bag().total(), bag - 6);
        assert_eq!(p.played(), &[None, None]);
    }

    #[test]
    fn start_seat_plays_first() {
        let mut rng = SmallRng::seed_from_u64(2);
        let p = planning(1, &mut rng);
        assert_eq!(p.current_player(), Some(P1));
        assert!(matches!(p.play_assistant(P0, 3), Err(GameError::Unauthorized { .. })));
        let p = next_planning(p.play_assistant(P1, 3).unwrap());
        assert_eq!(p.current_player(), Some(P0));
        assert_eq!(p.played(), &[None, Some(3)]);
    }

    #[test]
    fn taken_value_is_refused_while_others_remain() {
        let mut rng = SmallRng::seed_from_u64(3);
        let p = next_planning(planning(0, &mut rng).play_assistant(P0, 4).unwrap());
        assert!(matches!(p.play_assistant(P1, 4), Err(GameError::InvalidUpdate(_))));
        assert!(matches!(p.play_assistant(P1, 11), Err(GameError::InvalidUpdate(_))));
    }

    #[test]
    fn taken_value_is_allowed_when_every_card_left_is_taken() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut p = planning(0, &mut rng);
        p.table.board_mut(P1).unwrap().hand = Assistant::with_value(4).into_iter().collect();
        let p = next_planning(p.play_assistant(P0, 4).unwrap());
        let next = p.play_assistant(P1, 4).unwrap();
        // Empty entrances skip straight to mother nature. Tied values go to
        // the seat reached first from the start seat.
        assert_eq!(next.name(), "MnMove");
        assert_eq!(next.current_player(), Some(P0));
        let order = next.context().unwrap().order().order().to_vec();
        assert_eq!(order, vec![P0, P1]);
    }

    #[test]
    fn lowest_value_acts_first() {
        let mut rng = SmallRng::seed_from_u64(5);
        let p = next_planning(planning(0, &mut rng).play_assistant(P0, 7).unwrap());
        let next = p.play_assistant(P1, 2).unwrap();
        assert_eq!(next.current_player(), Some(P1));
        assert_eq!(next.round(), Some(1));
        let board = next.table().unwrap().board(P0).unwrap();
        assert_eq!(board.last_played.map(|a| a.value), Some(7));
        assert!(!board.has_assistant(7));
    }
}
