//! The three action phases of a player's turn.
//!
//! StudentMove → MnMove → CloudPick run once per player, in the order fixed
//! by the assistants played during planning. They share an
//! [`ActionContext`]: the table, the round's turn order and the
//! [`TurnEffects`] installed by characters, which is carried unchanged from
//! one action phase to the next and reset when the next player starts.

use serde::Serialize;
use tracing::debug;

use super::endgame::Endgame;
use super::planning::Planning;
use super::Phase;
use crate::board::{IslandId, PawnColor, PlayerId, Table};
use crate::character::CharacterType;
use crate::error::GameError;
use crate::influence::professor::reassign_professor;
use crate::influence::{compute_influence, InfluenceModifier, MaxExtractor};
use crate::rng::RandomSource;
use crate::turn::PriorityOrder;

/// Temporary rule changes for the current player's turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnEffects {
    pub character_played: bool,
    pub influence_modifiers: Vec<InfluenceModifier>,
    pub professor_extractor: Option<MaxExtractor>,
    pub bonus_steps: u32,
}

/// Outcome of resolving influence on one island group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The group was locked; one lock went back to its card.
    Blocked,
    /// Nobody takes the group (tie, no influence, or already the owner).
    Unchanged,
    /// The group changed hands.
    Conquered { winner: PlayerId, previous: Option<PlayerId> },
}

/// State shared by the action phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    table: Table,
    round: u32,
    order: PriorityOrder,
    current: PlayerId,
    effects: TurnEffects,
}

impl ActionContext {
    /// Starts the turn of the next player in `order`. Hands the table and the
    /// exhausted order back when the round is over.
    pub(crate) fn next_turn(
        table: Table,
        round: u32,
        mut order: PriorityOrder,
    ) -> Result<Self, (Table, PriorityOrder)> {
        match order.next() {
            Some(current) => Ok(ActionContext {
                table,
                round,
                order,
                current,
                effects: TurnEffects::default(),
            }),
            None => Err((table, order)),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn order(&self) -> &PriorityOrder {
        &self.order
    }

    pub fn current_player(&self) -> PlayerId {
        self.current
    }

    pub fn effects(&self) -> &TurnEffects {
        &self.effects
    }

    pub(crate) fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub(crate) fn effects_mut(&mut self) -> &mut TurnEffects {
        &mut self.effects
    }

    /// Fails unless `player` is the one whose turn it is.
    pub(crate) fn authorize(
        &self,
        player: PlayerId,
        action: &'static str,
    ) -> Result<(), GameError> {
        if player != self.current {
            return Err(GameError::unauthorized(self.table.nickname(player), action));
        }
        Ok(())
    }

    /// Puts one student in `player`'s hall, paying a coin on every third seat
    /// of the row and re-evaluating that color's professor.
    pub(crate) fn place_in_hall(
        &mut self,
        player: PlayerId,
        color: PawnColor,
    ) -> Result<(), GameError> {
        let count = self.table.board_mut(player)?.add_to_hall(color)?;
        if count % 3 == 0 {
            self.table.award_coin(player)?;
        }
        reassign_professor(&mut self.table, color, self.effects.professor_extractor);
        Ok(())
    }

    /// Resolves influence on the group of `island`, exchanging towers and
    /// scrubbing the ring on conquest.
    pub(crate) fn resolve_island(&mut self, island: IslandId) -> Result<Resolution, GameError> {
        let root = self.table.islands().root(island);
        let scores = match compute_influence(&self.table, root, &self.effects.influence_modifiers) {
            Some(scores) => scores,
            None => {
                self.table.islands_mut().pop_lock(root);
                if let Some(card) = self.table.character_mut(CharacterType::Herbalist) {
                    let locks = card.locks() + 1;
                    card.set_locks(locks);
                }
                debug!(island = %root, "influence blocked by a lock");
                return Ok(Resolution::Blocked);
            }
        };
        let previous = self.table.islands().controller(root);
        let winner = match MaxExtractor::Exclusive.extract(&scores) {
            Some(w) if Some(w) != previous => w,
            _ => return Ok(Resolution::Unchanged),
        };
        let count = self.table.islands().group_size(root);
        self.table.exchange_towers(winner, previous, count)?;
        self.table.islands_mut().set_controller(root, winner);
        let merges = self.table.islands_mut().scrub_in_place();
        debug!(
            island = %root,
            winner = %winner,
            groups = self.table.islands().group_count(),
            merges,
            "island conquered"
        );
        Ok(Resolution::Conquered { winner, previous })
    }
}

/// The current player moves students out of their entrance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentMove {
    ctx: ActionContext,
    moved: u32,
    quota: u32,
}

impl StudentMove {
    /// Opens the student move of a new turn. A player with an empty entrance
    /// goes straight to moving mother nature.
    pub(crate) fn begin(ctx: ActionContext) -> Phase {
        let entrance = ctx
            .table
            .board(ctx.current)
            .map(|b| b.entrance.total())
            .unwrap_or(0);
        let quota = ctx.table.params().students_per_turn.min(entrance);
        debug!(player = %ctx.current, round = ctx.round, quota, "turn started");
        if quota == 0 {
            return Phase::MnMove(MnMove::new(ctx));
        }
        Phase::StudentMove(StudentMove { ctx, moved: 0, quota })
    }

    pub(crate) fn with_context(&self, ctx: ActionContext) -> Self {
        StudentMove { ctx, moved: self.moved, quota: self.quota }
    }

    pub fn context(&self) -> &ActionContext {
        &self.ctx
    }

    pub fn moved(&self) -> u32 {
        self.moved
    }

    /// Students the player still has to move this turn.
    pub fn remaining(&self) -> u32 {
        self.quota - self.moved
    }

    pub fn move_student_to_hall(
        &self,
        player: PlayerId,
        color: PawnColor,
    ) -> Result<Phase, GameError> {
        self.ctx.authorize(player, "move a student")?;
        let mut ctx = self.ctx.clone();
        take_from_entrance(&mut ctx, player, color)?;
        ctx.place_in_hall(player, color)?;
        Ok(self.advance(ctx))
    }

    pub fn move_student_to_island(
        &self,
        player: PlayerId,
        color: PawnColor,
        island: IslandId,
    ) -> Result<Phase, GameError> {
        self.ctx.authorize(player, "move a student")?;
        if !self.ctx.table.islands().contains(island) {
            return Err(GameError::invalid_update(format!("no island {}", island)));
        }
        let mut ctx = self.ctx.clone();
        take_from_entrance(&mut ctx, player, color)?;
        ctx.table.islands_mut().add_student(island, color);
        Ok(self.advance(ctx))
    }

    fn advance(&self, ctx: ActionContext) -> Phase {
        let moved = self.moved + 1;
        if moved < self.quota {
            return Phase::StudentMove(StudentMove { ctx, moved, quota: self.quota });
        }
        debug!(player = %ctx.current, "students moved");
        Phase::MnMove(MnMove::new(ctx))
    }
}

fn take_from_entrance(
    ctx: &mut ActionContext,
    player: PlayerId,
    color: PawnColor,
) -> Result<(), GameError> {
    let board = ctx.table.board_mut(player)?;
    if !board.entrance.take(color) {
        return Err(GameError::invalid_update(format!("no {} student in the entrance", color)));
    }
    Ok(())
}

/// The current player moves mother nature and resolves influence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MnMove {
    ctx: ActionContext,
}

impl MnMove {
    pub(crate) fn new(ctx: ActionContext) -> Self {
        MnMove { ctx }
    }

    pub(crate) fn with_context(&self, ctx: ActionContext) -> Self {
        MnMove { ctx }
    }

    pub fn context(&self) -> &ActionContext {
        &self.ctx
    }

    /// Largest number of groups mother nature may move this turn.
    pub fn max_steps(&self) -> u32 {
        let card = self
            .ctx
            .table
            .board(self.ctx.current)
            .and_then(|b| b.last_played)
            .map(|a| u32::from(a.steps))
            .unwrap_or(0);
        card + self.ctx.effects.bonus_steps
    }

    pub fn move_mother_nature(&self, player: PlayerId, steps: u32) -> Result<Phase, GameError> {
        self.ctx.authorize(player, "move mother nature")?;
        let max = self.max_steps();
        if steps == 0 || steps > max {
            return Err(GameError::invalid_update(format!(
                "mother nature can move 1 to {} steps, not {}",
                max, steps
            )));
        }
        let mut ctx = self.ctx.clone();
        let landing = ctx.table.islands().advance(ctx.table.mother_nature(), steps);
        ctx.table.set_mother_nature(landing);
        let outcome = ctx.resolve_island(landing)?;
        debug!(player = %player, island = %landing, ?outcome, "mother nature moved");
        Ok(Phase::CloudPick(CloudPick { ctx }))
    }
}

/// The current player refills their entrance from a cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudPick {
    ctx: ActionContext,
}

impl CloudPick {
    pub(crate) fn with_context(&self, ctx: ActionContext) -> Self {
        CloudPick { ctx }
    }

    pub fn context(&self) -> &ActionContext {
        &self.ctx
    }

    pub fn pick_cloud(
        &self,
        player: PlayerId,
        cloud: usize,
        rng: &mut dyn RandomSource,
    ) -> Result<Phase, GameError> {
        self.ctx.authorize(player, "pick a cloud")?;
        let clouds = self.ctx.table.clouds();
        let chosen = clouds
            .get(cloud)
            .ok_or_else(|| GameError::invalid_update(format!("no cloud {}", cloud)))?;
        if chosen.is_empty() && clouds.iter().any(|c| !c.is_empty()) {
            return Err(GameError::invalid_update(format!("cloud {} is empty", cloud)));
        }

        let mut ctx = self.ctx.clone();
        let students = ctx.table.clouds_mut()[cloud].drain();
        ctx.table.board_mut(player)?.fill_entrance(&students)?;

        let ActionContext { table, round, order, .. } = ctx;
        match ActionContext::next_turn(table, round, order) {
            Ok(next) => Ok(StudentMove::begin(next)),
            Err((table, order)) => end_round(table, round, &order, rng),
        }
    }
}

/// True when the match must end after the current round.
pub fn game_over(table: &Table) -> bool {
    table.bag().is_empty()
        || table.boards().iter().any(|b| b.hand.is_empty() || b.towers == 0)
        || table.islands().group_count() <= 3
}

fn end_round(
    table: Table,
    round: u32,
    order: &PriorityOrder,
    rng: &mut dyn RandomSource,
) -> Result<Phase, GameError> {
    if game_over(&table) {
        return Ok(Phase::Endgame(Endgame::new(table, round)));
    }
    let start = order.first_consumed().map(|p| p.seat()).unwrap_or(0);
    debug!(round, next_start = start, "round finished");
    Ok(Phase::Planning(Planning::start(table, round + 1, start, rng)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::StudentSet;
    use crate::phase::testing::{context, table_with};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    /// Plays out the rest of a round in which nobody has students to move:
    /// each player moves mother nature one group and takes cloud 0.
    fn finish_round(mut phase: Phase, order: [PlayerId; 2], rng: &mut SmallRng) -> Phase {
        for player in order {
            phase = phase.move_mother_nature(player, 1).unwrap();
            phase = phase.pick_cloud(player, 0, rng).unwrap();
        }
        phase
    }

    #[test]
    fn empty_entrance_skips_student_move() {
        let mut rng = SmallRng::seed_from_u64(1);
        let phase = StudentMove::begin(context(table_with(&[], &mut rng), [1, 2]));
        assert_eq!(phase.name(), "MnMove");
        assert_eq!(phase.current_player(), Some(P0));
    }

    #[test]
    fn hall_move_pays_on_the_third_seat() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut table = table_with(&[], &mut rng);
        {
            let board = table.board_mut(P0).unwrap();
            board.entrance = StudentSet::single(PawnColor::Red, 3);
            board.hall = StudentSet::single(PawnColor::Red, 2);
        }
        let coins = table.board(P0).unwrap().coins;
        let phase = StudentMove::begin(context(table, [1, 2]));
        let Phase::StudentMove(p) = &phase else { panic!("{}", phase.name()) };
        assert_eq!(p.remaining(), 3);

        let next = p.move_student_to_hall(P0, PawnColor::Red).unwrap();
        let table = next.table().unwrap();
        assert_eq!(table.board(P0).unwrap().coins, coins + 1);
        assert_eq!(table.professor(PawnColor::Red), Some(P0));
        let Phase::StudentMove(p) = &next else { panic!("{}", next.name()) };
        assert_eq!(p.remaining(), 2);
        assert!(matches!(
            p.move_student_to_hall(P1, PawnColor::Red),
            Err(GameError::Unauthorized { .. })
        ));
    }

    #[test]
    fn conquest_exchanges_towers_and_merges() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut table = table_with(&[], &mut rng);
        let ring = table.islands_mut();
        ring.add_student(IslandId(1), PawnColor::Red);
        ring.add_student(IslandId(1), PawnColor::Red);
        ring.set_controller(IslandId(1), P1);
        ring.set_controller(IslandId(2), P0);
        table.board_mut(P0).unwrap().towers -= 1;
        table.board_mut(P1).unwrap().towers -= 1;
        table.set_professor(PawnColor::Red, Some(P0));

        let phase = MnMove::new(context(table, [1, 2])).move_mother_nature(P0, 1).unwrap();
        assert_eq!(phase.name(), "CloudPick");
        let table = phase.table().unwrap();
        assert_eq!(table.mother_nature(), IslandId(1));
        assert_eq!(table.board(P0).unwrap().towers, 6);
        assert_eq!(table.board(P1).unwrap().towers, 8);
        assert_eq!(table.islands().root(IslandId(1)), IslandId(2));
        assert_eq!(table.islands().controller(IslandId(1)), Some(P0));
        assert_eq!(table.islands().group_count(), 11);
    }

    #[test]
    fn mother_nature_respects_the_step_budget() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mn = MnMove::new(context(table_with(&[], &mut rng), [1, 2]));
        assert_eq!(mn.max_steps(), 1);
        assert!(matches!(mn.move_mother_nature(P0, 2), Err(GameError::InvalidUpdate(_))));
        assert!(matches!(mn.move_mother_nature(P0, 0), Err(GameError::InvalidUpdate(_))));
    }

    #[test]
    fn non_empty_cloud_must_be_taken_first() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut table = table_with(&[], &mut rng);
        table.clouds_mut()[1] = StudentSet::single(PawnColor::Blue, 3);
        let pick = CloudPick { ctx: context(table, [1, 2]) };
        assert!(matches!(pick.pick_cloud(P0, 0, &mut rng), Err(GameError::InvalidUpdate(_))));
        assert!(matches!(pick.pick_cloud(P0, 2, &mut rng), Err(GameError::InvalidUpdate(_))));
        let next = pick.pick_cloud(P0, 1, &mut rng).unwrap();
        let table = next.table().unwrap();
        assert_eq!(table.board(P0).unwrap().entrance.count(PawnColor::Blue), 3);
        assert!(table.clouds()[1].is_empty());
        assert_eq!(next.current_player(), Some(P1));
    }

    #[test]
    fn empty_bag_after_the_last_cloud_ends_the_match() {
        let mut rng = SmallRng::seed_from_u64(6);
        let mut table = table_with(&[], &mut rng);
        *table.bag_mut() = StudentSet::new();
        let phase = StudentMove::begin(context(table, [1, 2]));
        let phase = finish_round(phase, [P0, P1], &mut rng);
        assert_eq!(phase.name(), "Endgame");
        assert_eq!(phase.round(), Some(1));
    }

    #[test]
    fn round_wraps_to_planning_from_the_first_player() {
        let mut rng = SmallRng::seed_from_u64(7);
        let table = table_with(&[], &mut rng);
        let bag = table.bag().total();
        let phase = StudentMove::begin(context(table, [5, 2]));
        assert_eq!(phase.current_player(), Some(P1));
        let phase = finish_round(phase, [P1, P0], &mut rng);

        let Phase::Planning(planning) = &phase else { panic!("{}", phase.name()) };
        assert_eq!(planning.round(), 2);
        assert_eq!(planning.current_player(), Some(P1));
        let table = planning.table();
        assert!(table.clouds().iter().all(|c| c.total() == 3));
        assert_eq!(table.bag().total(), bag - 6);
    }

    #[test]
    fn game_over_checks_each_end_condition() {
        let mut rng = SmallRng::seed_from_u64(8);
        let table = table_with(&[], &mut rng);
        assert!(!game_over(&table));

        let mut empty_hand = table.clone();
        empty_hand.board_mut(P1).unwrap().hand.clear();
        assert!(game_over(&empty_hand));

        let mut no_towers = table.clone();
        no_towers.board_mut(P0).unwrap().towers = 0;
        assert!(game_over(&no_towers));

        let mut empty_bag = table;
        *empty_bag.bag_mut() = StudentSet::new();
        assert!(game_over(&empty_bag));
    }
}
