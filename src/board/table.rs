//! The table: every piece of shared game state in one aggregate.
//!
//! A table is never edited while someone else can observe it. Phase
//! operations clone the table of the phase they were called on, edit the
//! clone through the crate-private mutators below, and wrap the result in a
//! new phase.

use serde::Serialize;
use tracing::debug;

use super::color::{PawnColor, StudentSet, ALL_COLORS, COLOR_COUNT};
use super::island::{IslandId, IslandRing};
use super::player::{Player, PlayerBoard, PlayerId};
use crate::character::{Character, CharacterType};
use crate::config::{GameParameters, SEED_STUDENTS_PER_COLOR};
use crate::error::GameError;
use crate::rng::RandomSource;

/// Complete shared state of a match in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    params: GameParameters,
    players: Vec<Player>,
    boards: Vec<PlayerBoard>,
    islands: IslandRing,
    professors: [Option<PlayerId>; COLOR_COUNT],
    bag: StudentSet,
    clouds: Vec<StudentSet>,
    mother_nature: IslandId,
    characters: Vec<Character>,
    coin_supply: u32,
}

impl Table {
    /// Builds a table with empty islands, empty entrances and a full bag.
    /// Mother nature starts on island 0 and no character is in play.
    pub(crate) fn blank(params: GameParameters, players: Vec<Player>) -> Table {
        let boards = players
            .iter()
            .map(|p| {
                PlayerBoard::new(
                    p.id,
                    params.towers_per_player,
                    params.initial_coins,
                    params.entrance_size,
                    params.hall_capacity,
                )
            })
            .collect();
        let coin_supply = params
            .coin_supply
            .saturating_sub(params.initial_coins * players.len() as u32);
        Table {
            islands: IslandRing::new(params.island_count),
            professors: [None; COLOR_COUNT],
            bag: StudentSet::uniform(params.students_per_color),
            clouds: vec![StudentSet::new(); params.cloud_count],
            mother_nature: IslandId(0),
            characters: Vec::new(),
            coin_supply,
            boards,
            players,
            params,
        }
    }

    /// Deals a fresh game: places mother nature, seeds the islands, fills the
    /// bag and the entrances, and draws the characters in play.
    pub(crate) fn setup(
        params: GameParameters,
        players: Vec<Player>,
        rng: &mut dyn RandomSource,
    ) -> Table {
        let mut table = Table::blank(params, players);
        let n = table.islands.len();
        table.mother_nature = IslandId(rng.draw_one(n) as u8);
        let opposite = table.islands.opposite(table.mother_nature);

        let seed = SEED_STUDENTS_PER_COLOR.min(table.params.students_per_color);
        let mut pool = StudentSet::uniform(seed);
        table.bag = StudentSet::uniform(table.params.students_per_color - seed);
        for i in 0..n {
            let id = IslandId(i as u8);
            if id == table.mother_nature || id == opposite {
                continue;
            }
            if let Some(color) = draw_from(&mut pool, rng) {
                table.islands.add_student(id, color);
            }
        }
        table.bag.absorb(&pool);

        for seat in 0..table.boards.len() {
            let size = table.params.entrance_size;
            let drawn = table.draw_students(size, rng);
            table.boards[seat].entrance.absorb(&drawn);
        }

        let kinds: Vec<CharacterType> = match &table.params.characters {
            Some(list) => list.clone(),
            None => rng
                .pick_distinct(CharacterType::ALL.len(), table.params.characters_per_game)
                .into_iter()
                .map(|i| CharacterType::ALL[i])
                .collect(),
        };
        for kind in kinds {
            let card = Character::new(kind).prepare(&mut table, rng);
            table.characters.push(card);
        }
        table
    }

    pub fn params(&self) -> &GameParameters {
        &self.params
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.seat())
    }

    pub fn player_by_name(&self, nickname: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.nickname == nickname)
    }

    /// Nickname of `id`, or its seat label when unknown.
    pub fn nickname(&self, id: PlayerId) -> String {
        self.player(id)
            .map(|p| p.nickname.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn boards(&self) -> &[PlayerBoard] {
        &self.boards
    }

    pub fn board(&self, id: PlayerId) -> Option<&PlayerBoard> {
        self.boards.get(id.seat())
    }

    pub fn islands(&self) -> &IslandRing {
        &self.islands
    }

    pub fn professor(&self, color: PawnColor) -> Option<PlayerId> {
        self.professors[color as usize]
    }

    pub fn professors(&self) -> [Option<PlayerId>; COLOR_COUNT] {
        self.professors
    }

    /// Number of professors owned by `player`.
    pub fn professor_count(&self, player: PlayerId) -> usize {
        self.professors.iter().filter(|p| **p == Some(player)).count()
    }

    pub fn bag(&self) -> StudentSet {
        self.bag
    }

    pub fn clouds(&self) -> &[StudentSet] {
        &self.clouds
    }

    pub fn mother_nature(&self) -> IslandId {
        self.mother_nature
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, kind: CharacterType) -> Option<&Character> {
        self.characters.iter().find(|c| c.kind() == kind)
    }

    pub fn coin_supply(&self) -> u32 {
        self.coin_supply
    }

    pub(crate) fn board_mut(&mut self, id: PlayerId) -> Result<&mut PlayerBoard, GameError> {
        self.boards
            .get_mut(id.seat())
            .ok_or_else(|| GameError::precondition(format!("no board for {}", id)))
    }

    pub(crate) fn islands_mut(&mut self) -> &mut IslandRing {
        &mut self.islands
    }

    pub(crate) fn set_professor(&mut self, color: PawnColor, owner: Option<PlayerId>) {
        self.professors[color as usize] = owner;
    }

    pub(crate) fn bag_mut(&mut self) -> &mut StudentSet {
        &mut self.bag
    }

    pub(crate) fn clouds_mut(&mut self) -> &mut Vec<StudentSet> {
        &mut self.clouds
    }

    pub(crate) fn set_mother_nature(&mut self, island: IslandId) {
        self.mother_nature = island;
    }

    pub(crate) fn character_mut(&mut self, kind: CharacterType) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.kind() == kind)
    }

    pub(crate) fn push_character(&mut self, card: Character) {
        self.characters.push(card);
    }

    /// Draws one student from the bag.
    pub(crate) fn draw_student(&mut self, rng: &mut dyn RandomSource) -> Option<PawnColor> {
        draw_from(&mut self.bag, rng)
    }

    /// Draws up to `n` students from the bag; fewer if it runs out.
    pub(crate) fn draw_students(&mut self, n: u32, rng: &mut dyn RandomSource) -> StudentSet {
        let mut drawn = StudentSet::new();
        for _ in 0..n {
            match self.draw_student(rng) {
                Some(color) => drawn.add(color, 1),
                None => break,
            }
        }
        drawn
    }

    /// Tops every cloud up to the configured size from the bag.
    pub(crate) fn refill_clouds(&mut self, rng: &mut dyn RandomSource) {
        let size = self.params.cloud_size;
        for i in 0..self.clouds.len() {
            let missing = size.saturating_sub(self.clouds[i].total());
            let drawn = self.draw_students(missing, rng);
            self.clouds[i].absorb(&drawn);
        }
    }

    /// Pays one coin from the supply to `player`, if the supply has any.
    pub(crate) fn award_coin(&mut self, player: PlayerId) -> Result<bool, GameError> {
        if self.coin_supply == 0 {
            return Ok(false);
        }
        self.board_mut(player)?.coins += 1;
        self.coin_supply -= 1;
        Ok(true)
    }

    /// Moves `amount` coins from `player` back to the supply.
    pub(crate) fn charge(&mut self, player: PlayerId, amount: u32) -> Result<(), GameError> {
        let board = self.board_mut(player)?;
        if board.coins < amount {
            return Err(GameError::invalid_update(format!(
                "not enough coins: {} needed, {} available",
                amount, board.coins
            )));
        }
        board.coins -= amount;
        self.coin_supply += amount;
        Ok(())
    }

    /// Moves towers between boards after `winner` conquers a group of `count`
    /// islands from `loser`.
    ///
    /// A winner short of towers places what they have and ends at zero; the
    /// group still counts as fully towered for influence. Zero towers ends
    /// the match at the close of the round (see `phase::game_over`).
    pub(crate) fn exchange_towers(
        &mut self,
        winner: PlayerId,
        loser: Option<PlayerId>,
        count: u32,
    ) -> Result<(), GameError> {
        if let Some(loser) = loser {
            let board = self.board_mut(loser)?;
            board.towers += count;
        }
        let board = self.board_mut(winner)?;
        if board.towers < count {
            debug!(player = %winner, towers = board.towers, count, "out of towers");
        }
        board.towers = board.towers.saturating_sub(count);
        Ok(())
    }

    /// Total students of each color in every container on the table.
    pub fn student_census(&self) -> StudentSet {
        let mut total = self.bag;
        for island in self.islands.islands() {
            total.absorb(&island.own_students());
        }
        for cloud in &self.clouds {
            total.absorb(cloud);
        }
        for board in &self.boards {
            total.absorb(&board.entrance);
            total.absorb(&board.hall);
        }
        for card in &self.characters {
            total.absorb(&card.students());
        }
        total
    }

    /// Checks the structural invariants of the table.
    pub fn check_invariants(&self) -> Result<(), GameError> {
        if self.boards.len() != self.players.len() {
            return Err(GameError::precondition("one board per player is required"));
        }
        for (i, (p, b)) in self.players.iter().zip(&self.boards).enumerate() {
            if p.id.seat() != i || b.owner != p.id {
                return Err(GameError::precondition(format!("seat {} is inconsistent", i)));
            }
        }
        let census = self.student_census();
        for color in ALL_COLORS {
            if census.count(color) != self.params.students_per_color {
                return Err(GameError::precondition(format!(
                    "{} students are not conserved",
                    color
                )));
            }
        }
        Ok(())
    }
}

fn draw_from(set: &mut StudentSet, rng: &mut dyn RandomSource) -> Option<PawnColor> {
    let total = set.total();
    if total == 0 {
        return None;
    }
    let color = set.nth(rng.draw_one(total as usize) as u32)?;
    set.take(color);
    Some(color)
}
