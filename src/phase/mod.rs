//! The game as a chain of immutable phases.
//!
//! Every operation is called on a phase and returns the phase that follows
//! it. The receiver is never modified, so a rejected operation leaves the
//! caller holding a valid phase.
//!
//! ```text
//! Lobby → Prepare → Planning → StudentMove → MnMove → CloudPick ─┐
//!                      ▲            ▲                             │
//!                      │            └──── next player ────────────┤
//!                      └──────────── next round ──────────────────┤
//!                                           Endgame ◄─────────────┘
//! ```

pub mod action;
pub mod endgame;
pub mod lobby;
pub mod planning;
pub mod update;

use tracing::debug;

pub use action::{game_over, ActionContext, CloudPick, MnMove, Resolution, StudentMove, TurnEffects};
pub use endgame::{compute_winners, Endgame};
pub use lobby::{Lobby, Prepare};
pub use planning::Planning;
pub use update::{EntityUpdate, IslandView, UpdateRecord};

use crate::board::{IslandId, Mage, PawnColor, PlayerId, Table};
use crate::character::{CharacterStep, CharacterType};
use crate::config::GameParameters;
use crate::error::{ConfigError, GameError};
use crate::rng::RandomSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Lobby(Lobby),
    Prepare(Prepare),
    Planning(Planning),
    StudentMove(StudentMove),
    MnMove(MnMove),
    CloudPick(CloudPick),
    Endgame(Endgame),
}

impl Phase {
    /// Opens a new match. The parameters are validated first.
    pub fn new(params: GameParameters) -> Result<Phase, ConfigError> {
        Ok(Phase::Lobby(Lobby::new(params)?))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Lobby(_) => "Lobby",
            Phase::Prepare(_) => "Prepare",
            Phase::Planning(_) => "Planning",
            Phase::StudentMove(_) => "StudentMove",
            Phase::MnMove(_) => "MnMove",
            Phase::CloudPick(_) => "CloudPick",
            Phase::Endgame(_) => "Endgame",
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, Phase::Endgame(_))
    }

    /// Shared state of the current turn, in the three action phases.
    pub fn context(&self) -> Option<&ActionContext> {
        match self {
            Phase::StudentMove(p) => Some(p.context()),
            Phase::MnMove(p) => Some(p.context()),
            Phase::CloudPick(p) => Some(p.context()),
            _ => None,
        }
    }

    /// The table, once the game has been dealt.
    pub fn table(&self) -> Option<&Table> {
        match self {
            Phase::Lobby(_) | Phase::Prepare(_) => None,
            Phase::Planning(p) => Some(p.table()),
            Phase::Endgame(p) => Some(p.table()),
            _ => self.context().map(ActionContext::table),
        }
    }

    pub fn params(&self) -> &GameParameters {
        match self {
            Phase::Lobby(p) => p.params(),
            Phase::Prepare(p) => p.params(),
            Phase::Planning(p) => p.table().params(),
            Phase::StudentMove(p) => p.context().table().params(),
            Phase::MnMove(p) => p.context().table().params(),
            Phase::CloudPick(p) => p.context().table().params(),
            Phase::Endgame(p) => p.table().params(),
        }
    }

    pub fn round(&self) -> Option<u32> {
        match self {
            Phase::Planning(p) => Some(p.round()),
            Phase::Endgame(p) => Some(p.round()),
            _ => self.context().map(ActionContext::round),
        }
    }

    /// The player expected to act next, when the phase has a single one.
    pub fn current_player(&self) -> Option<PlayerId> {
        match self {
            Phase::Planning(p) => p.current_player(),
            _ => self.context().map(ActionContext::current_player),
        }
    }

    pub fn winners(&self) -> Option<&[PlayerId]> {
        match self {
            Phase::Endgame(end) => Some(end.winners()),
            _ => None,
        }
    }

    /// Resolves a nickname to a seat.
    pub fn player_id(&self, nickname: &str) -> Result<PlayerId, GameError> {
        let found = match self {
            Phase::Lobby(_) => None,
            Phase::Prepare(p) => p.players().iter().find(|p| p.nickname == nickname).map(|p| p.id),
            _ => self
                .table()
                .and_then(|t| t.player_by_name(nickname))
                .map(|p| p.id),
        };
        found.ok_or_else(|| GameError::unauthorized(nickname, "act in this game"))
    }

    fn unsupported(&self, operation: &'static str) -> GameError {
        GameError::Unsupported { operation, phase: self.name() }
    }

    pub fn join(&self, nickname: &str) -> Result<Phase, GameError> {
        let next = match self {
            Phase::Lobby(lobby) => lobby.join(nickname)?,
            _ => return Err(self.unsupported("join")),
        };
        log_transition(self, &next);
        Ok(next)
    }

    pub fn leave(&self, nickname: &str) -> Result<Phase, GameError> {
        match self {
            Phase::Lobby(lobby) => lobby.leave(nickname),
            _ => Err(self.unsupported("leave")),
        }
    }

    pub fn choose_mage(
        &self,
        player: PlayerId,
        mage: Mage,
        rng: &mut dyn RandomSource,
    ) -> Result<Phase, GameError> {
        let next = match self {
            Phase::Prepare(p) => p.choose_mage(player, mage, rng)?,
            _ => return Err(self.unsupported("choose a mage")),
        };
        log_transition(self, &next);
        Ok(next)
    }

    pub fn play_assistant(&self, player: PlayerId, value: u8) -> Result<Phase, GameError> {
        let next = match self {
            Phase::Planning(p) => p.play_assistant(player, value)?,
            _ => return Err(self.unsupported("play an assistant")),
        };
        log_transition(self, &next);
        Ok(next)
    }

    pub fn move_student_to_hall(
        &self,
        player: PlayerId,
        color: PawnColor,
    ) -> Result<Phase, GameError> {
        let next = match self {
            Phase::StudentMove(p) => p.move_student_to_hall(player, color)?,
            _ => return Err(self.unsupported("move a student to the hall")),
        };
        log_transition(self, &next);
        Ok(next)
    }

    pub fn move_student_to_island(
        &self,
        player: PlayerId,
        color: PawnColor,
        island: IslandId,
    ) -> Result<Phase, GameError> {
        let next = match self {
            Phase::StudentMove(p) => p.move_student_to_island(player, color, island)?,
            _ => return Err(self.unsupported("move a student to an island")),
        };
        log_transition(self, &next);
        Ok(next)
    }

    pub fn move_mother_nature(&self, player: PlayerId, steps: u32) -> Result<Phase, GameError> {
        let next = match self {
            Phase::MnMove(p) => p.move_mother_nature(player, steps)?,
            _ => return Err(self.unsupported("move mother nature")),
        };
        log_transition(self, &next);
        Ok(next)
    }

    pub fn pick_cloud(
        &self,
        player: PlayerId,
        cloud: usize,
        rng: &mut dyn RandomSource,
    ) -> Result<Phase, GameError> {
        let next = match self {
            Phase::CloudPick(p) => p.pick_cloud(player, cloud, rng)?,
            _ => return Err(self.unsupported("pick a cloud")),
        };
        log_transition(self, &next);
        Ok(next)
    }

    /// Buys and resolves a character. Legal once per turn in any action
    /// phase; the phase kind is kept.
    pub fn play_character(
        &self,
        player: PlayerId,
        kind: CharacterType,
        steps: &[CharacterStep],
        rng: &mut dyn RandomSource,
    ) -> Result<Phase, GameError> {
        const OPERATION: &str = "play a character";
        let ctx = self.context().ok_or_else(|| self.unsupported(OPERATION))?;
        ctx.authorize(player, OPERATION)?;
        if ctx.effects().character_played {
            return Err(self.unsupported(OPERATION));
        }
        let card = ctx
            .table()
            .character(kind)
            .ok_or_else(|| GameError::invalid_update(format!("{} is not in play", kind.name())))?;
        let price = card.price();
        let coins = ctx.table().board(player).map_or(0, |b| b.coins);
        if coins < price {
            return Err(GameError::invalid_update(format!(
                "{} costs {} coins, {} available",
                kind.name(),
                price,
                coins
            )));
        }

        let (mut next, mut played) = card.play(ctx, player, steps, rng)?;
        played.mark_used();
        next.table_mut().charge(player, price)?;
        if let Some(slot) = next.table_mut().character_mut(kind) {
            *slot = played;
        }
        next.effects_mut().character_played = true;
        debug!(player = %player, character = kind.name(), price, "character played");

        Ok(match self {
            Phase::StudentMove(p) => Phase::StudentMove(p.with_context(next)),
            Phase::MnMove(p) => Phase::MnMove(p.with_context(next)),
            Phase::CloudPick(p) => Phase::CloudPick(p.with_context(next)),
            _ => return Err(self.unsupported(OPERATION)),
        })
    }

    /// Everything in the phase, as a change record.
    pub fn dump(&self) -> UpdateRecord {
        update::dump(self)
    }

    /// What changed since `previous`.
    pub fn compare(&self, previous: &Phase) -> UpdateRecord {
        update::compare(self, previous)
    }
}

fn log_transition(from: &Phase, to: &Phase) {
    if from.name() != to.name() {
        debug!(from = from.name(), to = to.name(), round = ?to.round(), "phase transition");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::board::{StudentSet, ALL_MAGES};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn dealt(rng: &mut SmallRng) -> Phase {
        let mut phase = Phase::new(GameParameters::two_players()).unwrap();
        phase = phase.join("ann").unwrap();
        phase = phase.join("bob").unwrap();
        phase = phase.choose_mage(PlayerId(1), ALL_MAGES[0], rng).unwrap();
        phase.choose_mage(PlayerId(0), ALL_MAGES[1], rng).unwrap()
    }

    #[test]
    fn inconsistent_parameters_never_open_a_lobby() {
        let too_many = GameParameters { characters_per_game: 13, ..GameParameters::two_players() };
        assert!(Phase::new(too_many).is_err());
        let no_islands = GameParameters { island_count: 0, ..GameParameters::two_players() };
        assert!(Phase::new(no_islands).is_err());
        assert!(matches!(
            Phase::new(GameParameters { player_count: 4, ..GameParameters::two_players() }),
            Err(ConfigError::PlayerCount(4))
        ));
    }

    #[test]
    fn lobby_fills_then_prepares() {
        let lobby = Phase::new(GameParameters::two_players()).unwrap();
        let one = lobby.join("ann").unwrap();
        assert_eq!(one.name(), "Lobby");
        assert!(matches!(one.join("ann"), Err(GameError::InvalidUpdate(_))));
        assert!(matches!(one.leave("zed"), Err(GameError::Unauthorized { .. })));
        let two = one.join("bob").unwrap();
        assert_eq!(two.name(), "Prepare");
        assert!(matches!(two.join("cat"), Err(GameError::Unsupported { .. })));
    }

    #[test]
    fn mages_must_be_distinct() {
        let mut rng = SmallRng::seed_from_u64(5);
        let phase = Phase::new(GameParameters::two_players()).unwrap()
            .join("ann")
            .unwrap()
            .join("bob")
            .unwrap();
        let one = phase.choose_mage(PlayerId(0), Mage::Witch, &mut rng).unwrap();
        assert!(matches!(
            one.choose_mage(PlayerId(1), Mage::Witch, &mut rng),
            Err(GameError::InvalidUpdate(_))
        ));
        assert!(matches!(
            one.choose_mage(PlayerId(0), Mage::Sage, &mut rng),
            Err(GameError::InvalidUpdate(_))
        ));
        assert!(matches!(
            one.choose_mage(PlayerId(5), Mage::Sage, &mut rng),
            Err(GameError::Unauthorized { .. })
        ));
    }

    #[test]
    fn last_mage_deals_and_starts_planning() {
        let mut rng = SmallRng::seed_from_u64(9);
        let phase = dealt(&mut rng);
        assert_eq!(phase.name(), "Planning");
        assert_eq!(phase.round(), Some(1));
        assert_eq!(phase.current_player(), Some(PlayerId(0)));
        let table = phase.table().unwrap();
        table.check_invariants().unwrap();
        assert!(table.clouds().iter().all(|c| c.total() == 3));
        assert_eq!(table.characters().len(), 3);
        assert_eq!(phase.player_id("bob").unwrap(), PlayerId(1));
    }

    #[test]
    fn planning_orders_the_action_phase() {
        let mut rng = SmallRng::seed_from_u64(11);
        let phase = dealt(&mut rng);
        assert!(matches!(
            phase.play_assistant(PlayerId(1), 3),
            Err(GameError::Unauthorized { .. })
        ));
        let phase = phase.play_assistant(PlayerId(0), 7).unwrap();
        assert!(matches!(
            phase.play_assistant(PlayerId(1), 7),
            Err(GameError::InvalidUpdate(_))
        ));
        let phase = phase.play_assistant(PlayerId(1), 2).unwrap();
        assert_eq!(phase.name(), "StudentMove");
        assert_eq!(phase.current_player(), Some(PlayerId(1)));
    }

    #[test]
    fn wrong_phase_operations_are_unsupported() {
        let mut rng = SmallRng::seed_from_u64(2);
        let phase = dealt(&mut rng);
        assert!(matches!(
            phase.move_mother_nature(PlayerId(0), 1),
            Err(GameError::Unsupported { .. })
        ));
        assert!(matches!(
            phase.play_character(PlayerId(0), CharacterType::Postman, &[], &mut rng),
            Err(GameError::Unsupported { .. })
        ));
        assert!(matches!(
            phase.pick_cloud(PlayerId(0), 0, &mut rng),
            Err(GameError::Unsupported { .. })
        ));
    }

    #[test]
    fn a_full_turn_walks_the_action_phases() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut table = table_with(&[], &mut rng);
        table.board_mut(PlayerId(0)).unwrap().entrance = StudentSet::single(PawnColor::Red, 7);
        let ctx = context(table, [4, 6]);
        let mut phase = StudentMove::begin(ctx);
        for _ in 0..3 {
            assert_eq!(phase.name(), "StudentMove");
            phase = phase.move_student_to_hall(PlayerId(0), PawnColor::Red).unwrap();
        }
        assert_eq!(phase.name(), "MnMove");
        let table = phase.table().unwrap();
        assert_eq!(table.professor(PawnColor::Red), Some(PlayerId(0)));
        assert_eq!(table.board(PlayerId(0)).unwrap().coins, 2);

        assert!(matches!(
            phase.move_mother_nature(PlayerId(0), 3),
            Err(GameError::InvalidUpdate(_))
        ));
        let phase = phase.move_mother_nature(PlayerId(0), 2).unwrap();
        assert_eq!(phase.name(), "CloudPick");
        assert_eq!(phase.table().unwrap().mother_nature(), IslandId(2));

        let phase = phase.pick_cloud(PlayerId(0), 0, &mut rng).unwrap();
        assert_eq!(phase.name(), "MnMove");
        assert_eq!(phase.current_player(), Some(PlayerId(1)));
    }

    #[test]
    fn second_character_in_a_turn_is_unsupported() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut table = table_with(&[CharacterType::Postman, CharacterType::Knight], &mut rng);
        table.board_mut(PlayerId(0)).unwrap().coins = 10;
        let ctx = context(table, [1, 2]);
        let phase = Phase::MnMove(MnMove::new(ctx));
        let phase = phase
            .play_character(PlayerId(0), CharacterType::Postman, &[], &mut rng)
            .unwrap();
        assert_eq!(phase.name(), "MnMove");
        let table = phase.table().unwrap();
        assert_eq!(table.board(PlayerId(0)).unwrap().coins, 9);
        assert_eq!(table.character(CharacterType::Postman).unwrap().price(), 2);
        match &phase {
            Phase::MnMove(p) => assert_eq!(p.max_steps(), 3),
            other => panic!("unexpected phase {}", other.name()),
        }
        assert!(matches!(
            phase.play_character(PlayerId(0), CharacterType::Knight, &[], &mut rng),
            Err(GameError::Unsupported { .. })
        ));
    }

    #[test]
    fn characters_cost_coins_and_must_be_in_play() {
        let mut rng = SmallRng::seed_from_u64(6);
        let table = table_with(&[CharacterType::Herald], &mut rng);
        let phase = Phase::MnMove(MnMove::new(context(table, [1, 2])));
        let island = [CharacterStep::new().with("island", 0)];
        assert!(matches!(
            phase.play_character(PlayerId(0), CharacterType::Herald, &island, &mut rng),
            Err(GameError::InvalidUpdate(_))
        ));
        assert!(matches!(
            phase.play_character(PlayerId(0), CharacterType::Monk, &island, &mut rng),
            Err(GameError::InvalidUpdate(_))
        ));
        assert!(matches!(
            phase.play_character(PlayerId(1), CharacterType::Herald, &island, &mut rng),
            Err(GameError::Unauthorized { .. })
        ));
    }

    #[test]
    fn compare_to_itself_carries_only_the_phase() {
        let mut rng = SmallRng::seed_from_u64(8);
        let phase = dealt(&mut rng);
        let record = phase.compare(&phase);
        assert!(record.entities.is_empty());
        assert_eq!(record.attributes.len(), 1);
        assert!(record.is_trivial());
    }

    #[test]
    fn compare_reports_only_changes() {
        let mut rng = SmallRng::seed_from_u64(8);
        let before = dealt(&mut rng);
        let after = before.play_assistant(PlayerId(0), 5).unwrap();
        let record = after.compare(&before);
        assert_eq!(record.attributes["current_player"], "bob");
        assert_eq!(record.entities.len(), 1);
        assert!(matches!(&record.entities[0], EntityUpdate::Board(b) if b.owner == PlayerId(0)));

        let full = after.dump();
        let islands = full
            .entities
            .iter()
            .filter(|e| matches!(e, EntityUpdate::Island(_)))
            .count();
        assert_eq!(islands, 12);
        assert!(serde_json::to_string(&full).is_ok());
    }
}
