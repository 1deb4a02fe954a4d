//! Board representation and game-state types.
//!
//! Contains student colors, players and their boards, the island ring, and
//! the table aggregate that ties them together.

pub mod color;
pub mod island;
pub mod player;
pub mod table;

pub use color::{PawnColor, StudentSet, ALL_COLORS, COLOR_COUNT};
pub use island::{Island, IslandId, IslandRing};
pub use player::{Assistant, Mage, Player, PlayerBoard, PlayerId, TowerColor, ALL_MAGES};
pub use table::Table;
