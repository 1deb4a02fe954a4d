//! Eriantys rules engine library.
//!
//! The game is a chain of immutable [`phase::Phase`] values: every player
//! operation is called on the current phase and returns the next one.
//! Around that core sit the board model, turn orders, influence scoring,
//! character effects, and the driver pieces (text protocol, engine context,
//! random move generation and self-play) used by the binaries.

pub mod board;
pub mod character;
pub mod config;
pub mod engine;
pub mod error;
pub mod influence;
pub mod movegen;
pub mod phase;
pub mod protocol;
pub mod rng;
pub mod selfplay;
pub mod turn;

pub use error::{ConfigError, GameError};
pub use phase::Phase;
