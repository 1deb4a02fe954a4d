//! Text protocol of the driver binary.
//!
//! One command per line. Game commands name the acting player by nickname
//! and map to exactly one phase operation; the rest control the driver.

pub mod command;
pub mod parser;

pub use command::GameCommand;
pub use parser::{parse_command, Command, ParseError};
