//! Game commands: one phase operation each, addressed by nickname.
//!
//! The text form produced by `Display` is the same one [`parse_command`]
//! accepts, so generated commands can be replayed through the driver.
//!
//! [`parse_command`]: super::parse_command

use std::fmt;

use crate::board::{IslandId, Mage, PawnColor};
use crate::character::{CharacterStep, CharacterType};
use crate::error::GameError;
use crate::phase::Phase;
use crate::rng::RandomSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    Join { nickname: String },
    Leave { nickname: String },
    ChooseMage { nickname: String, mage: Mage },
    PlayAssistant { nickname: String, value: u8 },
    MoveToHall { nickname: String, color: PawnColor },
    MoveToIsland { nickname: String, color: PawnColor, island: IslandId },
    MoveMotherNature { nickname: String, steps: u32 },
    PickCloud { nickname: String, cloud: usize },
    PlayCharacter {
        nickname: String,
        character: CharacterType,
        steps: Vec<CharacterStep>,
    },
}

impl GameCommand {
    pub fn nickname(&self) -> &str {
        match self {
            GameCommand::Join { nickname }
            | GameCommand::Leave { nickname }
            | GameCommand::ChooseMage { nickname, .. }
            | GameCommand::PlayAssistant { nickname, .. }
            | GameCommand::MoveToHall { nickname, .. }
            | GameCommand::MoveToIsland { nickname, .. }
            | GameCommand::MoveMotherNature { nickname, .. }
            | GameCommand::PickCloud { nickname, .. }
            | GameCommand::PlayCharacter { nickname, .. } => nickname,
        }
    }

    /// Runs the command against `phase` and returns the phase that follows.
    pub fn apply(&self, phase: &Phase, rng: &mut dyn RandomSource) -> Result<Phase, GameError> {
        match self {
            GameCommand::Join { nickname } => phase.join(nickname),
            GameCommand::Leave { nickname } => phase.leave(nickname),
            GameCommand::ChooseMage { nickname, mage } => {
                phase.choose_mage(phase.player_id(nickname)?, *mage, rng)
            }
            GameCommand::PlayAssistant { nickname, value } => {
                phase.play_assistant(phase.player_id(nickname)?, *value)
            }
            GameCommand::MoveToHall { nickname, color } => {
                phase.move_student_to_hall(phase.player_id(nickname)?, *color)
            }
            GameCommand::MoveToIsland { nickname, color, island } => {
                phase.move_student_to_island(phase.player_id(nickname)?, *color, *island)
            }
            GameCommand::MoveMotherNature { nickname, steps } => {
                phase.move_mother_nature(phase.player_id(nickname)?, *steps)
            }
            GameCommand::PickCloud { nickname, cloud } => {
                phase.pick_cloud(phase.player_id(nickname)?, *cloud, rng)
            }
            GameCommand::PlayCharacter { nickname, character, steps } => {
                phase.play_character(phase.player_id(nickname)?, *character, steps, rng)
            }
        }
    }

    /// Human-readable summary of the intended effect.
    pub fn describe(&self) -> String {
        match self {
            GameCommand::Join { nickname } => format!("{} joins the game", nickname),
            GameCommand::Leave { nickname } => format!("{} leaves the game", nickname),
            GameCommand::ChooseMage { nickname, mage } => {
                format!("{} plays as the {}", nickname, mage.name())
            }
            GameCommand::PlayAssistant { nickname, value } => {
                format!("{} plays assistant {}", nickname, value)
            }
            GameCommand::MoveToHall { nickname, color } => {
                format!("{} moves a {} student to the hall", nickname, color)
            }
            GameCommand::MoveToIsland { nickname, color, island } => {
                format!("{} moves a {} student to island {}", nickname, color, island.0)
            }
            GameCommand::MoveMotherNature { nickname, steps } => {
                format!("{} moves mother nature {} steps", nickname, steps)
            }
            GameCommand::PickCloud { nickname, cloud } => {
                format!("{} takes the students on cloud {}", nickname, cloud)
            }
            GameCommand::PlayCharacter { nickname, character, steps } => {
                if steps.is_empty() {
                    format!("{} plays the {}", nickname, character.name())
                } else {
                    let args: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
                    format!(
                        "{} plays the {} with {}",
                        nickname,
                        character.name(),
                        args.join(" then ")
                    )
                }
            }
        }
    }
}

impl fmt::Display for GameCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameCommand::Join { nickname } => write!(f, "join {}", nickname),
            GameCommand::Leave { nickname } => write!(f, "leave {}", nickname),
            GameCommand::ChooseMage { nickname, mage } => {
                write!(f, "mage {} {}", nickname, mage.name())
            }
            GameCommand::PlayAssistant { nickname, value } => {
                write!(f, "assistant {} {}", nickname, value)
            }
            GameCommand::MoveToHall { nickname, color } => write!(f, "hall {} {}", nickname, color),
            GameCommand::MoveToIsland { nickname, color, island } => {
                write!(f, "island {} {} {}", nickname, color, island.0)
            }
            GameCommand::MoveMotherNature { nickname, steps } => {
                write!(f, "mn {} {}", nickname, steps)
            }
            GameCommand::PickCloud { nickname, cloud } => write!(f, "cloud {} {}", nickname, cloud),
            GameCommand::PlayCharacter { nickname, character, steps } => {
                write!(f, "character {} {}", nickname, character.name())?;
                for step in steps {
                    write!(f, " {}", step)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameParameters;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn apply_resolves_nicknames() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut phase = Phase::new(GameParameters::two_players()).unwrap();
        for name in ["ann", "bob"] {
            let cmd = GameCommand::Join { nickname: name.to_string() };
            phase = cmd.apply(&phase, &mut rng).unwrap();
        }
        let cmd = GameCommand::ChooseMage { nickname: "bob".into(), mage: Mage::Sage };
        let next = cmd.apply(&phase, &mut rng).unwrap();
        assert_eq!(next.name(), "Prepare");

        let stranger = GameCommand::ChooseMage { nickname: "eve".into(), mage: Mage::King };
        assert!(matches!(
            stranger.apply(&next, &mut rng),
            Err(GameError::Unauthorized { .. })
        ));
    }

    #[test]
    fn display_is_the_wire_form() {
        let cmd = GameCommand::PlayCharacter {
            nickname: "ann".into(),
            character: CharacterType::Jester,
            steps: vec![
                CharacterStep::new().with("card", "red").with("entrance", "blue"),
                CharacterStep::new().with("card", "pink").with("entrance", "green"),
            ],
        };
        assert_eq!(
            cmd.to_string(),
            "character ann jester card=red,entrance=blue card=pink,entrance=green"
        );
        let mn = GameCommand::MoveMotherNature { nickname: "bob".into(), steps: 2 };
        assert_eq!(mn.to_string(), "mn bob 2");
        assert_eq!(mn.describe(), "bob moves mother nature 2 steps");
    }
}
