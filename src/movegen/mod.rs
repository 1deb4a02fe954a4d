//! Candidate move generation.
//!
//! Lists the commands worth trying in a phase. Phase-level moves (assistants,
//! student moves, mother nature steps, clouds) are generated legal; character
//! plays are generated from what is on the cards and may still be refused by
//! the effect (a full hall, for instance), so callers must handle rejection.

pub mod characters;

use rand::Rng;

use crate::board::IslandId;
use crate::phase::Phase;
use crate::protocol::GameCommand;

/// Every candidate command for the player(s) allowed to act in `phase`.
pub fn legal_commands(phase: &Phase) -> Vec<GameCommand> {
    let mut out = Vec::new();
    match phase {
        Phase::Lobby(lobby) => {
            let seat = lobby.nicknames().len() + 1;
            let mut nickname = format!("player{}", seat);
            while lobby.nicknames().contains(&nickname) {
                nickname.push('_');
            }
            out.push(GameCommand::Join { nickname });
        }
        Phase::Prepare(prepare) => {
            let free = prepare.free_mages();
            for player in prepare.players().iter().filter(|p| p.mage.is_none()) {
                for &mage in &free {
                    out.push(GameCommand::ChooseMage { nickname: player.nickname.clone(), mage });
                }
            }
        }
        Phase::Planning(planning) => {
            let Some(player) = planning.current_player() else {
                return out;
            };
            let table = planning.table();
            let Some(board) = table.board(player) else {
                return out;
            };
            let taken = |v: u8| planning.played().contains(&Some(v));
            let all_taken = board.hand.iter().all(|a| taken(a.value));
            for card in &board.hand {
                if all_taken || !taken(card.value) {
                    out.push(GameCommand::PlayAssistant {
                        nickname: table.nickname(player),
                        value: card.value,
                    });
                }
            }
        }
        Phase::StudentMove(p) => {
            let ctx = p.context();
            let table = ctx.table();
            let player = ctx.current_player();
            let nickname = table.nickname(player);
            if let Some(board) = table.board(player) {
                for (color, _) in board.entrance.iter() {
                    if board.hall_room(color) > 0 {
                        out.push(GameCommand::MoveToHall { nickname: nickname.clone(), color });
                    }
                    for i in 0..table.islands().len() {
                        out.push(GameCommand::MoveToIsland {
                            nickname: nickname.clone(),
                            color,
                            island: IslandId(i as u8),
                        });
                    }
                }
            }
        }
        Phase::MnMove(p) => {
            let nickname = p.context().table().nickname(p.context().current_player());
            for steps in 1..=p.max_steps() {
                out.push(GameCommand::MoveMotherNature { nickname: nickname.clone(), steps });
            }
        }
        Phase::CloudPick(p) => {
            let table = p.context().table();
            let nickname = table.nickname(p.context().current_player());
            let all_empty = table.clouds().iter().all(|c| c.is_empty());
            for (cloud, students) in table.clouds().iter().enumerate() {
                if all_empty || !students.is_empty() {
                    out.push(GameCommand::PickCloud { nickname: nickname.clone(), cloud });
                }
            }
        }
        Phase::Endgame(_) => {}
    }
    if let Some(ctx) = phase.context() {
        out.extend(characters::character_commands(ctx));
    }
    out
}

/// Picks one candidate at random. Characters are tried with probability
/// `character_rate` when any is on offer.
pub fn random_command(
    phase: &Phase,
    character_rate: f64,
    rng: &mut impl Rng,
) -> Option<GameCommand> {
    let (chars, moves): (Vec<GameCommand>, Vec<GameCommand>) = legal_commands(phase)
        .into_iter()
        .partition(|c| matches!(c, GameCommand::PlayCharacter { .. }));
    let pool = if !chars.is_empty() && (moves.is_empty() || rng.gen_bool(character_rate)) {
        chars
    } else {
        moves
    };
    if pool.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..pool.len());
    pool.into_iter().nth(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameParameters;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn planning(rng: &mut SmallRng) -> Phase {
        let mut phase = Phase::new(GameParameters::two_players()).unwrap();
        while !matches!(phase, Phase::Planning(_)) {
            let cmd = legal_commands(&phase).into_iter().next().unwrap();
            phase = cmd.apply(&phase, rng).unwrap();
        }
        phase
    }

    #[test]
    fn lobby_offers_a_fresh_nickname() {
        let phase = Phase::new(GameParameters::two_players()).unwrap();
        let cmds = legal_commands(&phase);
        assert_eq!(cmds, vec![GameCommand::Join { nickname: "player1".into() }]);
    }

    #[test]
    fn planning_skips_taken_values() {
        let mut rng = SmallRng::seed_from_u64(3);
        let phase = planning(&mut rng);
        assert_eq!(legal_commands(&phase).len(), 10);
        let phase = phase.play_assistant(crate::board::PlayerId(0), 4).unwrap();
        let cmds = legal_commands(&phase);
        assert_eq!(cmds.len(), 9);
        assert!(!cmds.iter().any(|c| matches!(c, GameCommand::PlayAssistant { value: 4, .. })));
    }

    #[test]
    fn every_generated_phase_move_applies() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut phase = planning(&mut rng);
        for _ in 0..40 {
            let Some(cmd) = random_command(&phase, 0.0, &mut rng) else {
                break;
            };
            phase = cmd
                .apply(&phase, &mut rng)
                .unwrap_or_else(|e| panic!("{} rejected: {}", cmd, e));
        }
    }
}
