//! Character plays the current player can afford.

use crate::board::{IslandId, PlayerBoard, ALL_COLORS};
use crate::character::{Character, CharacterStep, CharacterType};
use crate::phase::ActionContext;
use crate::protocol::GameCommand;

/// One candidate per plausible argument set of every affordable card. Multi-step
/// cards are offered with a single step.
pub fn character_commands(ctx: &ActionContext) -> Vec<GameCommand> {
    let table = ctx.table();
    let player = ctx.current_player();
    let Some(board) = table.board(player) else {
        return Vec::new();
    };
    if ctx.effects().character_played {
        return Vec::new();
    }
    let nickname = table.nickname(player);
    let roots = table.islands().group_roots();

    let mut out = Vec::new();
    for card in table.characters().iter().filter(|c| c.price() <= board.coins) {
        for steps in step_options(card, &roots, board) {
            out.push(GameCommand::PlayCharacter {
                nickname: nickname.clone(),
                character: card.kind(),
                steps,
            });
        }
    }
    out
}

fn step_options(
    card: &Character,
    roots: &[IslandId],
    board: &PlayerBoard,
) -> Vec<Vec<CharacterStep>> {
    let island = |i: &IslandId| CharacterStep::new().with("island", i.0);
    let on_card: Vec<_> = card.students().iter().map(|(c, _)| c).collect();
    match card.kind() {
        CharacterType::Farmer
        | CharacterType::Postman
        | CharacterType::Centaur
        | CharacterType::Knight => vec![Vec::new()],
        CharacterType::Herald => roots.iter().map(|i| vec![island(i)]).collect(),
        CharacterType::Herbalist if card.locks() > 0 => {
            roots.iter().map(|i| vec![island(i)]).collect()
        }
        CharacterType::Herbalist => Vec::new(),
        CharacterType::Monk => on_card
            .iter()
            .flat_map(|&c| roots.iter().map(move |i| vec![island(i).with("color", c)]))
            .collect(),
        CharacterType::Princess => on_card
            .iter()
            .filter(|&&c| board.hall_room(c) > 0)
            .map(|&c| vec![CharacterStep::new().with("color", c)])
            .collect(),
        CharacterType::Jester => on_card
            .iter()
            .flat_map(move |&c| {
                board.entrance.iter().map(move |(e, _)| {
                    vec![CharacterStep::new().with("card", c).with("entrance", e)]
                })
            })
            .collect(),
        CharacterType::Minstrel => board
            .entrance
            .iter()
            .flat_map(move |(e, _)| {
                board.hall.iter().filter(move |&(h, _)| h != e).map(move |(h, _)| {
                    vec![CharacterStep::new().with("entrance", e).with("hall", h)]
                })
            })
            .collect(),
        CharacterType::Mushroom | CharacterType::Thief => ALL_COLORS
            .iter()
            .map(|&c| vec![CharacterStep::new().with("color", c)])
            .collect(),
    }
}
