//! Effect resolution for every character.
//!
//! Effects work on copies: the action context and the card are cloned, edited
//! and handed back together. The caller charges the price and writes the card
//! back to the table.

use crate::board::{PawnColor, PlayerId};
use crate::error::GameError;
use crate::influence::professor::{reassign_all, reassign_professor};
use crate::influence::{InfluenceModifier, MaxExtractor};
use crate::phase::ActionContext;
use crate::rng::RandomSource;

use super::{Character, CharacterStep, CharacterType};

impl Character {
    /// Resolves this card for `player`. Fails without side effects when the
    /// steps are malformed or the move is illegal.
    pub fn play(
        &self,
        ctx: &ActionContext,
        player: PlayerId,
        steps: &[CharacterStep],
        rng: &mut dyn RandomSource,
    ) -> Result<(ActionContext, Character), GameError> {
        let kind = self.kind();
        if steps.len() < kind.min_steps() || steps.len() > kind.max_steps() {
            return Err(GameError::invalid_parameter(format!(
                "{} takes {} to {} steps, got {}",
                kind.name(),
                kind.min_steps(),
                kind.max_steps(),
                steps.len()
            )));
        }

        let mut ctx = ctx.clone();
        let mut card = self.clone();
        match kind {
            CharacterType::Monk => monk(&mut ctx, &mut card, steps, rng)?,
            CharacterType::Farmer => {
                let favor = MaxExtractor::Inclusive { favorite: player };
                ctx.effects_mut().professor_extractor = Some(favor);
                reassign_all(ctx.table_mut(), Some(favor));
            }
            CharacterType::Herald => {
                for step in steps {
                    let island = step.island("island", ctx.table().islands())?;
                    ctx.resolve_island(island)?;
                }
            }
            CharacterType::Postman => {
                let bonus = ctx.table().params().postman_bonus;
                ctx.effects_mut().bonus_steps += bonus;
            }
            CharacterType::Herbalist => {
                for step in steps {
                    let island = step.island("island", ctx.table().islands())?;
                    if card.locks() == 0 {
                        return Err(GameError::invalid_update("no locks left on the card"));
                    }
                    card.set_locks(card.locks() - 1);
                    ctx.table_mut().islands_mut().push_lock(island);
                }
            }
            CharacterType::Centaur => {
                push_modifier(&mut ctx, InfluenceModifier::IgnoreTowers);
            }
            CharacterType::Jester => jester(&mut ctx, &mut card, player, steps)?,
            CharacterType::Knight => {
                let points = ctx.table().params().knight_bonus;
                push_modifier(&mut ctx, InfluenceModifier::ExtraPoints { player, points });
            }
            CharacterType::Mushroom => {
                for step in steps {
                    let color = step.color("color")?;
                    push_modifier(&mut ctx, InfluenceModifier::IgnoreColor(color));
                }
            }
            CharacterType::Minstrel => minstrel(&mut ctx, player, steps)?,
            CharacterType::Princess => princess(&mut ctx, &mut card, player, steps, rng)?,
            CharacterType::Thief => thief(&mut ctx, steps)?,
        }
        Ok((ctx, card))
    }
}

fn push_modifier(ctx: &mut ActionContext, modifier: InfluenceModifier) {
    ctx.effects_mut().influence_modifiers.push(modifier);
}

fn take_from_card(
    card: &mut Character,
    step: &CharacterStep,
    key: &str,
) -> Result<PawnColor, GameError> {
    let color = step.color(key)?;
    if !card.students_mut().take(color) {
        return Err(GameError::invalid_update(format!(
            "no {} student on the {}",
            color,
            card.kind().name()
        )));
    }
    Ok(color)
}

fn refill_card(ctx: &mut ActionContext, card: &mut Character, rng: &mut dyn RandomSource) {
    if let Some(color) = ctx.table_mut().draw_student(rng) {
        card.students_mut().add(color, 1);
    }
}

fn monk(
    ctx: &mut ActionContext,
    card: &mut Character,
    steps: &[CharacterStep],
    rng: &mut dyn RandomSource,
) -> Result<(), GameError> {
    for step in steps {
        let island = step.island("island", ctx.table().islands())?;
        let color = take_from_card(card, step, "color")?;
        ctx.table_mut().islands_mut().add_student(island, color);
        refill_card(ctx, card, rng);
    }
    Ok(())
}

fn princess(
    ctx: &mut ActionContext,
    card: &mut Character,
    player: PlayerId,
    steps: &[CharacterStep],
    rng: &mut dyn RandomSource,
) -> Result<(), GameError> {
    for step in steps {
        let color = take_from_card(card, step, "color")?;
        ctx.place_in_hall(player, color)?;
        refill_card(ctx, card, rng);
    }
    Ok(())
}

/// Each step swaps one card student with one entrance student.
fn jester(
    ctx: &mut ActionContext,
    card: &mut Character,
    player: PlayerId,
    steps: &[CharacterStep],
) -> Result<(), GameError> {
    for step in steps {
        let wanted = step.color("card")?;
        let given = step.color("entrance")?;
        let board = ctx.table_mut().board_mut(player)?;
        if !board.entrance.take(given) {
            return Err(GameError::invalid_update(format!(
                "no {} student in the entrance",
                given
            )));
        }
        if !card.students_mut().take(wanted) {
            return Err(GameError::invalid_update(format!("no {} student on the jester", wanted)));
        }
        board.entrance.add(wanted, 1);
        card.students_mut().add(given, 1);
    }
    Ok(())
}

/// Each step swaps one entrance student with one hall student.
fn minstrel(
    ctx: &mut ActionContext,
    player: PlayerId,
    steps: &[CharacterStep],
) -> Result<(), GameError> {
    for step in steps {
        let up = step.color("entrance")?;
        let down = step.color("hall")?;
        let board = ctx.table_mut().board_mut(player)?;
        if !board.entrance.contains(up) {
            return Err(GameError::invalid_update(format!("no {} student in the entrance", up)));
        }
        if !board.hall.contains(down) {
            return Err(GameError::invalid_update(format!("no {} student in the hall", down)));
        }
        if up == down {
            continue;
        }
        board.entrance.take(up);
        board.hall.take(down);
        board.entrance.add(down, 1);
        ctx.place_in_hall(player, up)?;
        let favor = ctx.effects().professor_extractor;
        reassign_professor(ctx.table_mut(), down, favor);
    }
    Ok(())
}

/// Every player returns up to the quota of one color from their hall.
fn thief(ctx: &mut ActionContext, steps: &[CharacterStep]) -> Result<(), GameError> {
    for step in steps {
        let color = step.color("color")?;
        let quota = ctx.table().params().thief_quota;
        let seats: Vec<PlayerId> = ctx.table().players().iter().map(|p| p.id).collect();
        let mut returned = 0;
        for seat in seats {
            returned += ctx.table_mut().board_mut(seat)?.hall.take_up_to(color, quota);
        }
        ctx.table_mut().bag_mut().add(color, returned);
        let favor = ctx.effects().professor_extractor;
        reassign_professor(ctx.table_mut(), color, favor);
    }
    Ok(())
}
