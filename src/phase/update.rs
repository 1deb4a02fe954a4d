//! Change records between two phases.
//!
//! A record is a flat map of phase attributes plus a list of entity snapshots.
//! `dump` lists everything; `compare` keeps the phase name and whatever
//! differs from the previous phase.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::Phase;
use crate::board::{IslandId, Player, PlayerBoard, PlayerId, StudentSet, Table, COLOR_COUNT};
use crate::character::Character;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UpdateRecord {
    pub attributes: BTreeMap<&'static str, Value>,
    pub entities: Vec<EntityUpdate>,
}

impl UpdateRecord {
    /// True when the record carries nothing beyond the phase name.
    pub fn is_trivial(&self) -> bool {
        self.entities.is_empty() && self.attributes.keys().all(|k| *k == "phase")
    }
}

/// Island as seen by a client: its own students plus the state of its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IslandView {
    pub id: IslandId,
    pub root: IslandId,
    pub students: StudentSet,
    pub locks: u32,
    pub controller: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityUpdate {
    Player(Player),
    Board(PlayerBoard),
    Island(IslandView),
    Cloud { index: usize, students: StudentSet },
    Professors { owners: [Option<PlayerId>; COLOR_COUNT] },
    Bag { students: StudentSet },
    MotherNature { island: IslandId },
    Character(Character),
    CoinSupply { coins: u32 },
}

impl EntityUpdate {
    /// Identity of the entity, stable across phases.
    fn key(&self) -> (u8, usize) {
        match self {
            EntityUpdate::Player(p) => (0, p.id.seat()),
            EntityUpdate::Board(b) => (1, b.owner.seat()),
            EntityUpdate::Island(i) => (2, i.id.index()),
            EntityUpdate::Cloud { index, .. } => (3, *index),
            EntityUpdate::Professors { .. } => (4, 0),
            EntityUpdate::Bag { .. } => (5, 0),
            EntityUpdate::MotherNature { .. } => (6, 0),
            EntityUpdate::Character(c) => (7, c.kind() as usize),
            EntityUpdate::CoinSupply { .. } => (8, 0),
        }
    }
}

pub(super) fn dump(phase: &Phase) -> UpdateRecord {
    UpdateRecord {
        attributes: attributes(phase),
        entities: entities(phase),
    }
}

pub(super) fn compare(current: &Phase, previous: &Phase) -> UpdateRecord {
    let before = attributes(previous);
    let mut attrs = attributes(current);
    attrs.retain(|k, v| *k == "phase" || before.get(k) != Some(v));

    let old: BTreeMap<(u8, usize), EntityUpdate> =
        entities(previous).into_iter().map(|e| (e.key(), e)).collect();
    let entities = entities(current)
        .into_iter()
        .filter(|e| old.get(&e.key()) != Some(e))
        .collect();
    UpdateRecord { attributes: attrs, entities }
}

fn attributes(phase: &Phase) -> BTreeMap<&'static str, Value> {
    let mut attrs = BTreeMap::new();
    attrs.insert("phase", Value::from(phase.name()));
    if let Some(round) = phase.round() {
        attrs.insert("round", Value::from(round));
    }
    let nickname = |id: PlayerId| match phase.table() {
        Some(t) => t.nickname(id),
        None => id.to_string(),
    };
    if let Some(current) = phase.current_player() {
        attrs.insert("current_player", Value::from(nickname(current)));
    }
    match phase {
        Phase::Lobby(lobby) => {
            attrs.insert("seated", Value::from(lobby.nicknames().to_vec()));
        }
        Phase::StudentMove(p) => {
            attrs.insert("students_left", Value::from(p.remaining()));
        }
        Phase::MnMove(p) => {
            attrs.insert("max_steps", Value::from(p.max_steps()));
        }
        Phase::Endgame(end) => {
            let names: Vec<String> = end.winners().iter().map(|&w| nickname(w)).collect();
            attrs.insert("winners", Value::from(names));
        }
        _ => {}
    }
    if let Some(ctx) = phase.context() {
        attrs.insert("character_played", Value::from(ctx.effects().character_played));
    }
    attrs
}

fn entities(phase: &Phase) -> Vec<EntityUpdate> {
    match phase {
        Phase::Lobby(_) => Vec::new(),
        Phase::Prepare(p) => p.players().iter().cloned().map(EntityUpdate::Player).collect(),
        _ => phase.table().map(table_entities).unwrap_or_default(),
    }
}

fn table_entities(table: &Table) -> Vec<EntityUpdate> {
    let mut out = Vec::new();
    out.extend(table.players().iter().cloned().map(EntityUpdate::Player));
    out.extend(table.boards().iter().cloned().map(EntityUpdate::Board));
    let ring = table.islands();
    for island in ring.islands() {
        let root = ring.root(island.id());
        out.push(EntityUpdate::Island(IslandView {
            id: island.id(),
            root,
            students: island.own_students(),
            locks: ring.locks(root),
            controller: ring.controller(root),
        }));
    }
    for (index, cloud) in table.clouds().iter().enumerate() {
        out.push(EntityUpdate::Cloud { index, students: *cloud });
    }
    out.push(EntityUpdate::Professors { owners: table.professors() });
    out.push(EntityUpdate::Bag { students: table.bag() });
    out.push(EntityUpdate::MotherNature { island: table.mother_nature() });
    out.extend(table.characters().iter().cloned().map(EntityUpdate::Character));
    out.push(EntityUpdate::CoinSupply { coins: table.coin_supply() });
    out
}
