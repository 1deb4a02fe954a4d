//! The island ring and its merge algorithm.
//!
//! Islands live in an arena indexed by [`IslandId`]. A merged group is a
//! contiguous arc of the ring whose members all point at one root; the root
//! carries the group's controller and locks, while every member keeps its own
//! students. Group-wide queries always resolve through the root.
//!
//! Walking the ring is done with ids rather than references: [`IslandRing::next_group`]
//! scans forward node by node until the root changes, so a cursor held across
//! a merge or a scrub stays valid.

use std::fmt;

use serde::Serialize;

use super::color::{PawnColor, StudentSet};
use super::player::PlayerId;
use crate::error::GameError;

/// Stable identity of an island node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IslandId(pub u8);

impl IslandId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for IslandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// One island node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Island {
    id: IslandId,
    students: StudentSet,
    /// Locks stacked on this node; only meaningful on roots.
    locks: u32,
    /// Controller; only meaningful on roots.
    controller: Option<PlayerId>,
    parent: Option<IslandId>,
}

impl Island {
    fn new(id: IslandId) -> Self {
        Island {
            id,
            students: StudentSet::new(),
            locks: 0,
            controller: None,
            parent: None,
        }
    }

    pub fn id(&self) -> IslandId {
        self.id
    }

    /// Students placed on this node alone.
    pub fn own_students(&self) -> StudentSet {
        self.students
    }

    pub fn parent(&self) -> Option<IslandId> {
        self.parent
    }
}

/// A fixed-size ring of islands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IslandRing {
    islands: Vec<Island>,
}

impl IslandRing {
    /// Creates a ring of `count` singleton islands.
    pub fn new(count: usize) -> Self {
        let islands = (0..count)
            .map(|i| Island::new(IslandId(i as u8)))
            .collect();
        IslandRing { islands }
    }

    /// Number of nodes (not groups) in the ring.
    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    pub fn contains(&self, id: IslandId) -> bool {
        id.index() < self.islands.len()
    }

    /// Looks up an island node.
    pub fn island(&self, id: IslandId) -> Option<&Island> {
        self.islands.get(id.index())
    }

    /// All nodes in ring order.
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Returns the root of the group containing `id`.
    pub fn root(&self, id: IslandId) -> IslandId {
        let mut cur = id;
        while let Some(parent) = self.islands[cur.index()].parent {
            cur = parent;
        }
        cur
    }

    pub fn is_root(&self, id: IslandId) -> bool {
        self.islands[id.index()].parent.is_none()
    }

    /// Nodes belonging to the group of `id`, in ring order.
    pub fn members(&self, id: IslandId) -> Vec<IslandId> {
        let root = self.root(id);
        self.islands
            .iter()
            .map(|i| i.id)
            .filter(|&i| self.root(i) == root)
            .collect()
    }

    pub fn group_size(&self, id: IslandId) -> u32 {
        self.members(id).len() as u32
    }

    /// Students across the whole group of `id`.
    pub fn students(&self, id: IslandId) -> StudentSet {
        self.members(id)
            .into_iter()
            .fold(StudentSet::new(), |acc, m| acc.union(&self.islands[m.index()].students))
    }

    pub fn controller(&self, id: IslandId) -> Option<PlayerId> {
        self.islands[self.root(id).index()].controller
    }

    pub fn locks(&self, id: IslandId) -> u32 {
        self.islands[self.root(id).index()].locks
    }

    pub fn is_locked(&self, id: IslandId) -> bool {
        self.locks(id) > 0
    }

    /// Towers standing on the group: one per member when controlled.
    pub fn tower_count(&self, id: IslandId) -> u32 {
        if self.controller(id).is_some() {
            self.group_size(id)
        } else {
            0
        }
    }

    /// Towers a player has standing anywhere on the ring.
    pub fn towers_of(&self, player: PlayerId) -> u32 {
        self.group_roots()
            .into_iter()
            .filter(|&r| self.controller(r) == Some(player))
            .map(|r| self.group_size(r))
            .sum()
    }

    /// Group roots in ring order, each listed once. A group that wraps past
    /// the last node is listed at its first appearance from node 0.
    pub fn group_roots(&self) -> Vec<IslandId> {
        let mut roots: Vec<IslandId> = Vec::new();
        for island in &self.islands {
            let root = self.root(island.id);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    pub fn group_count(&self) -> usize {
        self.group_roots().len()
    }

    /// Returns the root of the group following the group of `id`. With a
    /// single group left, returns that group's root.
    pub fn next_group(&self, id: IslandId) -> IslandId {
        let n = self.islands.len();
        let root = self.root(id);
        let mut cur = id.index();
        for _ in 0..n {
            cur = (cur + 1) % n;
            let candidate = self.root(IslandId(cur as u8));
            if candidate != root {
                return candidate;
            }
        }
        root
    }

    /// Moves `steps` groups forward from the group of `from` and returns the
    /// root reached.
    pub fn advance(&self, from: IslandId, steps: u32) -> IslandId {
        let mut cur = self.root(from);
        for _ in 0..steps {
            cur = self.next_group(cur);
        }
        cur
    }

    /// The node facing `id` across the ring.
    pub fn opposite(&self, id: IslandId) -> IslandId {
        let n = self.islands.len();
        IslandId(((id.index() + n / 2) % n) as u8)
    }

    /// True if the groups of `a` and `b` are distinct and touch on the ring.
    pub fn groups_adjacent(&self, a: IslandId, b: IslandId) -> bool {
        let n = self.islands.len();
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return false;
        }
        self.members(ra).into_iter().any(|m| {
            let next = IslandId(((m.index() + 1) % n) as u8);
            let prev = IslandId(((m.index() + n - 1) % n) as u8);
            self.root(next) == rb || self.root(prev) == rb
        })
    }

    pub(crate) fn add_student(&mut self, id: IslandId, color: PawnColor) {
        self.islands[id.index()].students.add(color, 1);
    }

    pub(crate) fn set_controller(&mut self, id: IslandId, player: PlayerId) {
        let root = self.root(id);
        self.islands[root.index()].controller = Some(player);
    }

    /// Stacks one lock on the group of `id`.
    pub(crate) fn push_lock(&mut self, id: IslandId) {
        let root = self.root(id);
        self.islands[root.index()].locks += 1;
    }

    /// Removes one lock from the group of `id`. Returns false if unlocked.
    pub(crate) fn pop_lock(&mut self, id: IslandId) -> bool {
        let root = self.root(id);
        let locks = &mut self.islands[root.index()].locks;
        if *locks == 0 {
            return false;
        }
        *locks -= 1;
        true
    }

    /// Returns a new ring with the groups of roots `a` and `b` merged.
    pub fn merge(&self, a: IslandId, b: IslandId) -> Result<IslandRing, GameError> {
        let mut ring = self.clone();
        ring.merge_in_place(a, b)?;
        Ok(ring)
    }

    /// Merges two adjacent roots controlled by the same player. The root with
    /// the larger id stays root and takes over the other group's locks.
    pub(crate) fn merge_in_place(&mut self, a: IslandId, b: IslandId) -> Result<IslandId, GameError> {
        if !self.contains(a) || !self.contains(b) {
            return Err(GameError::precondition(format!("no island {} or {}", a, b)));
        }
        if a == b || !self.is_root(a) || !self.is_root(b) {
            return Err(GameError::invalid_update(format!(
                "{} and {} are not two distinct group roots",
                a, b
            )));
        }
        let owner = self.islands[a.index()].controller;
        if owner.is_none() || owner != self.islands[b.index()].controller {
            return Err(GameError::invalid_update(format!(
                "{} and {} are not controlled by the same player",
                a, b
            )));
        }
        if !self.groups_adjacent(a, b) {
            return Err(GameError::invalid_update(format!("{} and {} are not adjacent", a, b)));
        }

        let (keep, absorbed) = if a > b { (a, b) } else { (b, a) };
        let moved = self.members(absorbed);
        let locks = std::mem::take(&mut self.islands[absorbed.index()].locks);
        self.islands[keep.index()].locks += locks;
        self.islands[absorbed.index()].controller = None;
        for m in moved {
            self.islands[m.index()].parent = Some(keep);
        }
        Ok(keep)
    }

    /// Merges every pair of adjacent groups sharing a controller until no
    /// such pair is left. Returns the number of merges performed.
    pub(crate) fn scrub_in_place(&mut self) -> usize {
        let mut merges = 0;
        loop {
            let roots = self.group_roots();
            if roots.len() < 2 {
                return merges;
            }
            let pair = (0..roots.len())
                .map(|i| (roots[i], roots[(i + 1) % roots.len()]))
                .find(|&(a, b)| {
                    a != b
                        && self.controller(a).is_some()
                        && self.controller(a) == self.controller(b)
                });
            match pair {
                Some((a, b)) => {
                    if self.merge_in_place(a, b).is_err() {
                        return merges;
                    }
                    merges += 1;
                }
                None => return merges,
            }
        }
    }

    /// Returns a scrubbed copy of the ring.
    pub fn scrub(&self) -> IslandRing {
        let mut ring = self.clone();
        ring.scrub_in_place();
        ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    fn id(n: u8) -> IslandId {
        IslandId(n)
    }

    fn ring_with(owners: &[(u8, PlayerId)]) -> IslandRing {
        let mut ring = IslandRing::new(12);
        for &(i, p) in owners {
            ring.set_controller(id(i), p);
        }
        ring
    }

    #[test]
    fn fresh_ring_has_singleton_groups() {
        let ring = IslandRing::new(12);
        assert_eq!(ring.group_count(), 12);
        assert!(ring.islands().iter().all(|i| i.parent().is_none()));
        assert_eq!(ring.controller(id(3)), None);
        assert_eq!(ring.tower_count(id(3)), 0);
    }

    #[test]
    fn merge_keeps_larger_id_as_root() {
        let ring = ring_with(&[(3, A), (4, A)]);
        let merged = ring.merge(id(3), id(4)).unwrap();
        assert_eq!(merged.root(id(3)), id(4));
        assert_eq!(merged.controller(id(3)), Some(A));
        assert_eq!(merged.group_count(), 11);
        assert_eq!(merged.tower_count(id(3)), 2);
        // The original ring is untouched.
        assert_eq!(ring.group_count(), 12);
    }

    #[test]
    fn merge_reports_union_of_students() {
        let mut ring = ring_with(&[(3, A), (4, A)]);
        ring.add_student(id(3), PawnColor::Red);
        ring.add_student(id(4), PawnColor::Blue);
        ring.add_student(id(4), PawnColor::Red);
        let merged = ring.merge(id(4), id(3)).unwrap();
        let expected = StudentSet::from_counts([0, 1, 0, 2, 0]);
        assert_eq!(merged.students(id(3)), expected);
        assert_eq!(merged.students(id(4)), expected);
        assert_eq!(merged.island(id(3)).unwrap().own_students().total(), 1);
    }

    #[test]
    fn merge_rejects_non_roots_uncontrolled_and_mixed_owners() {
        let ring = ring_with(&[(3, A), (4, A), (5, A), (6, B)]);
        let merged = ring.merge(id(3), id(4)).unwrap();
        assert!(matches!(merged.merge(id(3), id(5)), Err(GameError::InvalidUpdate(_))));
        assert!(ring.merge(id(5), id(6)).is_err());
        assert!(ring.merge(id(6), id(7)).is_err());
        assert!(ring.merge(id(3), id(3)).is_err());
    }

    #[test]
    fn merge_rejects_distant_groups() {
        let ring = ring_with(&[(1, A), (5, A)]);
        assert!(ring.merge(id(1), id(5)).is_err());
    }

    #[test]
    fn merge_wraps_around_the_ring() {
        let ring = ring_with(&[(11, A), (0, A)]);
        let merged = ring.merge(id(0), id(11)).unwrap();
        assert_eq!(merged.root(id(0)), id(11));
        assert_eq!(merged.members(id(0)), vec![id(0), id(11)]);
    }

    #[test]
    fn merge_stacks_locks() {
        let mut ring = ring_with(&[(3, A), (4, A)]);
        let unlocked = ring.merge(id(3), id(4)).unwrap();
        assert!(!unlocked.is_locked(id(3)));

        ring.push_lock(id(3));
        let one = ring.merge(id(3), id(4)).unwrap();
        assert_eq!(one.locks(id(4)), 1);

        ring.push_lock(id(4));
        let two = ring.merge(id(3), id(4)).unwrap();
        assert_eq!(two.locks(id(3)), 2);
    }

    #[test]
    fn merge_does_not_change_tower_totals() {
        let ring = ring_with(&[(3, A), (4, A), (8, B)]);
        let before_a = ring.towers_of(A);
        let before_b = ring.towers_of(B);
        let merged = ring.merge(id(3), id(4)).unwrap();
        assert_eq!(merged.towers_of(A), before_a);
        assert_eq!(merged.towers_of(B), before_b);
    }

    #[test]
    fn scrub_merges_runs_until_stable() {
        let ring = ring_with(&[(2, A), (3, A), (4, A), (5, B), (6, B), (11, A), (0, A)]);
        let scrubbed = ring.scrub();
        assert_eq!(scrubbed.root(id(2)), scrubbed.root(id(4)));
        assert_eq!(scrubbed.root(id(5)), scrubbed.root(id(6)));
        assert_eq!(scrubbed.root(id(11)), scrubbed.root(id(0)));
        assert_ne!(scrubbed.root(id(0)), scrubbed.root(id(2)));
        // 12 nodes: {11,0}, {1}, {2,3,4}, {5,6}, {7}, {8}, {9}, {10}
        assert_eq!(scrubbed.group_count(), 8);
    }

    #[test]
    fn scrub_joins_through_a_bridging_conquest() {
        let mut ring = ring_with(&[(2, A), (4, A)]).scrub();
        assert_eq!(ring.group_count(), 12);
        ring.set_controller(id(3), A);
        ring.scrub_in_place();
        assert_eq!(ring.group_count(), 10);
        assert_eq!(ring.root(id(2)), id(4));
        assert_eq!(ring.tower_count(id(3)), 3);
    }

    #[test]
    fn next_group_skips_group_members() {
        let ring = ring_with(&[(2, A), (3, A), (4, A)]).scrub();
        assert_eq!(ring.next_group(id(1)), id(4));
        assert_eq!(ring.next_group(id(2)), id(5));
        assert_eq!(ring.next_group(id(11)), id(0));
    }

    #[test]
    fn advance_wraps_and_counts_groups() {
        let ring = ring_with(&[(11, A), (0, A)]).scrub();
        assert_eq!(ring.advance(id(10), 1), id(11));
        assert_eq!(ring.advance(id(10), 2), id(1));
        assert_eq!(ring.advance(id(0), 11), id(11));
    }

    #[test]
    fn single_group_advances_onto_itself() {
        let owners: Vec<(u8, PlayerId)> = (0..12).map(|i| (i, A)).collect();
        let ring = ring_with(&owners).scrub();
        assert_eq!(ring.group_count(), 1);
        assert_eq!(ring.advance(id(3), 4), id(11));
    }

    #[test]
    fn lock_push_and_pop_resolve_to_root() {
        let mut ring = ring_with(&[(3, A), (4, A)]).scrub();
        ring.push_lock(id(3));
        ring.push_lock(id(3));
        assert_eq!(ring.locks(id(4)), 2);
        assert!(ring.pop_lock(id(4)));
        assert!(ring.pop_lock(id(3)));
        assert!(!ring.pop_lock(id(3)));
        assert!(!ring.is_locked(id(3)));
    }

    #[test]
    fn opposite_is_half_a_ring_away() {
        let ring = IslandRing::new(12);
        assert_eq!(ring.opposite(id(0)), id(6));
        assert_eq!(ring.opposite(id(9)), id(3));
    }
}
