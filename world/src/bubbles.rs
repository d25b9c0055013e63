//! Live bubbles and the fuse-timed groups they chain into.

use std::{collections::BTreeMap, time::Duration};

use bubble_arena_core::{BubbleGroupId, BubbleGroupSnapshot, BubbleSnapshot, CellCoord, PlayerId};

/// Bubble resting on a tile until its group detonates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Bubble {
    pub(crate) cell: CellCoord,
    pub(crate) owner: PlayerId,
    pub(crate) explosion_range: u32,
}

impl Bubble {
    /// Reports whether this bubble's blast would reach `target`.
    ///
    /// The target must share a row or a column with the bubble and lie at most
    /// `explosion_range` tiles away. Any blocked cell strictly between the two
    /// cuts the connection.
    fn reaches<F>(&self, target: CellCoord, is_blocked: &mut F) -> bool
    where
        F: FnMut(CellCoord) -> bool,
    {
        let Some((direction, distance)) = self.cell.aligned_offset(target) else {
            return false;
        };
        if distance > self.explosion_range {
            return false;
        }

        // Cells between two aligned in-bounds cells are always in bounds.
        (1..distance).all(|offset| {
            self.cell
                .step(direction, offset, u32::MAX)
                .map_or(false, |cell| !is_blocked(cell))
        })
    }

    fn snapshot(&self) -> BubbleSnapshot {
        BubbleSnapshot {
            cell: self.cell,
            owner: self.owner,
            explosion_range: self.explosion_range,
        }
    }
}

/// Bubbles that detonate together once the shared fuse burns out.
#[derive(Clone, Debug)]
pub(crate) struct BubbleGroup {
    pub(crate) id: BubbleGroupId,
    pub(crate) members: Vec<Bubble>,
    pub(crate) created_at: Duration,
}

impl BubbleGroup {
    fn snapshot(&self) -> BubbleGroupSnapshot {
        BubbleGroupSnapshot {
            id: self.id,
            created_at: self.created_at,
            bubbles: self.members.iter().map(Bubble::snapshot).collect(),
        }
    }
}

/// Outcome of adding a bubble to the manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Placement {
    /// Group now holding the bubble.
    pub(crate) group: BubbleGroupId,
    /// Groups that were folded into `group`, in identifier order.
    pub(crate) absorbed: Vec<BubbleGroupId>,
}

/// Owns every live bubble group and allocates their identifiers.
#[derive(Debug)]
pub(crate) struct BubbleGroups {
    groups: BTreeMap<BubbleGroupId, BubbleGroup>,
    next_id: u32,
}

impl BubbleGroups {
    pub(crate) fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Adds a bubble, merging every group with a member whose blast reaches it.
    ///
    /// The oldest connected group survives and keeps its fuse; all other
    /// connected groups are absorbed into it. A bubble reached by nobody lights
    /// a new fuse at `now`.
    pub(crate) fn add_bubble<F>(&mut self, bubble: Bubble, now: Duration, mut is_blocked: F) -> Placement
    where
        F: FnMut(CellCoord) -> bool,
    {
        let mut connected: Vec<(Duration, BubbleGroupId)> = self
            .groups
            .values()
            .filter(|group| {
                group
                    .members
                    .iter()
                    .any(|member| member.reaches(bubble.cell, &mut is_blocked))
            })
            .map(|group| (group.created_at, group.id))
            .collect();
        connected.sort_unstable();

        let Some(&(_, target)) = connected.first() else {
            let id = self.allocate_id();
            let _ = self.groups.insert(
                id,
                BubbleGroup {
                    id,
                    members: vec![bubble],
                    created_at: now,
                },
            );
            return Placement {
                group: id,
                absorbed: Vec::new(),
            };
        };

        let mut absorbed: Vec<BubbleGroupId> =
            connected.iter().skip(1).map(|(_, id)| *id).collect();
        absorbed.sort_unstable();

        let mut moved = Vec::new();
        for id in &absorbed {
            if let Some(group) = self.groups.remove(id) {
                moved.extend(group.members);
            }
        }

        if let Some(group) = self.groups.get_mut(&target) {
            group.members.extend(moved);
            group.members.push(bubble);
        }

        Placement {
            group: target,
            absorbed,
        }
    }

    /// Removes and returns every group whose fuse has burnt out, oldest first.
    pub(crate) fn take_expired(&mut self, now: Duration, fuse: Duration) -> Vec<BubbleGroup> {
        let expired: Vec<BubbleGroupId> = self
            .groups
            .values()
            .filter(|group| now.saturating_sub(group.created_at) >= fuse)
            .map(|group| group.id)
            .collect();

        let mut groups: Vec<BubbleGroup> = expired
            .into_iter()
            .filter_map(|id| self.groups.remove(&id))
            .collect();
        groups.sort_by_key(|group| (group.created_at, group.id));
        groups
    }

    pub(crate) fn snapshots(&self) -> Vec<BubbleGroupSnapshot> {
        self.groups.values().map(BubbleGroup::snapshot).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    fn allocate_id(&mut self) -> BubbleGroupId {
        let id = BubbleGroupId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}
