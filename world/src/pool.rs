//! Fixed-capacity recycling store for drop entities.

use glam::Vec2;
use raindrop_core::{DropId, LaneIndex, Operation, PoolKind};
use thiserror::Error;

/// Drop entity owned by a [`DropPool`] slot.
#[derive(Clone, Debug, PartialEq)]
pub struct PooledDrop {
    id: DropId,
    operation: Option<Operation>,
    position: Vec2,
    lane: LaneIndex,
}

impl PooledDrop {
    fn prewarmed(id: DropId) -> Self {
        Self {
            id,
            operation: None,
            position: Vec2::ZERO,
            lane: LaneIndex::new(0),
        }
    }

    /// Identifier of the drop, stable for the lifetime of the pool.
    #[must_use]
    pub const fn id(&self) -> DropId {
        self.id
    }

    /// Operation displayed by the drop; `None` while the slot is free.
    #[must_use]
    pub const fn operation(&self) -> Option<&Operation> {
        self.operation.as_ref()
    }

    /// Current position in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Lane the drop was spawned into.
    #[must_use]
    pub const fn lane(&self) -> LaneIndex {
        self.lane
    }

    /// Reports whether the drop came from the golden pool.
    #[must_use]
    pub const fn is_golden(&self) -> bool {
        self.id.pool().is_golden()
    }

    pub(crate) fn assign(&mut self, operation: Operation, lane: LaneIndex) {
        self.operation = Some(operation);
        self.lane = lane;
    }

    pub(crate) fn fall(&mut self, distance: f32) {
        self.position.y -= distance;
    }
}

#[derive(Debug)]
struct Slot {
    drop: PooledDrop,
    in_use: bool,
}

/// Pool of pre-warmed drops that never grows after construction.
#[derive(Debug)]
pub struct DropPool {
    kind: PoolKind,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl DropPool {
    /// Creates a pool holding `capacity` pre-warmed drops of the provided kind.
    #[must_use]
    pub fn new(kind: PoolKind, capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|slot| Slot {
                drop: PooledDrop::prewarmed(DropId::new(kind, slot as u32)),
                in_use: false,
            })
            .collect();
        // Lowest slot is handed out first.
        let free = (0..capacity as u32).rev().collect();
        Self { kind, slots, free }
    }

    /// Fixed number of drops owned by the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of drops available for acquisition.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of drops currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Reports whether at least one drop can be acquired.
    #[must_use]
    pub fn has_free(&self) -> bool {
        !self.free.is_empty()
    }

    /// Hands out a free drop placed at `position`, or `None` when exhausted.
    pub fn acquire(&mut self, position: Vec2) -> Option<DropId> {
        let slot_index = self.free.pop()?;
        let slot = &mut self.slots[slot_index as usize];
        slot.in_use = true;
        slot.drop.position = position;
        Some(slot.drop.id)
    }

    /// Returns a drop to the free set.
    pub fn release(&mut self, id: DropId) -> Result<(), PoolError> {
        if id.pool() != self.kind {
            return Err(PoolError::ForeignDrop { id, pool: self.kind });
        }
        let slot = self
            .slots
            .get_mut(id.slot() as usize)
            .ok_or(PoolError::UnknownSlot { id })?;
        if !slot.in_use {
            return Err(PoolError::AlreadyFree { id });
        }

        slot.in_use = false;
        slot.drop.operation = None;
        self.free.push(id.slot());
        Ok(())
    }

    /// Retrieves an active drop issued by this pool.
    #[must_use]
    pub fn get(&self, id: DropId) -> Option<&PooledDrop> {
        if id.pool() != self.kind {
            return None;
        }
        self.slots
            .get(id.slot() as usize)
            .filter(|slot| slot.in_use)
            .map(|slot| &slot.drop)
    }

    pub(crate) fn get_mut(&mut self, id: DropId) -> Option<&mut PooledDrop> {
        if id.pool() != self.kind {
            return None;
        }
        self.slots
            .get_mut(id.slot() as usize)
            .filter(|slot| slot.in_use)
            .map(|slot| &mut slot.drop)
    }

    /// Releases every active drop.
    pub(crate) fn release_all(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.in_use {
                slot.in_use = false;
                slot.drop.operation = None;
                self.free.push(index as u32);
            }
        }
    }
}

/// Logic errors raised when a drop is returned to the wrong pool or twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The drop was issued by a different pool.
    #[error("drop {id:?} does not belong to the {pool} pool")]
    ForeignDrop {
        /// Rejected drop.
        id: DropId,
        /// Pool that rejected it.
        pool: PoolKind,
    },
    /// The drop refers to a slot the pool does not own.
    #[error("drop {id:?} refers to an unknown slot")]
    UnknownSlot {
        /// Rejected drop.
        id: DropId,
    },
    /// The drop is already in the free set.
    #[error("drop {id:?} is already free")]
    AlreadyFree {
        /// Rejected drop.
        id: DropId,
    },
}
