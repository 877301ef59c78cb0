//! Reuse-or-create object pool
//!
//! Slots are owned by the pool for the lifetime of the simulation; callers
//! hold `Handle`s. Released slots park on a LIFO free list and the most
//! recently released instance is the first one dealt back out, so a churny
//! population settles into a small working set with no reallocation.

/// Index of a pooled slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    /// Raw slot index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

struct Slot<T> {
    value: T,
    active: bool,
}

/// Generic fixed-discipline recycler: acquire reuses or constructs, release
/// reclaims. The pool never shrinks.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<Handle>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a slot: pop the most recently released handle if one is
    /// parked, otherwise construct a fresh instance with `factory`. Either
    /// way `place` runs on the instance (position reset is the caller's
    /// job, not the pool's) and the returned handle is active.
    pub fn acquire(
        &mut self,
        factory: impl FnOnce() -> T,
        place: impl FnOnce(&mut T),
    ) -> Handle {
        match self.free.pop() {
            Some(handle) => {
                let slot = &mut self.slots[handle.index()];
                slot.active = true;
                place(&mut slot.value);
                handle
            }
            None => {
                let handle = Handle(self.slots.len() as u32);
                let mut value = factory();
                place(&mut value);
                self.slots.push(Slot {
                    value,
                    active: true,
                });
                handle
            }
        }
    }

    /// Deactivate a slot and park it on the free list. Releasing a handle
    /// that is already inactive is a no-op, so a handle can never land on
    /// the free list twice.
    pub fn release(&mut self, handle: Handle) {
        if let Some(slot) = self.slots.get_mut(handle.index()) {
            if slot.active {
                slot.active = false;
                self.free.push(handle);
            }
        }
    }

    /// Release every handle in `handles`; duplicates are tolerated.
    pub fn release_all(&mut self, handles: impl IntoIterator<Item = Handle>) {
        for handle in handles {
            self.release(handle);
        }
    }

    pub fn is_active(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|slot| slot.active)
    }

    /// Borrow an active slot
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.active)
            .map(|slot| &slot.value)
    }

    /// Mutably borrow an active slot
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.active)
            .map(|slot| &mut slot.value)
    }

    /// Slots ever created (the pool never destroys instances)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots currently parked on the free list
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}
