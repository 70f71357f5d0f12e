//! Generational arena and typed handles.
//!
//! A [`Handle`] pairs a slot index with the slot's generation at insertion
//! time. Removing an item bumps the slot generation, so handles to removed
//! items are detected in O(1) instead of silently aliasing a newer item that
//! reused the slot.

use alloc::vec::Vec as AllocVec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// Typed (index, generation) reference into an [`Arena`].
pub struct Handle<K> {
    index: u32,
    generation: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Handle<K> {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Handle { index, generation, _kind: PhantomData }
    }

    /// Slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation when the handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl<K> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Handle<K> {}

impl<K> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<K> Eq for Handle<K> {}

impl<K> PartialOrd for Handle<K> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Handle<K> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.index, self.generation).cmp(&(other.index, other.generation))
    }
}

impl<K> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<K> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

/// Handle kinds.
pub mod kind {
    /// Marker for particle handles.
    #[derive(Clone, Copy, Debug)]
    pub enum Particle {}
    /// Marker for spring handles.
    #[derive(Clone, Copy, Debug)]
    pub enum Spring {}
    /// Marker for behavior handles.
    #[derive(Clone, Copy, Debug)]
    pub enum Behavior {}
    /// Marker for constraint handles.
    #[derive(Clone, Copy, Debug)]
    pub enum Constraint {}
}

pub type ParticleHandle = Handle<kind::Particle>;
pub type SpringHandle = Handle<kind::Spring>;
pub type BehaviorHandle = Handle<kind::Behavior>;
pub type ConstraintHandle = Handle<kind::Constraint>;

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with a free list. Iteration visits live items in slot order.
#[derive(Clone, Debug)]
pub struct Arena<T, K> {
    slots: AllocVec<Slot<T>>,
    free: AllocVec<u32>,
    len: usize,
    _kind: PhantomData<fn() -> K>,
}

impl<T, K> Arena<T, K> {
    pub fn new() -> Self {
        Arena { slots: AllocVec::new(), free: AllocVec::new(), len: 0, _kind: PhantomData }
    }

    pub fn insert(&mut self, value: T) -> Handle<K> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, value: Some(value) });
        Handle::new(index, 0)
    }

    pub fn remove(&mut self, handle: Handle<K>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    pub fn contains(&self, handle: Handle<K>) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle<K>) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation == handle.generation {
            slot.value.as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: Handle<K>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation == handle.generation {
            slot.value.as_mut()
        } else {
            None
        }
    }

    /// Mutable access to two distinct live items at once.
    pub fn get2_mut(&mut self, a: Handle<K>, b: Handle<K>) -> Option<(&mut T, &mut T)> {
        if a.index == b.index {
            return None;
        }
        let (ia, ib) = (a.index as usize, b.index as usize);
        if ia.max(ib) >= self.slots.len() {
            return None;
        }
        let (first, second) = if ia < ib {
            let (lo, hi) = self.slots.split_at_mut(ib);
            (&mut lo[ia], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(ia);
            (&mut hi[0], &mut lo[ib])
        };
        if first.generation != a.generation || second.generation != b.generation {
            return None;
        }
        Some((first.value.as_mut()?, second.value.as_mut()?))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<K>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|v| (Handle::new(index as u32, slot.generation), v))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<K>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|v| (Handle::new(index as u32, generation), v))
        })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.value.as_ref())
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.value.as_mut())
    }
}

impl<T, K> Default for Arena<T, K> {
    fn default() -> Self {
        Self::new()
    }
}
