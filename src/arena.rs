//! Arena - generational index allocation for mount records and hook contexts.
//!
//! Slots are reused through a free list. Every reuse bumps the slot's
//! generation, so an id held past its removal (a queued re-render for a
//! component that has since unmounted, say) no longer resolves.

use std::marker::PhantomData;

/// Raw slot handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id {
    index: u32,
    generation: u32,
}

/// Typed wrapper around [`Id`].
pub trait ArenaKey: Copy {
    fn from_id(id: Id) -> Self;
    fn id(self) -> Id;
}

macro_rules! arena_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name($crate::arena::Id);

        impl $crate::arena::ArenaKey for $name {
            fn from_id(id: $crate::arena::Id) -> Self {
                Self(id)
            }

            fn id(self) -> $crate::arena::Id {
                self.0
            }
        }
    };
}

pub(crate) use arena_key;

// =============================================================================
// Arena
// =============================================================================

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

pub(crate) struct Arena<K, T> {
    entries: Vec<Entry<T>>,
    /// Pool of freed indices for reuse.
    free: Vec<u32>,
    len: usize,
    _key: PhantomData<K>,
}

impl<K: ArenaKey, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            len: 0,
            _key: PhantomData,
        }
    }
}

impl<K: ArenaKey, T> Arena<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> K {
        self.insert_with(|_| value)
    }

    /// Insert a value that needs to know its own key.
    pub fn insert_with(&mut self, make: impl FnOnce(K) -> T) -> K {
        let id = match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.generation = entry.generation.wrapping_add(1);
                Id { index, generation: entry.generation }
            }
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(Entry { generation: 0, value: None });
                Id { index, generation: 0 }
            }
        };
        let key = K::from_id(id);
        self.entries[id.index as usize].value = Some(make(key));
        self.len += 1;
        key
    }

    pub fn get(&self, key: K) -> Option<&T> {
        let id = key.id();
        self.entries
            .get(id.index as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.value.as_ref())
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let id = key.id();
        self.entries
            .get_mut(id.index as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.value.as_mut())
    }

    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Remove and return the value; the slot goes back to the pool.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let id = key.id();
        let entry = self.entries.get_mut(id.index as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        let value = entry.value.take()?;
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    arena_key!(TestKey);

    #[test]
    fn test_insert_get_remove() {
        let mut arena: Arena<TestKey, &str> = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_stale_key_after_reuse() {
        let mut arena: Arena<TestKey, u32> = Arena::new();
        let old = arena.insert(1);
        arena.remove(old);
        let new = arena.insert(2);
        assert_ne!(old, new);
        assert!(!arena.contains(old));
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn test_insert_with_sees_own_key() {
        let mut arena: Arena<TestKey, Option<TestKey>> = Arena::new();
        let key = arena.insert_with(Some);
        assert_eq!(arena.get(key), Some(&Some(key)));
    }
}
