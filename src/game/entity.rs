//! Entity handles and storage
//!
//! Entities are addressed by generational handles:
//! - Each slot has a generation counter
//! - A removed slot can be reused
//! - The generation increments on reuse, invalidating old handles
//!
//! A physics body hands back the `EntityId` it was tagged with, never a
//! pointer, so a contact reported for a vehicle that was removed in the editor
//! just fails the lookup.

/// Handle to a gameplay entity.
///
/// Consists of an index (which slot in the arena) and a generation (which
/// version of that slot). Two ids with the same index but different
/// generations are different entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// A null/invalid entity reference.
    pub const NULL: EntityId = EntityId { index: u32::MAX, generation: 0 };

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId::NULL
    }
}

/// Generational slot storage.
///
/// Combines slot allocation with the value storage, so an id is alive
/// exactly when its slot holds a value.
pub struct EntityArena<T> {
    generations: Vec<u32>,
    values: Vec<Option<T>>,
    /// Free slots available for reuse (LIFO)
    free_indices: Vec<u32>,
    alive_count: usize,
}

impl<T> EntityArena<T> {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            values: Vec::new(),
            free_indices: Vec::new(),
            alive_count: 0,
        }
    }

    /// Insert a value built from its own id, so the value can carry the id
    /// (physics user data, for instance) from the start.
    pub fn insert_with<F: FnOnce(EntityId) -> T>(&mut self, build: F) -> EntityId {
        let id = match self.free_indices.pop() {
            // Generation was already bumped on removal
            Some(index) => EntityId::new(index, self.generations[index as usize]),
            None => {
                let index = self.values.len() as u32;
                self.generations.push(0);
                self.values.push(None);
                EntityId::new(index, 0)
            }
        };

        self.values[id.index as usize] = Some(build(id));
        self.alive_count += 1;
        id
    }

    pub fn insert(&mut self, value: T) -> EntityId {
        self.insert_with(|_| value)
    }

    /// Remove a value, invalidating its id. Returns the value if it was alive.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }

        let idx = id.index as usize;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push(id.index);
        self.alive_count -= 1;
        self.values[idx].take()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }
        let idx = id.index as usize;
        idx < self.generations.len() && self.generations[idx] == id.generation && self.values[idx].is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        if !self.contains(id) {
            return None;
        }
        self.values[id.index as usize].as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.contains(id) {
            return None;
        }
        self.values[id.index as usize].as_mut()
    }

    /// Iterate over all live (id, value) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.values.iter().enumerate().filter_map(move |(idx, v)| {
            v.as_ref().map(|v| (EntityId::new(idx as u32, self.generations[idx]), v))
        })
    }

    pub fn len(&self) -> usize {
        self.alive_count
    }

    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Remove everything, invalidating every id handed out so far.
    ///
    /// Later inserts refill the slots from index 0 upwards.
    pub fn clear(&mut self) -> Vec<T> {
        let mut removed = Vec::with_capacity(self.alive_count);
        for (idx, slot) in self.values.iter_mut().enumerate() {
            if let Some(v) = slot.take() {
                removed.push(v);
                self.generations[idx] = self.generations[idx].wrapping_add(1);
            }
        }
        self.free_indices = (0..self.values.len() as u32).rev().collect();
        self.alive_count = 0;
        removed
    }
}

impl<T> Default for EntityArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let mut arena = EntityArena::new();

        let e1 = arena.insert("car");
        let e2 = arena.insert("truck");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(e1), Some(&"car"));

        assert_eq!(arena.remove(e1), Some("car"));
        assert_eq!(arena.len(), 1);
        assert!(!arena.contains(e1));
        assert!(arena.contains(e2));
        assert_eq!(arena.remove(e1), None);
    }

    #[test]
    fn test_generation_prevents_reuse_collision() {
        let mut arena = EntityArena::new();

        let e1 = arena.insert(1);
        arena.remove(e1);

        // Same slot, different generation
        let e2 = arena.insert(2);
        assert_eq!(e2.index(), e1.index());
        assert_ne!(e2.generation(), e1.generation());

        assert_eq!(arena.get(e1), None);
        assert_eq!(arena.get(e2), Some(&2));
    }

    #[test]
    fn test_insert_with_sees_own_id() {
        let mut arena = EntityArena::new();
        let id = arena.insert_with(|id| id);
        assert_eq!(arena.get(id), Some(&id));
    }

    #[test]
    fn test_clear_invalidates_ids() {
        let mut arena = EntityArena::new();
        let a = arena.insert('a');
        let b = arena.insert('b');

        let removed = arena.clear();
        assert_eq!(removed, vec!['a', 'b']);
        assert!(arena.is_empty());
        assert!(!arena.contains(a));
        assert!(!arena.contains(b));

        let c = arena.insert('c');
        let d = arena.insert('d');
        assert_eq!((c.index(), d.index()), (a.index(), b.index()));
        let values: Vec<_> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!['c', 'd']);
    }

    #[test]
    fn test_null_entity() {
        let arena: EntityArena<u8> = EntityArena::new();
        assert!(!arena.contains(EntityId::NULL));
        assert!(EntityId::NULL.is_null());
        assert_eq!(EntityId::default(), EntityId::NULL);
    }
}
