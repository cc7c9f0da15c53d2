//! Generation-tagged slot arena
//!
//! Replaces pin-and-cast opaque pointers with tokens that can always be
//! checked: a token packs a slot index and the generation the slot had
//! when the value was inserted. Removing a value bumps the slot's
//! generation, so every outstanding token for it turns stale and resolves
//! to `None` - a cheap comparison instead of undefined behavior.
//!
//! Token layout: `generation << 32 | index`. Generations start at 1 and
//! skip 0 on wrap-around, so the all-zero token can never have been issued
//! and is the canonical invalid handle.

/// Opaque token handed across the ABI
pub type RawToken = u64;

/// Never issued; resolves to nothing
pub const NULL_TOKEN: RawToken = 0;

fn pack(index: u32, generation: u32) -> RawToken {
    (generation as u64) << 32 | index as u64
}

fn unpack(token: RawToken) -> (u32, u32) {
    (token as u32, (token >> 32) as u32)
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena issuing [`RawToken`]s
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Arena<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store a value and issue a token for it.
    pub fn insert(&mut self, value: T) -> RawToken {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return pack(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        pack(index, 1)
    }

    /// Resolve a token to its value; `None` for stale, foreign, or
    /// never-issued tokens.
    pub fn get(&self, token: RawToken) -> Option<&T> {
        let (index, generation) = unpack(token);
        let slot = self.slots.get(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, token: RawToken) -> Option<&mut T> {
        let (index, generation) = unpack(token);
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Take the value out and retire the token. Subsequent resolution of
    /// the same token deterministically fails.
    pub fn remove(&mut self, token: RawToken) -> Option<T> {
        let (index, generation) = unpack(token);
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation == 0 {
            // Generation 0 is reserved for the null token
            slot.generation = 1;
        }
        self.free.push(index);
        Some(value)
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_token_never_resolves() {
        let arena: Arena<u32> = Arena::new();
        assert!(arena.get(NULL_TOKEN).is_none());

        let mut arena = Arena::new();
        arena.insert(7u32);
        assert!(arena.get(NULL_TOKEN).is_none());
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut arena = Arena::new();
        let a = arena.insert("alpha");
        let b = arena.insert("beta");
        assert_eq!(arena.get(a), Some(&"alpha"));
        assert_eq!(arena.get(b), Some(&"beta"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn removed_token_is_stale() {
        let mut arena = Arena::new();
        let token = arena.insert(42u32);
        assert_eq!(arena.remove(token), Some(42));
        assert!(arena.get(token).is_none());
        assert_eq!(arena.remove(token), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn slot_reuse_does_not_resurrect_old_token() {
        let mut arena = Arena::new();
        let old = arena.insert(1u32);
        arena.remove(old);

        // Reuses the same slot with a bumped generation.
        let new = arena.insert(2u32);
        assert_ne!(old, new);
        assert!(arena.get(old).is_none());
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn get_mut_mutates_in_place() {
        let mut arena = Arena::new();
        let token = arena.insert(vec![1]);
        arena.get_mut(token).unwrap().push(2);
        assert_eq!(arena.get(token), Some(&vec![1, 2]));
    }

    #[test]
    fn foreign_token_with_valid_index_is_rejected() {
        let mut arena = Arena::new();
        let token = arena.insert(9u32);
        let (index, generation) = (token as u32, (token >> 32) as u32);
        let forged = ((generation + 1) as u64) << 32 | index as u64;
        assert!(arena.get(forged).is_none());
    }
}
