//! Fixed-capacity map and set keyed by small enums.
//!
//! Keys provide a dense ordinal through [`Ordinal`]; storage is a flat
//! array indexed by that ordinal, so lookup is O(1) with no hashing and no
//! heap. Keys whose ordinal falls outside the capacity are rejected at the
//! call site rather than silently truncated.

use core::marker::PhantomData;

/// A key type with a dense zero-based ordinal.
pub trait Ordinal: Copy {
    /// Number of distinct values, i.e. one past the largest ordinal.
    const COUNT: usize;

    fn ordinal(self) -> usize;
}

/// Fixed-capacity map from an [`Ordinal`] key to `V`.
#[derive(Debug)]
pub struct EnumMap<K: Ordinal, V, const N: usize> {
    slots: [Option<V>; N],
    _key: PhantomData<K>,
}

impl<K: Ordinal, V, const N: usize> Default for EnumMap<K, V, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ordinal, V, const N: usize> EnumMap<K, V, N> {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            _key: PhantomData,
        }
    }

    /// Insert `value` at `key`, returning the previous value if any.
    /// Fails with the rejected value if the key's ordinal is out of range.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, V> {
        match self.slots.get_mut(key.ordinal()) {
            Some(slot) => Ok(slot.replace(value)),
            None => Err(value),
        }
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.slots.get(key.ordinal()).and_then(|slot| slot.as_ref())
    }

    pub fn remove(&mut self, key: K) -> Option<V> {
        self.slots.get_mut(key.ordinal()).and_then(|slot| slot.take())
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }
}

/// Fixed-capacity set of [`Ordinal`] keys.
#[derive(Debug, Clone)]
pub struct EnumSet<K: Ordinal, const N: usize> {
    flags: [bool; N],
    _key: PhantomData<K>,
}

impl<K: Ordinal, const N: usize> Default for EnumSet<K, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ordinal, const N: usize> EnumSet<K, N> {
    pub const fn new() -> Self {
        Self {
            flags: [false; N],
            _key: PhantomData,
        }
    }

    /// Insert `key`; returns false if its ordinal is out of range.
    pub fn insert(&mut self, key: K) -> bool {
        match self.flags.get_mut(key.ordinal()) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: K) {
        if let Some(flag) = self.flags.get_mut(key.ordinal()) {
            *flag = false;
        }
    }

    pub fn contains(&self, key: K) -> bool {
        self.flags.get(key.ordinal()).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.flags = [false; N];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Color {
        Red,
        Green,
        Blue,
    }

    impl Ordinal for Color {
        const COUNT: usize = 3;

        fn ordinal(self) -> usize {
            match self {
                Color::Red => 0,
                Color::Green => 1,
                Color::Blue => 2,
            }
        }
    }

    #[test]
    fn test_map_insert_get_remove() {
        let mut map: EnumMap<Color, u32, { Color::COUNT }> = EnumMap::new();
        assert_eq!(map.get(Color::Red), None);
        assert_eq!(map.insert(Color::Red, 7), Ok(None));
        assert_eq!(map.insert(Color::Red, 8), Ok(Some(7)));
        assert_eq!(map.get(Color::Red), Some(&8));
        assert_eq!(map.remove(Color::Red), Some(8));
        assert_eq!(map.get(Color::Red), None);
    }

    #[test]
    fn test_map_rejects_out_of_range_ordinal() {
        // Deliberately undersized capacity
        let mut map: EnumMap<Color, u32, 1> = EnumMap::new();
        assert_eq!(map.insert(Color::Red, 1), Ok(None));
        assert_eq!(map.insert(Color::Blue, 2), Err(2));
        assert_eq!(map.get(Color::Blue), None);
    }

    #[test]
    fn test_map_clear() {
        let mut map: EnumMap<Color, u32, { Color::COUNT }> = EnumMap::new();
        let _ = map.insert(Color::Green, 1);
        let _ = map.insert(Color::Blue, 2);
        map.clear();
        assert_eq!(map.get(Color::Green), None);
        assert_eq!(map.get(Color::Blue), None);
    }

    #[test]
    fn test_set_membership() {
        let mut set: EnumSet<Color, { Color::COUNT }> = EnumSet::new();
        assert!(!set.contains(Color::Green));
        assert!(set.insert(Color::Green));
        assert!(set.contains(Color::Green));
        assert!(!set.contains(Color::Red));
        set.remove(Color::Green);
        assert!(!set.contains(Color::Green));
    }

    #[test]
    fn test_set_out_of_range() {
        let mut set: EnumSet<Color, 1> = EnumSet::new();
        assert!(!set.insert(Color::Blue));
        assert!(!set.contains(Color::Blue));
    }
}
