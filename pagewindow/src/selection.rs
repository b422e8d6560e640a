use crate::key::{KeySet, RecordKey};

/// Record keys the user has marked as selected.
///
/// Keyed by identity, so it survives window moves and page growth. Only explicit user actions
/// mutate it; the owner clears it when the filter is reset.
#[derive(Clone, Debug)]
pub struct SelectionSet<K> {
    keys: KeySet<K>,
}

impl<K: RecordKey> SelectionSet<K> {
    pub fn new() -> Self {
        Self {
            keys: KeySet::<K>::new(),
        }
    }

    /// Flips the selection state of `key`; returns `true` if it is now selected.
    pub fn toggle(&mut self, key: K) -> bool {
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    pub fn select(&mut self, key: K) -> bool {
        self.keys.insert(key)
    }

    pub fn deselect(&mut self, key: &K) -> bool {
        self.keys.remove(key)
    }

    pub fn select_all(&mut self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            self.keys.insert(key);
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.keys.iter()
    }
}

impl<K: RecordKey> Default for SelectionSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
