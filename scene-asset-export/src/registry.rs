/// Structural interning store shared by every asset registry
use std::collections::HashMap;
use std::hash::Hash;

/// Append-only list of unique items with stable first-seen indices.
/// Structurally equal items collapse onto the index of the first one.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    /// Items in first-use order.
    items: Vec<T>,
    /// Reverse lookup from item to its index.
    lookup: HashMap<T, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of an equal item, appending the item if none exists.
    pub fn intern(&mut self, item: T) -> usize {
        if let Some(&index) = self.lookup.get(&item) {
            return index;
        }

        let index = self.items.len();
        self.lookup.insert(item.clone(), index);
        self.items.push(item);
        index
    }

    /// Looks up an item without interning it.
    pub fn position(&self, item: &T) -> Option<usize> {
        self.lookup.get(item).copied()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Consumes the registry, yielding items in index order.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
