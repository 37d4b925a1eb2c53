use std::collections::HashSet;

use crate::ItemIdentity;

/// Ordered, deduplicated record of accepted identities.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MasterList {
    order: Vec<ItemIdentity>,
    seen: HashSet<ItemIdentity>,
}

impl MasterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Returns `true` when the identity was not present before.
    pub fn add(&mut self, id: ItemIdentity) -> bool {
        if self.seen.contains(id.as_str()) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemIdentity> {
        self.order.iter()
    }

    pub fn to_vec(&self) -> Vec<ItemIdentity> {
        self.order.clone()
    }
}
