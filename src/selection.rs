use crate::catalog::{Catalog, Product};

/// Outcome of a toggle, used for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The id was not present in the catalog; nothing was inserted.
    UnknownId,
}

/// The user's in-progress chosen subset of the catalog.
///
/// Ordered by insertion, unique by id. Deliberately free of I/O: persisting
/// and re-rendering after a mutation are caller obligations.
#[derive(Debug, Default)]
pub struct SelectionStore {
    items: Vec<Product>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the product if selected, otherwise look it up in `catalog` and
    /// append it. Re-adding does not restore the original position. An id
    /// absent from the catalog is a no-op.
    pub fn toggle(&mut self, id: u32, catalog: &Catalog) -> ToggleOutcome {
        if self.contains(id) {
            self.items.retain(|product| product.id != id);
            return ToggleOutcome::Removed;
        }

        match catalog.get(id) {
            Some(product) => {
                self.items.push(product.clone());
                ToggleOutcome::Added
            }
            None => ToggleOutcome::UnknownId,
        }
    }

    /// Remove by id; returns whether anything was removed.
    pub fn remove_by_id(&mut self, id: u32) -> bool {
        let before = self.items.len();
        self.items.retain(|product| product.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The current ordered selection, insertion order.
    pub fn all(&self) -> &[Product] {
        &self.items
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.iter().any(|product| product.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wholesale replacement, used when rehydrating from storage. A repeated
    /// id keeps its first occurrence, wherever the repeats sit.
    pub fn replace(&mut self, items: Vec<Product>) {
        self.items.clear();
        for product in items {
            if !self.contains(product.id) {
                self.items.push(product);
            }
        }
    }
}
