//! Selected parts, one per category slot.

use serde::{Deserialize, Serialize};
use spckit_primitives::{CategoryKey, Component, format_price};

/// Components the user picked, at most one per [`CategoryKey`].
///
/// Entries keep insertion order for display. Replacing a slot keeps its position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedParts {
    entries: Vec<Component>,
}

/// Result of [`SelectedParts::select`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The slot was empty.
    Inserted,
    /// A different component held the slot and was returned.
    Replaced(Component),
    /// The identical component was already selected.
    Unchanged,
}

impl SelectedParts {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts `component` into its slot, replacing any previous occupant.
    pub fn select(&mut self, component: Component) -> Selection {
        let key = component.category_key();
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.category_key() == key)
        {
            Some(existing) if *existing == component => Selection::Unchanged,
            Some(existing) => Selection::Replaced(std::mem::replace(existing, component)),
            None => {
                self.entries.push(component);
                Selection::Inserted
            }
        }
    }

    /// Removes the component in `key`'s slot.
    pub fn remove(&mut self, key: &CategoryKey) -> Option<Component> {
        let index = self
            .entries
            .iter()
            .position(|existing| existing.category_key() == *key)?;
        Some(self.entries.remove(index))
    }

    /// Returns the component in `key`'s slot.
    #[must_use]
    pub fn get(&self, key: &CategoryKey) -> Option<&Component> {
        self.entries
            .iter()
            .find(|existing| existing.category_key() == *key)
    }

    /// Sum of the numeric prices of every selected component.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0_u64, |sum, part| sum.saturating_add(part.price_value()))
    }

    /// Total formatted for display, e.g. `450,000원`.
    #[must_use]
    pub fn formatted_total(&self) -> String {
        format_price(self.total())
    }

    /// Iterates the selected components in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.entries.iter()
    }

    /// Returns the selected components in display order.
    #[must_use]
    pub fn as_slice(&self) -> &[Component] {
        &self.entries
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a SelectedParts {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
