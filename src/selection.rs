// ============================================================================
// SELECTION - Known words
// ============================================================================

use std::collections::BTreeMap;

use crate::columns::ColumnMapping;
use crate::dataset::{Dataset, Record};

pub const EXPORT_BATCH: usize = 20;

/// Original index -> record. Key presence means the word is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    items: BTreeMap<usize, Record>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the word is known after the toggle.
    pub fn toggle(&mut self, index: usize, record: &Record) -> bool {
        if self.items.remove(&index).is_some() {
            false
        } else {
            self.items.insert(index, record.clone());
            true
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.items.contains_key(&index)
    }

    pub fn known_count(&self) -> usize {
        self.items.len()
    }

    /// Drop entries that do not point at a record of `dataset`.
    pub fn retain_valid(&mut self, dataset: &Dataset) -> usize {
        let before = self.items.len();
        self.items.retain(|index, _| *index < dataset.len());
        before - self.items.len()
    }

    /// Headwords of every known word, ascending by original index.
    pub fn export_known(&self, mapping: &ColumnMapping) -> Option<Vec<String>> {
        let words: Vec<String> = self
            .items
            .values()
            .map(|record| record.field_or_empty(mapping.headword).to_string())
            .collect();
        if words.is_empty() { None } else { Some(words) }
    }

    /// First `limit` unknown headwords of `page`, in page order.
    pub fn export_next_unknown(
        &self,
        page: &[usize],
        dataset: &Dataset,
        mapping: &ColumnMapping,
        limit: usize,
    ) -> Option<Vec<String>> {
        let words: Vec<String> = page
            .iter()
            .copied()
            .filter(|i| !self.contains(*i))
            .take(limit)
            .map(|i| {
                dataset
                    .get(i)
                    .map(|record| record.field_or_empty(mapping.headword).to_string())
                    .unwrap_or_default()
            })
            .collect();
        if words.is_empty() { None } else { Some(words) }
    }
}
