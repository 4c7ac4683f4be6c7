use serde::Serialize;

use crate::dynamic::DynamicColumnSpec;
use crate::value::Value;

/// Selected value IDs of one dimension.
///
/// An empty `selected` list means the dimension is inactive. The entry itself
/// is kept so callers can tell "touched but cleared" from "never filtered".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterEntry {
    pub dimension_id: String,
    pub selected: Vec<Value>,
    /// Set on substituted copies only: the pre-bucketing column to retry against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_source: Option<String>,
}

impl FilterEntry {
    pub fn new(dimension_id: impl Into<String>) -> Self {
        Self {
            dimension_id: dimension_id.into(),
            selected: Vec::new(),
            dynamic_source: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic_source.is_some()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.selected.contains(value)
    }
}

/// What a selection call changed, in the order the changes were applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionDelta {
    pub added: Vec<Value>,
    pub removed: Vec<Value>,
}

impl SelectionDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered dimension → selections map, unique by dimension ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, dimension_id: &str) -> Option<&FilterEntry> {
        self.entries.iter().find(|e| e.dimension_id == dimension_id)
    }

    fn entry_mut(&mut self, dimension_id: &str) -> &mut FilterEntry {
        let idx = match self.entries.iter().position(|e| e.dimension_id == dimension_id) {
            Some(idx) => idx,
            None => {
                self.entries.push(FilterEntry::new(dimension_id));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    /// Current selections of a dimension; `None` when it was never filtered.
    pub fn get_selections(&self, dimension_id: &str) -> Option<&[Value]> {
        self.entry(dimension_id).map(|e| e.selected.as_slice())
    }

    /// Replace a dimension's selections with `values`, keeping the order of
    /// values that stay selected and appending new ones.
    ///
    /// Values go through ID coercion; duplicates are dropped.
    pub fn upsert_selections<I>(&mut self, dimension_id: &str, values: I) -> SelectionDelta
    where
        I: IntoIterator<Item = Value>,
    {
        let mut incoming: Vec<Value> = Vec::new();
        for value in values {
            let value = value.coerce_id();
            if !incoming.contains(&value) {
                incoming.push(value);
            }
        }

        let entry = self.entry_mut(dimension_id);
        let mut delta = SelectionDelta::default();

        entry.selected.retain(|old| {
            let keep = incoming.contains(old);
            if !keep {
                delta.removed.push(old.clone());
            }
            keep
        });
        for value in incoming {
            if !entry.selected.contains(&value) {
                delta.added.push(value.clone());
                entry.selected.push(value);
            }
        }
        delta
    }

    /// Click semantics. An exclusive (single-option) dimension always ends up
    /// holding exactly `value`; any other dimension adds or removes it.
    pub fn toggle_single(&mut self, dimension_id: &str, value: Value, exclusive: bool) -> SelectionDelta {
        let value = value.coerce_id();
        let current = self.get_selections(dimension_id).unwrap_or(&[]);

        let next: Vec<Value> = if exclusive {
            vec![value]
        } else if current.contains(&value) {
            current.iter().filter(|v| **v != value).cloned().collect()
        } else {
            current.iter().cloned().chain(std::iter::once(value)).collect()
        };
        self.upsert_selections(dimension_id, next)
    }

    /// Copy with every entry on a dynamic target column tagged with its source column.
    pub fn with_dynamic_substitution(&self, specs: &[DynamicColumnSpec]) -> FilterSet {
        let mut copy = self.clone();
        for entry in &mut copy.entries {
            if let Some(spec) = specs.iter().find(|s| s.target_column == entry.dimension_id) {
                entry.dynamic_source = Some(spec.source_column.clone());
            }
        }
        copy
    }

    /// Copy keeping only the dimensions accepted by `keep`.
    pub fn retain_dimensions<F>(&self, keep: F) -> FilterSet
    where
        F: Fn(&str) -> bool,
    {
        FilterSet {
            entries: self
                .entries
                .iter()
                .filter(|e| keep(&e.dimension_id))
                .cloned()
                .collect(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn total_selected(&self) -> usize {
        self.entries.iter().map(|e| e.selected.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterEntry> {
        self.entries.iter()
    }

    /// True when no dimension has an active selection.
    pub fn is_empty(&self) -> bool {
        !self.entries.iter().any(FilterEntry::is_active)
    }

    pub fn contains_dynamic_dimension(&self, specs: &[DynamicColumnSpec]) -> bool {
        self.entries
            .iter()
            .filter(|e| e.is_active())
            .any(|e| specs.iter().any(|s| s.target_column == e.dimension_id))
    }

    /// Whether any active dimension is rejected by `inside`.
    pub fn has_active_dimension_outside<F>(&self, inside: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        self.entries
            .iter()
            .any(|e| e.is_active() && !inside(&e.dimension_id))
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a FilterEntry;
    type IntoIter = std::slice::Iter<'a, FilterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
