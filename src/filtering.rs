use std::collections::HashSet;

use crate::chart::{ChartDescriptor, ChartKind};
use crate::data::{Dataset, Record, RowSet};
use crate::filter_set::{FilterEntry, FilterSet};
use crate::value::Value;

/// Applies a [`FilterSet`] to records: AND across dimensions, OR within one.
///
/// Dimensions owned by a multivariate chart are the exception: each selected
/// value names an indicator column, and every one of them must equal 1.
#[derive(Debug, Clone, Default)]
pub struct FilteringEngine {
    multivariate: HashSet<String>,
}

/// One active filter entry, prepared for a single pass over the records.
enum Criterion<'f> {
    OneOf {
        dimension: &'f str,
        values: HashSet<Value>,
        fallback: Option<&'f str>,
    },
    AllIndicators(Vec<String>),
}

impl<'f> Criterion<'f> {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Criterion::OneOf { dimension, values, fallback } => {
                let hit = |column: &str| {
                    record
                        .get(column)
                        .map(|v| values.contains(&*v.coerced()))
                        .unwrap_or(false)
                };
                hit(*dimension) || fallback.map_or(false, |col| hit(col))
            }
            Criterion::AllIndicators(columns) => {
                columns.iter().all(|col| record.number(col) == 1.0)
            }
        }
    }
}

impl FilteringEngine {
    pub fn new(charts: &[ChartDescriptor]) -> Self {
        let multivariate = charts
            .iter()
            .filter(|c| matches!(c.kind, ChartKind::MultivariateBar { .. }))
            .map(|c| c.chart_id.clone())
            .collect();
        Self { multivariate }
    }

    pub fn is_multivariate(&self, dimension_id: &str) -> bool {
        self.multivariate.contains(dimension_id)
    }

    fn prepare<'f>(&self, filters: &'f FilterSet, ignore: &[&str]) -> Vec<Criterion<'f>> {
        filters
            .iter()
            .filter(|entry| entry.is_active() && !ignore.contains(&entry.dimension_id.as_str()))
            .map(|entry| self.criterion(entry))
            .collect()
    }

    fn criterion<'f>(&self, entry: &'f FilterEntry) -> Criterion<'f> {
        if self.is_multivariate(&entry.dimension_id) {
            Criterion::AllIndicators(entry.selected.iter().map(|v| v.to_string()).collect())
        } else {
            Criterion::OneOf {
                dimension: &entry.dimension_id,
                values: entry.selected.iter().cloned().collect(),
                fallback: entry.dynamic_source.as_deref(),
            }
        }
    }

    /// Whether one record survives `filters`.
    pub fn matches(&self, record: &Record, filters: &FilterSet, ignore: &[&str]) -> bool {
        self.prepare(filters, ignore).iter().all(|c| c.matches(record))
    }

    /// Records surviving `filters`, in input order. Dimensions listed in
    /// `ignore` are skipped entirely.
    pub fn filter<'r, I>(&self, records: I, filters: &FilterSet, ignore: &[&str]) -> Vec<&'r Record>
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let criteria = self.prepare(filters, ignore);
        records
            .into_iter()
            .filter(|record| criteria.iter().all(|c| c.matches(record)))
            .collect()
    }

    /// Row indexes of the dataset surviving `filters`.
    pub fn filter_rows(&self, dataset: &Dataset, filters: &FilterSet, ignore: &[&str]) -> RowSet {
        let criteria = self.prepare(filters, ignore);
        dataset
            .iter()
            .enumerate()
            .filter(|(_, record)| criteria.iter().all(|c| c.matches(record)))
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicColumnSpec;

    fn and_or_dataset() -> Dataset {
        Dataset::new(vec![
            Record::from_pairs([("A", Value::from(1)), ("B", Value::from("x")), ("Count", Value::from(1))]),
            Record::from_pairs([("A", Value::from(2)), ("B", Value::from("y")), ("Count", Value::from(1))]),
            Record::from_pairs([("A", Value::from(3)), ("B", Value::from("x")), ("Count", Value::from(1))]),
        ])
    }

    #[test]
    fn test_and_across_or_within() {
        let data = and_or_dataset();
        let mut filters = FilterSet::new();
        filters.upsert_selections("A", vec![Value::from(1), Value::from(2)]);
        filters.upsert_selections("B", vec![Value::from("x")]);
        let engine = FilteringEngine::default();
        assert_eq!(engine.filter_rows(&data, &filters, &[]), vec![0]);
    }

    #[test]
    fn test_ignore_list_skips_dimension() {
        let data = and_or_dataset();
        let mut filters = FilterSet::new();
        filters.upsert_selections("A", vec![Value::from(1)]);
        filters.upsert_selections("B", vec![Value::from("x")]);
        let engine = FilteringEngine::default();
        assert_eq!(engine.filter_rows(&data, &filters, &["A"]), vec![0, 2]);
    }

    #[test]
    fn test_empty_entry_is_inactive() {
        let data = and_or_dataset();
        let mut filters = FilterSet::new();
        filters.upsert_selections("A", Vec::new());
        let engine = FilteringEngine::default();
        assert_eq!(engine.filter(data.iter(), &filters, &[]).len(), 3);
    }

    #[test]
    fn test_digit_text_in_data_matches_numeric_filter() {
        let data = Dataset::new(vec![Record::from_pairs([("RG", Value::from("5"))])]);
        let mut filters = FilterSet::new();
        filters.upsert_selections("RG", vec![Value::from(5)]);
        assert!(FilteringEngine::default().matches(&data.records()[0], &filters, &[]));
    }

    #[test]
    fn test_multivariate_requires_every_indicator() {
        let charts = vec![ChartDescriptor::new(
            "Needs",
            ChartKind::MultivariateBar { columns: vec!["Water".into(), "Food".into()] },
        )];
        let data = Dataset::new(vec![
            Record::from_pairs([("Water", 1), ("Food", 1)]),
            Record::from_pairs([("Water", 1), ("Food", 0)]),
        ]);
        let mut filters = FilterSet::new();
        filters.upsert_selections("Needs", vec![Value::from("Water"), Value::from("Food")]);
        let engine = FilteringEngine::new(&charts);
        assert!(engine.is_multivariate("Needs"));
        assert_eq!(engine.filter_rows(&data, &filters, &[]), vec![0]);
    }

    #[test]
    fn test_dynamic_fallback_recovers_bucketed_source() {
        let data = Dataset::new(vec![
            Record::from_pairs([("Src", Value::from(999)), ("Tgt", Value::from("Other"))]),
            Record::from_pairs([("Src", Value::from(1)), ("Tgt", Value::from(1))]),
        ]);
        let mut filters = FilterSet::new();
        filters.upsert_selections("Tgt", vec![Value::from(999)]);
        let specs = vec![DynamicColumnSpec::new("Src", "Tgt", 1)];
        let engine = FilteringEngine::default();

        assert!(engine.filter_rows(&data, &filters, &[]).is_empty());
        let substituted = filters.with_dynamic_substitution(&specs);
        assert_eq!(engine.filter_rows(&data, &substituted, &[]), vec![0]);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let data = and_or_dataset();
        let mut filters = FilterSet::new();
        filters.upsert_selections("B", vec![Value::from("z")]);
        assert!(FilteringEngine::default().filter_rows(&data, &filters, &[]).is_empty());
    }
}
