// Derived columns that keep the most frequent values of a source column and
// fold the long tail into an "other" bucket

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::aggregate::{aggregate_1d, AggregateOptions};
use crate::data::{Dataset, COUNT_COLUMN};
use crate::error::DashboardError;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicColumnSpec {
    pub source_column: String,
    pub target_column: String,
    #[serde(default = "default_rollup_column")]
    pub rollup_column: String,
    pub max_distinct_values: usize,
    #[serde(default = "default_other_value")]
    pub other_value: Value,
}

fn default_rollup_column() -> String {
    COUNT_COLUMN.to_string()
}

fn default_other_value() -> Value {
    Value::from("Other")
}

impl DynamicColumnSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>, max_distinct_values: usize) -> Self {
        Self {
            source_column: source.into(),
            target_column: target.into(),
            rollup_column: default_rollup_column(),
            max_distinct_values,
            other_value: default_other_value(),
        }
    }

    pub fn with_rollup_column(mut self, column: impl Into<String>) -> Self {
        self.rollup_column = column.into();
        self
    }

    pub fn with_other_value(mut self, value: impl Into<Value>) -> Self {
        self.other_value = value.into();
        self
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        let reason = if self.source_column.is_empty() {
            "source column is empty"
        } else if self.target_column.is_empty() {
            "target column is empty"
        } else if self.source_column == self.target_column {
            "source and target columns are the same"
        } else if self.max_distinct_values == 0 {
            "max_distinct_values must be at least 1"
        } else {
            return Ok(());
        };
        Err(DashboardError::MalformedDynamicColumn {
            target: self.target_column.clone(),
            reason: reason.to_string(),
        })
    }
}

/// Rewrite every dynamic target column across the whole dataset.
///
/// The top values are ranked on the `basis` rows only (the data already filtered
/// by everything but the dynamic dimension). Records whose source value is not
/// in the top set, or that lack the source column, get the column's other value.
/// Malformed specs are logged and skipped.
pub fn regenerate(specs: &[DynamicColumnSpec], basis: &[usize], dataset: &mut Dataset, other_values: &[Value]) {
    for spec in specs {
        if let Err(err) = spec.validate() {
            log::warn!("{}", err);
            continue;
        }

        let mut others: Vec<Value> = other_values.to_vec();
        if !others.contains(&spec.other_value) {
            others.push(spec.other_value.clone());
        }

        let opts = AggregateOptions {
            sort_by_value: true,
            max_num_values: spec.max_distinct_values,
            sum_column: Some(spec.rollup_column.as_str()),
            other_values: &others,
        };
        let top: HashSet<Value> = aggregate_1d(&spec.source_column, dataset.rows(basis), &opts)
            .into_iter()
            .map(|row| row.id)
            .collect();

        log::debug!(
            "dynamic column '{}' keeps {} of '{}' over {} rows",
            spec.target_column,
            top.len(),
            spec.source_column,
            basis.len()
        );

        for record in dataset.records_mut() {
            let derived = match record.get(&spec.source_column).map(|v| v.coerced().into_owned()) {
                Some(value) if top.contains(&value) => value,
                _ => spec.other_value.clone(),
            };
            record.set(&spec.target_column, derived);
        }
    }
}
