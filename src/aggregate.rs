use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::data::{Record, COUNT_COLUMN};
use crate::value::Value;

/// One aggregated value of a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "ID")]
    pub id: Value,
    #[serde(rename = "Count")]
    pub count: f64,
}

impl SummaryRow {
    pub fn new(id: impl Into<Value>, count: f64) -> Self {
        Self { id: id.into(), count }
    }
}

/// Whether a link belongs to the current selection: no filtering at all,
/// filtering but this link is not selected, or selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Unfiltered,
    NotSelected,
    Selected,
}

impl LinkState {
    pub fn code(self) -> u8 {
        match self {
            LinkState::Unfiltered => 0,
            LinkState::NotSelected => 1,
            LinkState::Selected => 2,
        }
    }
}

impl Serialize for LinkState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// One aggregated (source, target) pair of two dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRow {
    #[serde(rename = "ID1")]
    pub source: Value,
    #[serde(rename = "ID2")]
    pub target: Value,
    #[serde(rename = "Count")]
    pub count: f64,
    #[serde(rename = "IsFiltered")]
    pub state: LinkState,
}

/// How a rollup is summed, ordered and truncated.
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions<'a> {
    /// Count descending when true, ID ascending otherwise.
    pub sort_by_value: bool,
    /// Zero keeps every row.
    pub max_num_values: usize,
    /// Column to sum; `Count` when unset.
    pub sum_column: Option<&'a str>,
    /// IDs that always trail the sorted output.
    pub other_values: &'a [Value],
}

impl<'a> AggregateOptions<'a> {
    pub fn new(other_values: &'a [Value]) -> Self {
        Self {
            sort_by_value: false,
            max_num_values: 0,
            sum_column: None,
            other_values,
        }
    }

    fn sum_column(&self) -> &'a str {
        match self.sum_column {
            Some(col) if !col.is_empty() => col,
            _ => COUNT_COLUMN,
        }
    }

    fn is_other(&self, id: &Value) -> bool {
        self.other_values.contains(id)
    }
}

/// Group key of a record: the cell under `column`, with digit-only text made numeric.
fn group_key(record: &Record, column: &str) -> Option<Value> {
    record.get(column).map(|v| v.coerced().into_owned())
}

fn by_count_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Group `records` by one dimension and sum the options' column per group.
///
/// Records without the dimension are skipped. Rows whose ID is an "other" value
/// are appended after the sorted rows, then the whole list is truncated.
pub fn aggregate_1d<'r, I>(dimension: &str, records: I, opts: &AggregateOptions) -> Vec<SummaryRow>
where
    I: IntoIterator<Item = &'r Record>,
{
    let sum_col = opts.sum_column();
    let mut order: Vec<Value> = Vec::new();
    let mut totals: HashMap<Value, f64> = HashMap::new();
    let mut input_len = 0usize;

    for record in records {
        input_len += 1;
        let Some(key) = group_key(record, dimension) else {
            continue;
        };
        let amount = record.number(sum_col);
        match totals.get_mut(&key) {
            Some(total) => *total += amount,
            None => {
                totals.insert(key.clone(), amount);
                order.push(key);
            }
        }
    }

    let (mut rows, others): (Vec<SummaryRow>, Vec<SummaryRow>) = order
        .into_iter()
        .map(|id| {
            let count = totals.remove(&id).unwrap_or_default();
            SummaryRow { id, count }
        })
        .partition(|row| !opts.is_other(&row.id));

    if opts.sort_by_value {
        rows.sort_by(|a, b| by_count_desc(a.count, b.count));
    } else {
        rows.sort_by(|a, b| a.id.cmp(&b.id));
    }

    warn_if_degenerate(dimension, None, rows.len() + others.len(), input_len);
    finish(rows, others, opts.max_num_values)
}

/// Group `records` by two nested dimensions.
///
/// A pair is an "other" row when either side is an other value. Without
/// sort-by-value the rows are ordered by source, then target.
pub fn aggregate_2d<'r, I>(
    dimension_a: &str,
    dimension_b: &str,
    records: I,
    opts: &AggregateOptions,
) -> Vec<LinkRow>
where
    I: IntoIterator<Item = &'r Record>,
{
    let sum_col = opts.sum_column();
    let mut order: Vec<(Value, Value)> = Vec::new();
    let mut totals: HashMap<(Value, Value), f64> = HashMap::new();
    let mut input_len = 0usize;

    for record in records {
        input_len += 1;
        let (Some(a), Some(b)) = (group_key(record, dimension_a), group_key(record, dimension_b))
        else {
            continue;
        };
        let amount = record.number(sum_col);
        let key = (a, b);
        match totals.get_mut(&key) {
            Some(total) => *total += amount,
            None => {
                totals.insert(key.clone(), amount);
                order.push(key);
            }
        }
    }

    let (mut rows, others): (Vec<LinkRow>, Vec<LinkRow>) = order
        .into_iter()
        .map(|key| {
            let count = totals.remove(&key).unwrap_or_default();
            LinkRow {
                source: key.0,
                target: key.1,
                count,
                state: LinkState::Unfiltered,
            }
        })
        .partition(|row| !opts.is_other(&row.source) && !opts.is_other(&row.target));

    if opts.sort_by_value {
        rows.sort_by(|a, b| by_count_desc(a.count, b.count));
    } else {
        rows.sort_by(|a, b| a.source.cmp(&b.source).then_with(|| a.target.cmp(&b.target)));
    }

    warn_if_degenerate(dimension_a, Some(dimension_b), rows.len() + others.len(), input_len);
    finish(rows, others, opts.max_num_values)
}

/// Sum each named numeric column across all records (multivariate charts).
/// Always sorted by total, descending.
pub fn aggregate_nd<'r, I>(columns: &[String], records: I) -> Vec<SummaryRow>
where
    I: IntoIterator<Item = &'r Record>,
{
    let mut totals = vec![0.0; columns.len()];
    for record in records {
        for (total, col) in totals.iter_mut().zip(columns) {
            *total += record.number(col);
        }
    }

    let mut rows: Vec<SummaryRow> = columns
        .iter()
        .zip(totals)
        .map(|(col, count)| SummaryRow::new(col.as_str(), count))
        .collect();
    rows.sort_by(|a, b| by_count_desc(a.count, b.count));
    rows
}

fn finish<T>(mut rows: Vec<T>, others: Vec<T>, max_num_values: usize) -> Vec<T> {
    rows.extend(others);
    if max_num_values > 0 && rows.len() > max_num_values {
        rows.truncate(max_num_values);
    }
    rows
}

fn warn_if_degenerate(dimension_a: &str, dimension_b: Option<&str>, output: usize, input: usize) {
    if output > 0 && output == input {
        log::warn!(
            "aggregation of '{}'{} produced one row per record ({} rows); check the dimension is not a unique key",
            dimension_a,
            dimension_b.map(|b| format!(" x '{}'", b)).unwrap_or_default(),
            output
        );
    }
}

/// Largest single cell of the two-dimensional rollup, untruncated; zero for no data.
/// Maps take it over the whole dataset so bubble scales hold across slices.
pub fn find_max_value<'r, I>(dimension_a: &str, dimension_b: &str, records: I, opts: &AggregateOptions) -> f64
where
    I: IntoIterator<Item = &'r Record>,
{
    let untruncated = AggregateOptions { max_num_values: 0, ..*opts };
    aggregate_2d(dimension_a, dimension_b, records, &untruncated)
        .iter()
        .map(|r| r.count)
        .fold(0.0, f64::max)
}

/// Force IDs to numbers where they parse (map regions are keyed numerically).
pub fn numeric_keys(rows: Vec<SummaryRow>) -> Vec<SummaryRow> {
    rows.into_iter()
        .map(|row| match row.id.as_f64() {
            Some(n) if !row.id.is_number() => SummaryRow { id: Value::Number(n), count: row.count },
            _ => row,
        })
        .collect()
}
