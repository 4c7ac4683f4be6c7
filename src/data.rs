use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::io::Read;

use crate::value::Value;

/// Default column summed when a chart has no `column_to_sum`.
pub const COUNT_COLUMN: &str = "Count";

/// Indexes into a [`Dataset`]; every filtered view is one of these.
pub type RowSet = Vec<usize>;

/// One flat row of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Numeric reading of a column; missing or non-numeric cells count as zero.
    pub fn number(&self, column: &str) -> f64 {
        self.fields.get(column).and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Only derived (dynamic) columns are written after ingestion.
    pub fn set(&mut self, column: &str, value: Value) {
        match self.fields.get_mut(column) {
            Some(slot) => *slot = value,
            None => {
                self.fields.insert(column.to_string(), value);
            }
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// The full, ordered dataset owned by a chart group.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn get(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Every row index, in order.
    pub fn all_rows(&self) -> RowSet {
        (0..self.records.len()).collect()
    }

    /// Records behind a row set; indexes past the end are skipped.
    pub fn rows<'a>(&'a self, rows: &'a [usize]) -> impl Iterator<Item = &'a Record> + 'a {
        rows.iter().filter_map(move |&i| self.records.get(i))
    }

    /// Read a CSV stream with a header row. Numeric cells become numbers.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() {
            return Err(anyhow!("CSV input has no header row"));
        }

        let mut records = Vec::new();
        for (idx, row) in rdr.records().enumerate() {
            let row = row.with_context(|| format!("Failed to read CSV row {}", idx + 1))?;
            let mut record = Record::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                record.set(header, Value::from_cell(cell));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(anyhow!("Dataset requires at least one data row"));
        }

        Ok(Self { records })
    }

    pub fn from_csv_str(csv: &str) -> Result<Self> {
        Self::from_csv_reader(csv.as_bytes())
    }

    /// Create a Dataset from a JSON Array of flat Objects
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        let mut records = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut record = Record::new();
            for (key, val) in obj {
                let cell = match val {
                    JsonValue::String(s) => Value::Text(s.clone()),
                    JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
                    // Indicator columns (multivariate charts) are compared against 1
                    JsonValue::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
                    JsonValue::Null => continue,
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", key)),
                };
                record.set(key, cell);
            }
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json).context("Failed to parse JSON data")?;
        Self::from_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_parses_numbers() {
        let data = Dataset::from_csv_str("Year,Region,Count\n2020,5,3\n2019,Other,1\n").unwrap();
        assert_eq!(data.len(), 2);
        let first = data.get(0).unwrap();
        assert_eq!(first.get("Year"), Some(&Value::from(2020)));
        assert_eq!(first.number("Count"), 3.0);
        assert_eq!(data.get(1).unwrap().get("Region"), Some(&Value::from("Other")));
    }

    #[test]
    fn test_from_csv_requires_rows() {
        let err = Dataset::from_csv_str("x,y\n").unwrap_err();
        assert!(err.to_string().contains("at least one data row"));
    }

    #[test]
    fn test_from_json() {
        let data = Dataset::from_json_str(
            r#"[{"A": 1, "B": "x", "Flag": true, "Gone": null}, {"A": 2, "B": "y"}]"#,
        )
        .unwrap();
        assert_eq!(data.len(), 2);
        let first = data.get(0).unwrap();
        assert_eq!(first.number("Flag"), 1.0);
        assert!(first.get("Gone").is_none());
    }

    #[test]
    fn test_from_json_rejects_nested() {
        assert!(Dataset::from_json_str(r#"[{"A": [1, 2]}]"#).is_err());
        assert!(Dataset::from_json_str(r#"{"A": 1}"#).is_err());
    }

    #[test]
    fn test_missing_number_defaults_to_zero() {
        let record = Record::from_pairs([("A", Value::from("text"))]);
        assert_eq!(record.number("A"), 0.0);
        assert_eq!(record.number("Missing"), 0.0);
    }

    #[test]
    fn test_rows_skip_out_of_range() {
        let data = Dataset::new(vec![Record::from_pairs([("A", 1)])]);
        assert_eq!(data.rows(&[0, 7]).count(), 1);
    }
}
