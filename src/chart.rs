// Chart descriptors: the per-widget metadata the engine needs for filtering and aggregation

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateOptions;
use crate::value::Value;

/// The kind of widget behind a chart, with the extra dimensions some kinds need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    /// Links flow from the `source` dimension to the `target` dimension.
    Sankey { source: String, target: String },
    /// Region counts keyed by numeric region ID, optionally with a finer level.
    Map {
        #[serde(default)]
        sub_geographic: Option<String>,
    },
    Column,
    /// Several indicator columns (values 0/1) summed side by side on one chart.
    MultivariateBar { columns: Vec<String> },
    TreeMap,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Line => "line",
            ChartKind::Sankey { .. } => "sankey",
            ChartKind::Map { .. } => "map",
            ChartKind::Column => "column",
            ChartKind::MultivariateBar { .. } => "multivariate bar",
            ChartKind::TreeMap => "tree map",
        }
    }
}

/// ID → display title pair from a chart's lookup list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub id: Value,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    /// Also the dimension (column) this chart visualises and filters on.
    #[serde(rename = "id")]
    pub chart_id: String,
    pub kind: ChartKind,
    #[serde(default)]
    pub sort_by_value: bool,
    /// Zero means no limit.
    #[serde(default)]
    pub max_num_values: usize,
    #[serde(default)]
    pub column_to_sum: Option<String>,
    #[serde(default)]
    pub names: Vec<LookupEntry>,
}

impl ChartDescriptor {
    pub fn new(chart_id: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            chart_id: chart_id.into(),
            kind,
            sort_by_value: false,
            max_num_values: 0,
            column_to_sum: None,
            names: Vec::new(),
        }
    }

    pub fn with_sort_by_value(mut self, sort_by_value: bool) -> Self {
        self.sort_by_value = sort_by_value;
        self
    }

    pub fn with_max_num_values(mut self, max_num_values: usize) -> Self {
        self.max_num_values = max_num_values;
        self
    }

    pub fn with_column_to_sum(mut self, column: impl Into<String>) -> Self {
        self.column_to_sum = Some(column.into());
        self
    }

    pub fn with_names(mut self, names: Vec<LookupEntry>) -> Self {
        self.names = names;
        self
    }

    pub fn is_multivariate(&self) -> bool {
        matches!(self.kind, ChartKind::MultivariateBar { .. })
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, ChartKind::Map { .. })
    }

    /// Maps have no per-value selection marks to toggle.
    pub fn shows_selection(&self) -> bool {
        !self.is_map()
    }

    /// Title for a value ID; unknown IDs get an empty title. Both sides are
    /// ID-coerced, so a lookup written as `"5"` names the group key `5`.
    pub fn title_for(&self, id: &Value) -> &str {
        let id = id.coerced();
        self.names
            .iter()
            .find(|entry| entry.id.coerced() == id)
            .map(|entry| entry.title.as_str())
            .unwrap_or("")
    }

    pub fn aggregate_options<'a>(&'a self, other_values: &'a [Value]) -> AggregateOptions<'a> {
        AggregateOptions {
            sort_by_value: self.sort_by_value,
            max_num_values: self.max_num_values,
            sum_column: self.column_to_sum.as_deref(),
            other_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_descriptor() {
        let json = r#"{
            "id": "SK",
            "kind": {"type": "sankey", "source": "OR", "target": "DE"},
            "sort_by_value": true
        }"#;
        let chart: ChartDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(chart.chart_id, "SK");
        assert!(chart.sort_by_value);
        assert_eq!(chart.max_num_values, 0);
        assert_eq!(
            chart.kind,
            ChartKind::Sankey { source: "OR".to_string(), target: "DE".to_string() }
        );
    }

    #[test]
    fn test_unit_kind_and_map_defaults() {
        let bar: ChartDescriptor =
            serde_json::from_str(r#"{"id": "RG", "kind": {"type": "bar"}}"#).unwrap();
        assert_eq!(bar.kind, ChartKind::Bar);
        let map: ChartDescriptor =
            serde_json::from_str(r#"{"id": "MP", "kind": {"type": "map"}}"#).unwrap();
        assert_eq!(map.kind, ChartKind::Map { sub_geographic: None });
        assert!(!map.shows_selection());
    }

    #[test]
    fn test_title_lookup_miss_is_empty() {
        let chart = ChartDescriptor::new("RG", ChartKind::Pie).with_names(vec![LookupEntry {
            id: Value::from(1),
            title: "North".to_string(),
        }]);
        assert_eq!(chart.title_for(&Value::from(1)), "North");
        assert_eq!(chart.title_for(&Value::from(2)), "");
    }

    #[test]
    fn test_title_lookup_coerces_digit_ids() {
        let json = r#"{
            "id": "RG",
            "kind": {"type": "bar"},
            "names": [{"id": "5", "title": "Coast"}, {"id": "05A", "title": "Lake"}]
        }"#;
        let chart: ChartDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(chart.title_for(&Value::from(5)), "Coast");
        assert_eq!(chart.title_for(&Value::from("5")), "Coast");
        assert_eq!(chart.title_for(&Value::from("05A")), "Lake");
    }
}
