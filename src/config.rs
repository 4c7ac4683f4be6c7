use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::chart::ChartDescriptor;
use crate::dynamic::DynamicColumnSpec;
use crate::error::DashboardError;
use crate::value::Value;

/// The one exclusive dimension of a dashboard (usually a year or period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleOptionDimension {
    pub dimension_id: String,
    pub default_value: Value,
}

/// Binds the playback slider to an ordered dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub dimension: String,
    /// Slider positions, in order; position `i` selects `values[i]`.
    pub values: Vec<Value>,
    #[serde(default = "default_rate_ms")]
    pub rate_ms: u64,
    #[serde(default)]
    pub default_range: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub charts: Vec<ChartDescriptor>,
    #[serde(default)]
    pub single_option_dimension: Option<SingleOptionDimension>,
    #[serde(default)]
    pub pivot_dimensions: Vec<String>,
    #[serde(default = "default_other_values")]
    pub other_values: Vec<Value>,
    #[serde(default)]
    pub dynamic_columns: Vec<DynamicColumnSpec>,
    #[serde(default)]
    pub playback: Option<PlaybackConfig>,
}

fn default_rate_ms() -> u64 { 100 }
fn default_other_values() -> Vec<Value> { vec![Value::from("Other")] }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            charts: Vec::new(),
            single_option_dimension: None,
            pivot_dimensions: Vec::new(),
            other_values: default_other_values(),
            dynamic_columns: Vec::new(),
            playback: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse dashboard config")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    fn has_chart(&self, id: &str) -> bool {
        self.charts.iter().any(|c| c.chart_id == id)
    }

    /// Every configuration problem found. None of them is fatal: the chart
    /// group warns about each and keeps going.
    pub fn validate(&self) -> Vec<DashboardError> {
        let mut problems = Vec::new();

        if let Some(stock) = &self.single_option_dimension {
            if !self.has_chart(&stock.dimension_id) {
                problems.push(DashboardError::UnknownChart(stock.dimension_id.clone()));
            }
        }
        for pivot in &self.pivot_dimensions {
            if !self.has_chart(pivot) {
                problems.push(DashboardError::UnknownChart(pivot.clone()));
            }
        }
        for spec in &self.dynamic_columns {
            if let Err(err) = spec.validate() {
                problems.push(err);
            }
        }
        if let Some(playback) = &self.playback {
            if !self.has_chart(&playback.dimension) {
                problems.push(DashboardError::UnknownChart(playback.dimension.clone()));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_json_str("{}").unwrap();
        assert_eq!(config.other_values, vec![Value::from("Other")]);
        assert!(config.single_option_dimension.is_none());
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "charts": [
                {"id": "YE", "kind": {"type": "column"}},
                {"id": "RG", "kind": {"type": "bar"}, "sort_by_value": true, "max_num_values": 5}
            ],
            "single_option_dimension": {"dimension_id": "YE", "default_value": 2020},
            "pivot_dimensions": ["RG"],
            "other_values": ["Other", "Unknown"],
            "playback": {"dimension": "YE", "values": [2018, 2019, 2020]}
        }"#;
        let config = DashboardConfig::from_json_str(json).unwrap();
        assert_eq!(config.charts.len(), 2);
        assert_eq!(config.charts[0].kind, ChartKind::Column);
        assert_eq!(config.playback.as_ref().map(|p| p.rate_ms), Some(100));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let config = DashboardConfig {
            single_option_dimension: Some(SingleOptionDimension {
                dimension_id: "YE".into(),
                default_value: Value::from(2020),
            }),
            pivot_dimensions: vec!["AG".into()],
            dynamic_columns: vec![DynamicColumnSpec::new("A", "B", 0)],
            ..Default::default()
        };
        let problems = config.validate();
        assert_eq!(problems.len(), 3);
        assert_eq!(problems[0], DashboardError::UnknownChart("YE".into()));
    }

    #[test]
    fn test_bad_json_has_context() {
        let err = DashboardConfig::from_json_str("{").unwrap_err();
        assert!(err.to_string().contains("Failed to parse dashboard config"));
    }
}
