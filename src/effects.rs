use serde::Serialize;

use crate::aggregate::SummaryRow;
use crate::playback::SliderRange;
use crate::sankey::SankeyGraph;
use crate::value::Value;

/// Data pushed to one chart, shaped by its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    Rows(Vec<SummaryRow>),
    Sankey(SankeyGraph),
    Map {
        regions: Vec<SummaryRow>,
        sub_regions: Vec<SummaryRow>,
        /// Largest region cell over the whole dataset, fixed across filters.
        max_value: f64,
    },
}

impl ChartData {
    pub fn rows(&self) -> Option<&[SummaryRow]> {
        match self {
            ChartData::Rows(rows) => Some(rows),
            ChartData::Map { regions, .. } => Some(regions),
            ChartData::Sankey(_) => None,
        }
    }

    pub fn sankey(&self) -> Option<&SankeyGraph> {
        match self {
            ChartData::Sankey(graph) => Some(graph),
            _ => None,
        }
    }
}

/// One instruction for the rendering layer. A selection call returns these in
/// the order they must be applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ChartEffect {
    /// Rebuild the chart from scratch.
    Redraw { chart_id: String, data: ChartData },
    /// Animate the chart to new values.
    Update { chart_id: String, data: ChartData },
    /// Shaded context series behind the exclusive dimension's chart.
    Ghost { chart_id: String, rows: Vec<SummaryRow> },
    SelectionMark { chart_id: String, value: Value, selected: bool },
    RecentreMap,
    SliderMoved { range: SliderRange },
    PlaybackStopped,
}

impl ChartEffect {
    pub fn chart_id(&self) -> Option<&str> {
        match self {
            ChartEffect::Redraw { chart_id, .. }
            | ChartEffect::Update { chart_id, .. }
            | ChartEffect::Ghost { chart_id, .. }
            | ChartEffect::SelectionMark { chart_id, .. } => Some(chart_id),
            _ => None,
        }
    }

    pub fn is_redraw(&self) -> bool {
        matches!(self, ChartEffect::Redraw { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, ChartEffect::Update { .. })
    }

    pub fn data(&self) -> Option<&ChartData> {
        match self {
            ChartEffect::Redraw { data, .. } | ChartEffect::Update { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// Lookups over an effect list, for hosts and tests.
pub trait EffectsExt {
    fn redraw_of(&self, chart_id: &str) -> Option<&ChartData>;
    fn update_of(&self, chart_id: &str) -> Option<&ChartData>;
    fn ghost_of(&self, chart_id: &str) -> Option<&[SummaryRow]>;
}

impl EffectsExt for [ChartEffect] {
    fn redraw_of(&self, chart_id: &str) -> Option<&ChartData> {
        self.iter().rev().find_map(|e| match e {
            ChartEffect::Redraw { chart_id: id, data } if id == chart_id => Some(data),
            _ => None,
        })
    }

    fn update_of(&self, chart_id: &str) -> Option<&ChartData> {
        self.iter().rev().find_map(|e| match e {
            ChartEffect::Update { chart_id: id, data } if id == chart_id => Some(data),
            _ => None,
        })
    }

    fn ghost_of(&self, chart_id: &str) -> Option<&[SummaryRow]> {
        self.iter().rev().find_map(|e| match e {
            ChartEffect::Ghost { chart_id: id, rows } if id == chart_id => Some(rows.as_slice()),
            _ => None,
        })
    }
}
