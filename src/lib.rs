// Library exports for crossfilter

pub mod value;
pub mod data;
pub mod chart;
pub mod config;
pub mod error;
pub mod logging;

// Filtering and aggregation core
pub mod aggregate;
pub mod filter_set;
pub mod filtering;
pub mod dynamic;
pub mod sankey;

// Chart group coordination
pub mod effects;
pub mod orchestrator;
pub mod playback;
pub mod share;

pub use aggregate::{LinkRow, LinkState, SummaryRow};
pub use chart::{ChartDescriptor, ChartKind, LookupEntry};
pub use config::{DashboardConfig, PlaybackConfig, SingleOptionDimension};
pub use data::{Dataset, Record, RowSet};
pub use dynamic::DynamicColumnSpec;
pub use effects::{ChartData, ChartEffect, EffectsExt};
pub use error::DashboardError;
pub use filter_set::{FilterEntry, FilterSet, SelectionDelta};
pub use filtering::FilteringEngine;
pub use orchestrator::ChartGroup;
pub use playback::{RangeSlider, SliderRange};
pub use sankey::{SankeyGraph, SankeyNode};
pub use value::Value;
