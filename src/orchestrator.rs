use std::time::{Duration, Instant};

use crate::aggregate::{aggregate_1d, aggregate_nd, find_max_value, numeric_keys, SummaryRow};
use crate::chart::{ChartDescriptor, ChartKind};
use crate::config::{DashboardConfig, PlaybackConfig, SingleOptionDimension};
use crate::data::{Dataset, Record, RowSet};
use crate::dynamic::{self, DynamicColumnSpec};
use crate::effects::{ChartData, ChartEffect};
use crate::error::DashboardError;
use crate::filter_set::{FilterSet, SelectionDelta};
use crate::filtering::FilteringEngine;
use crate::playback::{RangeSlider, SliderRange};
use crate::sankey::{build_sankey, SankeyContext, SankeyGraph};
use crate::share;
use crate::value::Value;

/// Which rows a sankey is built from.
#[derive(Clone, Copy)]
enum SankeyBasis {
    /// The given rows, as-is.
    Rows,
    /// The authoritative filters, with the sankey's own dimensions ignored.
    Refilter,
}

/// Playback slider bound to one ordered dimension.
#[derive(Debug, Clone)]
struct SliderBinding {
    dimension: String,
    values: Vec<Value>,
    slider: RangeSlider,
}

impl SliderBinding {
    fn from_config(config: &PlaybackConfig) -> Option<Self> {
        if config.values.is_empty() {
            log::warn!("playback on '{}' has no values; slider disabled", config.dimension);
            return None;
        }
        let mut slider = RangeSlider::new(0, config.values.len() - 1)
            .with_rate(Duration::from_millis(config.rate_ms));
        if let Some((begin, end)) = config.default_range {
            slider = slider.with_default_range(begin, end);
        }
        Some(Self {
            dimension: config.dimension.clone(),
            values: config.values.clone(),
            slider,
        })
    }

    fn selection(&self, range: SliderRange) -> Vec<Value> {
        self.values
            .iter()
            .skip(range.begin)
            .take(range.width())
            .cloned()
            .collect()
    }
}

/// Owns the dataset, the filter state and the registered charts of one
/// dashboard, and turns every user interaction into a list of [`ChartEffect`]s.
///
/// Filtered views are row sets over the one dataset. Lens views (filtered by
/// the exclusive and pivot dimensions only) are computed on the side and never
/// replace the authoritative filtered view.
#[derive(Debug, Clone)]
pub struct ChartGroup {
    dataset: Dataset,
    filtered: RowSet,
    filters: FilterSet,
    charts: Vec<ChartDescriptor>,
    engine: FilteringEngine,
    single_option: Option<SingleOptionDimension>,
    pivot_dimensions: Vec<String>,
    other_values: Vec<Value>,
    dynamic_columns: Vec<DynamicColumnSpec>,
    slider: Option<SliderBinding>,
}

impl ChartGroup {
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        for problem in config.validate() {
            log::warn!("{}", problem);
        }

        let DashboardConfig {
            charts,
            single_option_dimension,
            pivot_dimensions,
            other_values,
            dynamic_columns,
            playback,
        } = config;

        let mut group = Self {
            engine: FilteringEngine::new(&charts),
            filtered: dataset.all_rows(),
            dataset,
            filters: FilterSet::new(),
            charts,
            single_option: None,
            pivot_dimensions,
            other_values,
            dynamic_columns,
            slider: playback.as_ref().and_then(SliderBinding::from_config),
        };

        group.regenerate_dynamic_columns(None);
        if let Some(stock) = single_option_dimension {
            group.set_single_option_dimension(stock.dimension_id, stock.default_value);
        }
        group.refilter();
        group
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Register a chart; a chart with the same ID is replaced.
    pub fn add_chart(&mut self, chart: ChartDescriptor) {
        match self.charts.iter_mut().find(|c| c.chart_id == chart.chart_id) {
            Some(existing) => *existing = chart,
            None => self.charts.push(chart),
        }
        self.engine = FilteringEngine::new(&self.charts);
    }

    /// Make `dimension_id` exclusive and select its default value.
    pub fn set_single_option_dimension(&mut self, dimension_id: impl Into<String>, default_value: impl Into<Value>) {
        let stock = SingleOptionDimension {
            dimension_id: dimension_id.into(),
            default_value: default_value.into().coerce_id(),
        };
        self.filters
            .toggle_single(&stock.dimension_id, stock.default_value.clone(), true);
        self.single_option = Some(stock);
        self.refilter();
    }

    pub fn set_pivot_dimensions(&mut self, pivots: Vec<String>) {
        self.pivot_dimensions = pivots;
        self.refilter();
    }

    /// Replace the "other" markers; dynamic columns are re-ranked against them.
    pub fn set_other_values(&mut self, values: Vec<Value>) {
        self.other_values = values;
        self.regenerate_dynamic_columns(None);
        self.refilter();
    }

    pub fn add_dynamic_column(&mut self, spec: DynamicColumnSpec) {
        if let Err(err) = spec.validate() {
            log::warn!("{}", err);
            return;
        }
        self.dynamic_columns.retain(|s| s.target_column != spec.target_column);
        self.dynamic_columns.push(spec);
        self.regenerate_dynamic_columns(None);
        self.refilter();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn charts(&self) -> &[ChartDescriptor] {
        &self.charts
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filtered_rows(&self) -> &[usize] {
        &self.filtered
    }

    pub fn filtered_records(&self) -> impl Iterator<Item = &Record> {
        self.dataset.rows(&self.filtered)
    }

    pub fn chart(&self, chart_id: &str) -> Option<&ChartDescriptor> {
        self.charts.iter().find(|c| c.chart_id == chart_id)
    }

    pub fn is_single_option_dimension(&self, dimension_id: &str) -> bool {
        self.single_option
            .as_ref()
            .map_or(false, |s| s.dimension_id == dimension_id)
    }

    pub fn is_pivot_dimension(&self, dimension_id: &str) -> bool {
        self.pivot_dimensions.iter().any(|p| p == dimension_id)
    }

    fn is_lens_dimension(&self, dimension_id: &str) -> bool {
        self.is_single_option_dimension(dimension_id) || self.is_pivot_dimension(dimension_id)
    }

    // =========================================================================
    // Aggregation
    // =========================================================================

    /// One chart's rollup of the current filtered view, using its own options.
    pub fn summary_1d(&self, chart_id: &str) -> Vec<SummaryRow> {
        match self.chart(chart_id) {
            Some(chart) => self.rows_for(chart, &self.filtered),
            None => {
                log::warn!("{}", DashboardError::UnknownChart(chart_id.to_string()));
                Vec::new()
            }
        }
    }

    /// Indicator column totals of a multivariate chart over the filtered view.
    pub fn summary_nd(&self, chart_id: &str) -> Vec<SummaryRow> {
        match self.chart(chart_id).map(|c| &c.kind) {
            Some(ChartKind::MultivariateBar { columns }) => {
                aggregate_nd(columns, self.dataset.rows(&self.filtered))
            }
            _ => {
                log::warn!(
                    "{}",
                    DashboardError::ChartDefinitionMissing {
                        chart_id: chart_id.to_string(),
                        expected: "multivariate bar",
                    }
                );
                Vec::new()
            }
        }
    }

    /// Sankey graph of the current filters, with the sankey's own dimensions
    /// highlighted instead of filtered.
    pub fn sankey(&self, chart_id: &str) -> SankeyGraph {
        self.sankey_over(chart_id, &self.filtered, SankeyBasis::Refilter)
    }

    fn rows_for(&self, chart: &ChartDescriptor, rows: &[usize]) -> Vec<SummaryRow> {
        match &chart.kind {
            ChartKind::MultivariateBar { columns } => aggregate_nd(columns, self.dataset.rows(rows)),
            _ => aggregate_1d(
                &chart.chart_id,
                self.dataset.rows(rows),
                &chart.aggregate_options(&self.other_values),
            ),
        }
    }

    fn sankey_over(&self, chart_id: &str, rows: &[usize], basis: SankeyBasis) -> SankeyGraph {
        let ctx = SankeyContext {
            engine: &self.engine,
            dataset: &self.dataset,
            filters: &self.filters,
            filtered: rows,
            charts: &self.charts,
            dynamic_columns: &self.dynamic_columns,
            other_values: &self.other_values,
        };
        let basis = match basis {
            SankeyBasis::Rows => Some(rows),
            SankeyBasis::Refilter => None,
        };
        build_sankey(&ctx, chart_id, basis).unwrap_or_else(|err| {
            log::error!("{}", err);
            SankeyGraph::default()
        })
    }

    fn chart_data(&self, chart: &ChartDescriptor, rows: &[usize], basis: SankeyBasis) -> ChartData {
        match &chart.kind {
            ChartKind::Sankey { .. } => ChartData::Sankey(self.sankey_over(&chart.chart_id, rows, basis)),
            ChartKind::Map { sub_geographic } => {
                let opts = chart.aggregate_options(&self.other_values);
                let regions = numeric_keys(aggregate_1d(&chart.chart_id, self.dataset.rows(rows), &opts));
                let sub_regions = sub_geographic
                    .as_deref()
                    .map(|dim| numeric_keys(aggregate_1d(dim, self.dataset.rows(rows), &opts)))
                    .unwrap_or_default();
                let max_value = find_max_value(
                    &chart.chart_id,
                    sub_geographic.as_deref().unwrap_or(&chart.chart_id),
                    self.dataset.records(),
                    &opts,
                );
                ChartData::Map { regions, sub_regions, max_value }
            }
            _ => ChartData::Rows(self.rows_for(chart, rows)),
        }
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    fn filter_with(&self, filters: &FilterSet) -> RowSet {
        let substituted = filters.with_dynamic_substitution(&self.dynamic_columns);
        self.engine.filter_rows(&self.dataset, &substituted, &[])
    }

    fn refilter(&mut self) {
        self.filtered = self.filter_with(&self.filters);
        log::debug!("filtered view has {} of {} rows", self.filtered.len(), self.dataset.len());
    }

    /// Rank dynamic columns over `basis` (the whole dataset when `None`).
    fn regenerate_dynamic_columns(&mut self, basis: Option<&[usize]>) {
        if self.dynamic_columns.is_empty() {
            return;
        }
        let all;
        let basis = match basis {
            Some(rows) => rows,
            None => {
                all = self.dataset.all_rows();
                &all
            }
        };
        dynamic::regenerate(&self.dynamic_columns, basis, &mut self.dataset, &self.other_values);
    }

    fn has_chart(&self, dimension_id: &str) -> bool {
        self.chart(dimension_id).is_some()
    }

    fn marks_for(&self, chart_id: &str, delta: &SelectionDelta) -> Vec<ChartEffect> {
        if !self.chart(chart_id).map_or(false, ChartDescriptor::shows_selection) {
            return Vec::new();
        }
        let removed = delta.removed.iter().map(|v| (v, false));
        let added = delta.added.iter().map(|v| (v, true));
        removed
            .chain(added)
            .map(|(value, selected)| ChartEffect::SelectionMark {
                chart_id: chart_id.to_string(),
                value: value.clone(),
                selected,
            })
            .collect()
    }

    /// A selected mark for every current selection.
    pub fn selection_marks(&self) -> Vec<ChartEffect> {
        self.filters
            .iter()
            .filter(|entry| self.chart(&entry.dimension_id).map_or(false, ChartDescriptor::shows_selection))
            .flat_map(|entry| {
                entry.selected.iter().map(move |value| ChartEffect::SelectionMark {
                    chart_id: entry.dimension_id.clone(),
                    value: value.clone(),
                    selected: true,
                })
            })
            .collect()
    }

    // =========================================================================
    // User operations
    // =========================================================================

    /// Initial draw of every chart from the current filtered view.
    pub fn draw_all(&self) -> Vec<ChartEffect> {
        self.charts
            .iter()
            .map(|chart| ChartEffect::Redraw {
                chart_id: chart.chart_id.clone(),
                data: self.chart_data(chart, &self.filtered, SankeyBasis::Rows),
            })
            .collect()
    }

    /// Click on one value of a chart.
    pub fn select(&mut self, dimension_id: &str, value: impl Into<Value>) -> Vec<ChartEffect> {
        let value = value.into();
        if !self.has_chart(dimension_id) {
            log::warn!("{}", DashboardError::UnknownChart(dimension_id.to_string()));
            return Vec::new();
        }
        log::debug!("select {}={}", dimension_id, value);

        let exclusive = self.is_single_option_dimension(dimension_id);
        let delta = self.filters.toggle_single(dimension_id, value, exclusive);
        self.refilter();

        let mut effects = self.marks_for(dimension_id, &delta);
        effects.extend(self.apply_filter(Some(dimension_id), false, false, true));
        effects
    }

    /// Replace a dimension's selections with a full list (slider ranges).
    /// Never rebuilds charts; only updates them.
    pub fn multi_select<I>(&mut self, dimension_id: &str, values: I) -> Vec<ChartEffect>
    where
        I: IntoIterator<Item = Value>,
    {
        if !self.has_chart(dimension_id) {
            log::error!("{}", DashboardError::UnregisteredDimension(dimension_id.to_string()));
            return Vec::new();
        }

        let delta = self.filters.upsert_selections(dimension_id, values);
        log::debug!(
            "multi-select {}: +{} -{}",
            dimension_id,
            delta.added.len(),
            delta.removed.len()
        );
        self.refilter();

        let mut effects = self.marks_for(dimension_id, &delta);
        effects.extend(self.apply_filter(Some(dimension_id), false, false, false));
        effects
    }

    /// Clear everything and return to the baseline: the exclusive dimension's
    /// default value when there is one, otherwise no filters at all.
    pub fn reset(&mut self) -> Vec<ChartEffect> {
        let mut effects = Vec::new();

        // 1. Playback
        let exclusive = self.single_option.is_some();
        if let Some(binding) = self.slider.as_mut() {
            let was_playing = binding.slider.is_playing();
            let range = binding.slider.reset(exclusive);
            if was_playing {
                effects.push(ChartEffect::PlaybackStopped);
            }
            effects.push(ChartEffect::SliderMoved { range });
        }

        // 2. Map
        if self.charts.iter().any(ChartDescriptor::is_map) {
            effects.push(ChartEffect::RecentreMap);
        }

        // 3. Clear selections
        effects.extend(self.selection_marks().into_iter().map(|mark| match mark {
            ChartEffect::SelectionMark { chart_id, value, .. } => ChartEffect::SelectionMark {
                chart_id,
                value,
                selected: false,
            },
            other => other,
        }));
        self.filters.clear();

        // 4. Baseline
        let mut active = None;
        if let Some(stock) = self.single_option.clone() {
            let delta = self
                .filters
                .toggle_single(&stock.dimension_id, stock.default_value, true);
            effects.extend(self.marks_for(&stock.dimension_id, &delta));
            active = Some(stock.dimension_id);
        }

        self.regenerate_dynamic_columns(None);
        self.refilter();
        effects.extend(self.apply_filter(active.as_deref(), true, false, true));
        effects
    }

    /// Re-run the redraw and update pass for `active` without changing the
    /// filters, e.g. after [`ChartGroup::apply_external_filters`].
    pub fn refresh(&mut self, active: Option<&str>, force_ghosting: bool) -> Vec<ChartEffect> {
        self.apply_filter(active, false, force_ghosting, true)
    }

    /// Seed the filters from a share query. Every chart in `chart_ids` takes
    /// exactly the values the query gives it (none clears it).
    ///
    /// Returns the most significant chart that changed (exclusive, then pivot,
    /// then any other), or `None` when nothing changed. With an exclusive
    /// dimension configured, a query naming none of the charts is ignored.
    pub fn apply_external_filters(&mut self, chart_ids: &[&str], query: &str) -> Option<String> {
        let params = match share::parse_query(query) {
            Ok(params) => params,
            Err(err) => {
                log::warn!("{}", err);
                return None;
            }
        };
        let incoming_for = |id: &str| -> Vec<Value> {
            params
                .iter()
                .filter(|(dim, _)| dim == id)
                .flat_map(|(_, values)| values.iter().cloned())
                .collect()
        };

        if self.single_option.is_some() && chart_ids.iter().all(|id| incoming_for(id).is_empty()) {
            log::info!("share query sets no charts and there is an exclusive dimension; ignoring it");
            return None;
        }

        let mut best_rank = u8::MAX;
        let mut active: Option<String> = None;
        for id in chart_ids {
            let incoming = incoming_for(id);
            let previous = self.filters.get_selections(id).unwrap_or(&[]);
            let changed = previous.iter().any(|v| !incoming.contains(v))
                || incoming.iter().any(|v| !previous.contains(v));
            if !changed {
                continue;
            }

            let rank = if self.is_single_option_dimension(id) {
                1
            } else if self.is_pivot_dimension(id) {
                2
            } else {
                3
            };
            if rank < best_rank {
                best_rank = rank;
                active = Some(id.to_string());
            }
            self.filters.upsert_selections(id, incoming);
        }

        if active.is_some() {
            self.refilter();
        }
        log::info!("share query applied; active chart {:?}", active);
        active
    }

    /// Maps were resized or zoomed: re-push their data, nothing is refiltered.
    pub fn notify_map_resized(&self) -> Vec<ChartEffect> {
        self.charts
            .iter()
            .filter(|c| c.is_map())
            .map(|chart| ChartEffect::Update {
                chart_id: chart.chart_id.clone(),
                data: self.chart_data(chart, &self.filtered, SankeyBasis::Refilter),
            })
            .collect()
    }

    pub fn share_query(&self) -> String {
        share::format_query(&self.filters, &self.charts)
    }

    // =========================================================================
    // Redraw / update pipeline
    // =========================================================================

    fn apply_filter(
        &mut self,
        active: Option<&str>,
        reset: bool,
        force_ghosting: bool,
        allow_redraw: bool,
    ) -> Vec<ChartEffect> {
        let mut effects = self.redraw_all(active, reset, force_ghosting, allow_redraw);
        effects.extend(self.update_all());
        effects
    }

    /// Rebuild charts whose context changed when a lens dimension (exclusive or
    /// pivot) moved, and ghost the exclusive dimension's chart. Does nothing on
    /// dashboards without lens dimensions.
    fn redraw_all(
        &mut self,
        active: Option<&str>,
        reset: bool,
        force_ghosting: bool,
        allow_redraw: bool,
    ) -> Vec<ChartEffect> {
        if self.single_option.is_none() && self.pivot_dimensions.is_empty() {
            return Vec::new();
        }

        let mut active: Option<String> = active.filter(|a| !a.is_empty()).map(str::to_string);
        if reset && active.is_none() {
            active = self.pivot_dimensions.first().cloned();
        }
        let active_is_stock = active.as_deref().map_or(false, |a| self.is_single_option_dimension(a));
        let active_is_pivot = active.as_deref().map_or(false, |a| self.is_pivot_dimension(a));
        let lens_changed = active_is_stock || active_is_pivot;

        let mut effects = Vec::new();

        // 1. Lens views and structural redraws
        if lens_changed && allow_redraw {
            let lens_filters = self.filters.retain_dimensions(|d| self.is_lens_dimension(d));
            let lens_rows = self.filter_with(&lens_filters);
            let stock_rows = if active_is_stock && !self.pivot_dimensions.is_empty() {
                let stock_filters = self
                    .filters
                    .retain_dimensions(|d| self.is_single_option_dimension(d));
                Some(self.filter_with(&stock_filters))
            } else {
                None
            };

            self.regenerate_dynamic_columns(Some(&lens_rows));

            for chart in &self.charts {
                let id = chart.chart_id.as_str();
                let rows: &[usize] = if self.is_single_option_dimension(id) {
                    if self.filters.total_selected() == 1 {
                        effects.push(ChartEffect::Ghost {
                            chart_id: id.to_string(),
                            rows: Vec::new(),
                        });
                    }
                    continue;
                } else if active.as_deref() == Some(id) {
                    continue;
                } else if self.is_pivot_dimension(id) {
                    if !active_is_stock {
                        continue;
                    }
                    stock_rows.as_deref().unwrap_or(&lens_rows)
                } else {
                    &lens_rows
                };

                effects.push(ChartEffect::Redraw {
                    chart_id: id.to_string(),
                    data: self.chart_data(chart, rows, SankeyBasis::Rows),
                });
            }
        }

        // 2. Ghosting of the exclusive dimension
        if let Some(stock) = &self.single_option {
            if force_ghosting || !active_is_stock {
                let ghost_filters = self
                    .filters
                    .retain_dimensions(|d| d != stock.dimension_id);
                match self.chart(&stock.dimension_id) {
                    Some(chart) if chart.kind == ChartKind::Column => {
                        let rows = if ghost_filters.total_selected() == 0 {
                            Vec::new()
                        } else {
                            let ghost_rows = self.filter_with(&ghost_filters);
                            self.rows_for(chart, &ghost_rows)
                        };
                        effects.push(ChartEffect::Ghost {
                            chart_id: stock.dimension_id.clone(),
                            rows,
                        });
                    }
                    Some(chart) => log::warn!(
                        "ghosting is only supported on column charts, '{}' is a {} chart",
                        chart.chart_id,
                        chart.kind.name()
                    ),
                    None => {}
                }
            }
        }

        // 3. Derived columns may have moved under the authoritative view
        if self.filters.contains_dynamic_dimension(&self.dynamic_columns) {
            self.refilter();
        }

        // 4. Re-mark the surviving selections on rebuilt charts
        if lens_changed && !reset {
            effects.extend(self.selection_marks());
        }

        effects
    }

    /// Push the current filtered view to every chart.
    fn update_all(&self) -> Vec<ChartEffect> {
        self.charts
            .iter()
            .map(|chart| ChartEffect::Update {
                chart_id: chart.chart_id.clone(),
                data: self.chart_data(chart, &self.filtered, SankeyBasis::Refilter),
            })
            .collect()
    }

    // =========================================================================
    // Playback
    // =========================================================================

    pub fn slider_range(&self) -> Option<SliderRange> {
        self.slider.as_ref().map(|b| b.slider.range())
    }

    pub fn is_playing(&self) -> bool {
        self.slider.as_ref().map_or(false, |b| b.slider.is_playing())
    }

    /// Start playback; the first frame is applied at `now`.
    pub fn start_playback(&mut self, rate: Option<Duration>, now: Instant) -> Vec<ChartEffect> {
        match self.slider.as_mut() {
            Some(binding) => binding.slider.start_playing(rate),
            None => {
                log::warn!("start_playback called on a dashboard without a playback slider");
                return Vec::new();
            }
        }
        self.tick_playback(now)
    }

    pub fn stop_playback(&mut self) -> Vec<ChartEffect> {
        match self.slider.as_mut() {
            Some(binding) if binding.slider.is_playing() => {
                binding.slider.stop_playing();
                vec![ChartEffect::PlaybackStopped]
            }
            _ => Vec::new(),
        }
    }

    /// Advance playback if a frame is due at `now`.
    pub fn tick_playback(&mut self, now: Instant) -> Vec<ChartEffect> {
        let Some(binding) = self.slider.as_mut() else {
            return Vec::new();
        };
        let Some(range) = binding.slider.tick_at(now) else {
            return Vec::new();
        };
        let stopped = !binding.slider.is_playing();

        let mut effects = self.apply_slider_range(range);
        if stopped {
            effects.push(ChartEffect::PlaybackStopped);
        }
        effects
    }

    pub fn begin_slider_drag(&mut self) {
        if let Some(binding) = self.slider.as_mut() {
            binding.slider.begin_drag();
        }
    }

    /// Releasing a drag resumes playback if it was running when the drag began.
    pub fn end_slider_drag(&mut self, now: Instant) -> Vec<ChartEffect> {
        let resumed = match self.slider.as_mut() {
            Some(binding) => {
                binding.slider.end_drag();
                binding.slider.is_playing()
            }
            None => false,
        };
        if resumed {
            self.tick_playback(now)
        } else {
            Vec::new()
        }
    }

    pub fn click_slider(&mut self, position: usize) -> Vec<ChartEffect> {
        let Some(binding) = self.slider.as_mut() else {
            return Vec::new();
        };
        let was_playing = binding.slider.is_playing();
        let range = binding.slider.click(position);
        let mut effects = Vec::new();
        if was_playing {
            effects.push(ChartEffect::PlaybackStopped);
        }
        effects.extend(self.apply_slider_range(range));
        effects
    }

    pub fn set_slider_range(&mut self, begin: usize, end: usize) -> Vec<ChartEffect> {
        let Some(binding) = self.slider.as_mut() else {
            return Vec::new();
        };
        let range = binding.slider.set_range(begin, end);
        self.apply_slider_range(range)
    }

    fn apply_slider_range(&mut self, range: SliderRange) -> Vec<ChartEffect> {
        let Some(binding) = self.slider.as_ref() else {
            return Vec::new();
        };
        let dimension = binding.dimension.clone();
        let values = binding.selection(range);

        let mut effects = vec![ChartEffect::SliderMoved { range }];
        effects.extend(self.multi_select(&dimension, values));
        effects
    }
}
