// Sankey graph building: links from a two-dimensional rollup, nodes from the links

use serde::Serialize;

use crate::aggregate::{aggregate_2d, AggregateOptions, LinkRow, LinkState};
use crate::chart::{ChartDescriptor, ChartKind};
use crate::data::{Dataset, RowSet};
use crate::dynamic::DynamicColumnSpec;
use crate::error::DashboardError;
use crate::filter_set::FilterSet;
use crate::filtering::FilteringEngine;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyNode {
    #[serde(rename = "ID")]
    pub id: Value,
    #[serde(rename = "ChartID")]
    pub chart_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Count")]
    pub count: f64,
    #[serde(rename = "CountFiltered")]
    pub count_filtered: f64,
    #[serde(rename = "IsFiltering")]
    pub is_filtering: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SankeyGraph {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<LinkRow>,
}

impl SankeyGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Everything the builder reads from a chart group.
pub struct SankeyContext<'a> {
    pub engine: &'a FilteringEngine,
    pub dataset: &'a Dataset,
    pub filters: &'a FilterSet,
    /// The group's current filtered view.
    pub filtered: &'a [usize],
    pub charts: &'a [ChartDescriptor],
    pub dynamic_columns: &'a [DynamicColumnSpec],
    pub other_values: &'a [Value],
}

/// One side (source or target) of the sankey.
struct Side<'a> {
    dimension: &'a str,
    selected: &'a [Value],
    dynamic: Option<&'a DynamicColumnSpec>,
}

impl<'a> Side<'a> {
    fn other_is_selected(&self) -> bool {
        self.dynamic
            .map(|spec| self.selected.contains(&spec.other_value))
            .unwrap_or(false)
    }
}

/// Build the sankey graph for `chart_id`.
///
/// With `basis` set, links are rolled up over those rows. Otherwise the group's
/// filters are applied afresh with the sankey's own dimensions ignored, so that
/// a selected node keeps its links and is highlighted instead.
pub fn build_sankey(
    ctx: &SankeyContext,
    chart_id: &str,
    basis: Option<&[usize]>,
) -> Result<SankeyGraph, DashboardError> {
    let chart = ctx
        .charts
        .iter()
        .find(|c| c.chart_id == chart_id)
        .ok_or_else(|| DashboardError::ChartDefinitionMissing {
            chart_id: chart_id.to_string(),
            expected: "sankey",
        })?;
    let ChartKind::Sankey { source, target } = &chart.kind else {
        return Err(DashboardError::ChartDefinitionMissing {
            chart_id: chart_id.to_string(),
            expected: "sankey",
        });
    };

    // 1. Which sides are being filtered on
    let source_side = side(ctx, source);
    let target_side = side(ctx, target);
    let is_filtering = !source_side.selected.is_empty() || !target_side.selected.is_empty();

    // 2. Dimensions the sankey must not be narrowed by
    let mut ignore: Vec<&str> = vec![source.as_str(), target.as_str()];
    if is_filtering {
        for s in [&source_side, &target_side] {
            if let Some(spec) = s.dynamic {
                ignore.push(spec.source_column.as_str());
            }
        }
    }

    // 3. Roll up the links
    let rows: RowSet = match basis {
        Some(rows) => rows.to_vec(),
        None => {
            let substituted = ctx.filters.with_dynamic_substitution(ctx.dynamic_columns);
            ctx.engine.filter_rows(ctx.dataset, &substituted, &ignore)
        }
    };
    let opts = AggregateOptions {
        sort_by_value: chart.sort_by_value,
        max_num_values: 0,
        sum_column: None,
        other_values: ctx.other_values,
    };
    let mut links = aggregate_2d(source, target, ctx.dataset.rows(&rows), &opts);

    // 4. Tri-state highlight
    for link in &mut links {
        link.state = if !is_filtering {
            LinkState::Unfiltered
        } else if (source_side.selected.is_empty() || source_side.selected.contains(&link.source))
            && (target_side.selected.is_empty() || target_side.selected.contains(&link.target))
        {
            LinkState::Selected
        } else {
            LinkState::NotSelected
        };
    }

    // 5. Selected values folded into "other" still need their links
    append_bucketed_links(ctx, &source_side, source, target, &opts, &mut links, |l| &l.source);
    append_bucketed_links(ctx, &target_side, source, target, &opts, &mut links, |l| &l.target);

    links.retain(|l| l.count > 0.0);

    // 6. Nodes
    let mut nodes = node_rollup(&links, |l| &l.source, source, chart.sort_by_value, ctx, is_filtering);
    nodes.extend(node_rollup(&links, |l| &l.target, target, chart.sort_by_value, ctx, is_filtering));

    Ok(SankeyGraph { nodes, links })
}

fn side<'a>(ctx: &SankeyContext<'a>, dimension: &'a str) -> Side<'a> {
    Side {
        dimension,
        selected: ctx.filters.get_selections(dimension).unwrap_or(&[]),
        dynamic: ctx.dynamic_columns.iter().find(|s| s.target_column == dimension),
    }
}

fn append_bucketed_links<F>(
    ctx: &SankeyContext,
    side: &Side,
    source: &str,
    target: &str,
    opts: &AggregateOptions,
    links: &mut Vec<LinkRow>,
    id_of: F,
) where
    F: Fn(&LinkRow) -> &Value,
{
    let Some(spec) = side.dynamic else { return };
    if side.other_is_selected() {
        return;
    }

    let missing: Vec<&Value> = side
        .selected
        .iter()
        .filter(|v| !links.iter().any(|l| id_of(l) == *v))
        .collect();
    if missing.is_empty() {
        return;
    }

    let extra_rows = ctx.dataset.rows(ctx.filtered).filter(|record| {
        record
            .get(&spec.source_column)
            .map(|v| missing.contains(&&*v.coerced()))
            .unwrap_or(false)
    });
    let extra = aggregate_2d(source, target, extra_rows, opts);
    log::debug!(
        "sankey side '{}' recovered {} links for {} bucketed selections",
        side.dimension,
        extra.len(),
        missing.len()
    );
    links.extend(extra.into_iter().map(|l| LinkRow { state: LinkState::Selected, ..l }));
}

fn node_rollup<F>(
    links: &[LinkRow],
    id_of: F,
    dimension: &str,
    sort_by_value: bool,
    ctx: &SankeyContext,
    is_filtering: bool,
) -> Vec<SankeyNode>
where
    F: Fn(&LinkRow) -> &Value,
{
    let mut totals: Vec<(Value, f64, f64)> = Vec::new();
    for link in links {
        let id = id_of(link);
        let filtered = if link.state == LinkState::Selected { link.count } else { 0.0 };
        match totals.iter_mut().find(|(v, _, _)| v == id) {
            Some(entry) => {
                entry.1 += link.count;
                entry.2 += filtered;
            }
            None => totals.push((id.clone(), link.count, filtered)),
        }
    }

    if sort_by_value {
        totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    } else {
        totals.sort_by(|a, b| a.0.cmp(&b.0));
    }

    let names = ctx.charts.iter().find(|c| c.chart_id == dimension);
    totals
        .into_iter()
        .filter(|(_, count, _)| *count > 0.0)
        .map(|(id, count, count_filtered)| SankeyNode {
            name: names.map(|c| c.title_for(&id).to_string()).unwrap_or_default(),
            id,
            chart_id: dimension.to_string(),
            count,
            count_filtered,
            is_filtering,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::LookupEntry;
    use crate::data::Record;

    fn fixture() -> (Dataset, Vec<ChartDescriptor>) {
        let pairs = [(1, 10, 3), (1, 20, 1), (2, 10, 2)];
        let data = Dataset::new(
            pairs
                .iter()
                .map(|(o, d, c)| Record::from_pairs([("OR", *o), ("DE", *d), ("Count", *c)]))
                .collect(),
        );
        let charts = vec![
            ChartDescriptor::new("SK", ChartKind::Sankey { source: "OR".into(), target: "DE".into() }),
            ChartDescriptor::new("OR", ChartKind::Bar).with_names(vec![LookupEntry {
                id: Value::from(1),
                title: "Kenya".into(),
            }]),
        ];
        (data, charts)
    }

    fn build(data: &Dataset, charts: &[ChartDescriptor], filters: &FilterSet, dynamic: &[DynamicColumnSpec]) -> SankeyGraph {
        let engine = FilteringEngine::new(charts);
        let filtered = engine.filter_rows(data, &filters.with_dynamic_substitution(dynamic), &[]);
        let others = vec![Value::from("Other")];
        let ctx = SankeyContext {
            engine: &engine,
            dataset: data,
            filters,
            filtered: &filtered,
            charts,
            dynamic_columns: dynamic,
            other_values: &others,
        };
        build_sankey(&ctx, "SK", None).unwrap()
    }

    #[test]
    fn test_unfiltered_graph() {
        let (data, charts) = fixture();
        let graph = build(&data, &charts, &FilterSet::new(), &[]);
        assert_eq!(graph.links.len(), 3);
        assert!(graph.links.iter().all(|l| l.state == LinkState::Unfiltered));
        let kenya = &graph.nodes[0];
        assert_eq!((kenya.name.as_str(), kenya.count, kenya.chart_id.as_str()), ("Kenya", 4.0, "OR"));
        // two source nodes, two target nodes
        assert_eq!(graph.nodes.len(), 4);
    }

    #[test]
    fn test_selection_highlights_instead_of_removing() {
        let (data, charts) = fixture();
        let mut filters = FilterSet::new();
        filters.upsert_selections("OR", vec![Value::from(1)]);
        let graph = build(&data, &charts, &filters, &[]);
        assert_eq!(graph.links.len(), 3);
        let states: Vec<u8> = graph.links.iter().map(|l| l.state.code()).collect();
        assert_eq!(states, vec![2, 2, 1]);
        let dest_10 = graph.nodes.iter().find(|n| n.chart_id == "DE" && n.id == Value::from(10)).unwrap();
        assert_eq!((dest_10.count, dest_10.count_filtered), (5.0, 3.0));
        assert!(dest_10.is_filtering);
    }

    #[test]
    fn test_bucketed_selection_recovers_links() {
        let data = Dataset::new(vec![
            Record::from_pairs([("Raw", Value::from(999)), ("OR", Value::from("Other")), ("DE", Value::from(10)), ("Count", Value::from(2))]),
            Record::from_pairs([("Raw", Value::from(1)), ("OR", Value::from(1)), ("DE", Value::from(10)), ("Count", Value::from(5))]),
        ]);
        let charts = vec![ChartDescriptor::new("SK", ChartKind::Sankey { source: "OR".into(), target: "DE".into() })];
        let dynamic = vec![DynamicColumnSpec::new("Raw", "OR", 1)];
        let mut filters = FilterSet::new();
        filters.upsert_selections("OR", vec![Value::from(999)]);

        let graph = build(&data, &charts, &filters, &dynamic);
        let recovered: Vec<&LinkRow> = graph.links.iter().filter(|l| l.source == Value::from("Other")).collect();
        assert_eq!(recovered.len(), 2);
        assert!(recovered.iter().any(|l| l.state == LinkState::Selected));
    }

    #[test]
    fn test_missing_definition() {
        let (data, charts) = fixture();
        let engine = FilteringEngine::new(&charts);
        let filters = FilterSet::new();
        let ctx = SankeyContext {
            engine: &engine,
            dataset: &data,
            filters: &filters,
            filtered: &[],
            charts: &charts,
            dynamic_columns: &[],
            other_values: &[],
        };
        assert!(matches!(
            build_sankey(&ctx, "OR", None),
            Err(DashboardError::ChartDefinitionMissing { .. })
        ));
        assert!(build_sankey(&ctx, "XX", Some(&[])).is_err());
    }
}
