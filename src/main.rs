use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossfilter::{logging, ChartEffect, ChartGroup, DashboardConfig, Dataset, Value};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "crossfilter")]
#[command(about = "Replay cross-filter selections over a dataset and print the chart effects as JSON", long_about = None)]
struct Args {
    /// Dashboard config (JSON): charts, exclusive/pivot dimensions, dynamic columns
    #[arg(short, long)]
    config: PathBuf,

    /// Dataset file, CSV or JSON (by extension). Read from stdin when absent
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Share query to seed the filters with (e.g. 'YE=2019&RG=1,2')
    #[arg(short, long)]
    query: Option<String>,

    /// Single-value selection, DIM=VALUE. Applied in order
    #[arg(short, long = "select", value_name = "DIM=VALUE")]
    selects: Vec<String>,

    /// Replace a dimension's selections, DIM=V1,V2,... Applied before --select
    #[arg(short, long = "multi", value_name = "DIM=VALUES")]
    multis: Vec<String>,

    /// Reset the dashboard after all selections
    #[arg(long)]
    reset: bool,

    /// Include the share query of the final filters in the output
    #[arg(long)]
    share: bool,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One replayed operation and what it asked the charts to do.
#[derive(Serialize)]
struct Step {
    operation: String,
    effects: Vec<ChartEffect>,
}

#[derive(Serialize)]
struct Output {
    steps: Vec<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    share_query: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(logging::level_from_verbosity(args.verbose))?;

    // 1. Load config and data
    let config = DashboardConfig::from_path(&args.config)?;
    let dataset = load_dataset(args.data.as_deref())?;
    log::info!("loaded {} records, {} charts", dataset.len(), config.charts.len());

    let mut group = ChartGroup::new(dataset, config);
    let mut steps = vec![Step {
        operation: "draw_all".to_string(),
        effects: group.draw_all(),
    }];

    // 2. Share query
    if let Some(query) = &args.query {
        let chart_ids: Vec<String> = group.charts().iter().map(|c| c.chart_id.clone()).collect();
        let ids: Vec<&str> = chart_ids.iter().map(String::as_str).collect();
        let active = group.apply_external_filters(&ids, query);
        let effects = match active.as_deref() {
            Some(active) => group.refresh(Some(active), true),
            None => Vec::new(),
        };
        steps.push(Step {
            operation: format!("query {}", query),
            effects,
        });
    }

    // 3. Selections
    for raw in &args.multis {
        let (dim, values) = split_assignment(raw)?;
        let values: Vec<Value> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(Value::from_id_str)
            .collect();
        steps.push(Step {
            operation: format!("multi_select {}", raw),
            effects: group.multi_select(dim, values),
        });
    }
    for raw in &args.selects {
        let (dim, value) = split_assignment(raw)?;
        steps.push(Step {
            operation: format!("select {}", raw),
            effects: group.select(dim, Value::from_id_str(value.trim())),
        });
    }

    // 4. Reset
    if args.reset {
        steps.push(Step {
            operation: "reset".to_string(),
            effects: group.reset(),
        });
    }

    let output = Output {
        steps,
        share_query: args.share.then(|| group.share_query()),
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize effects")?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).context("Failed to write effects to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn load_dataset(path: Option<&Path>) -> Result<Dataset> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read data file {}", path.display()))?;
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
            parse_dataset(&text, is_json)
                .with_context(|| format!("Failed to load dataset from {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read data from stdin")?;
            let is_json = text.trim_start().starts_with('[');
            parse_dataset(&text, is_json).context("Failed to load dataset from stdin")
        }
    }
}

fn parse_dataset(text: &str, is_json: bool) -> Result<Dataset> {
    if is_json {
        Dataset::from_json_str(text)
    } else {
        Dataset::from_csv_str(text)
    }
}

fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(dim, _)| !dim.trim().is_empty())
        .map(|(dim, rest)| (dim.trim(), rest))
        .ok_or_else(|| anyhow!("Expected DIM=VALUE, got '{}'", raw))
}
