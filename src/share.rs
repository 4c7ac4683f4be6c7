// Shareable filter queries of the form `YE=2019&RG=1,2,5`

use nom::{
    bytes::complete::take_while,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, map, opt},
    multi::separated_list0,
    sequence::{preceded, separated_pair},
    IResult,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::chart::ChartDescriptor;
use crate::error::DashboardError;
use crate::filter_set::FilterSet;
use crate::value::Value;

/// Parsed query: dimension IDs with their selected values, in query order.
pub type QueryParams = Vec<(String, Vec<Value>)>;

// Everything that delimits a query part, plus `%` and `+` so they survive decoding
const QUERY_PART: &AsciiSet = &CONTROLS
    .add(b'%')
    .add(b'&')
    .add(b',')
    .add(b'=')
    .add(b'+')
    .add(b'?')
    .add(b'#');

fn param_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '=' && c != '&')(input)
}

fn param_value(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c != '&')(input)
}

fn param(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    map(separated_pair(param_key, char('='), param_value), |(key, raw)| {
        (decode(key), split_values(raw))
    })(input)
}

fn query(input: &str) -> IResult<&str, QueryParams> {
    preceded(opt(char('?')), separated_list0(char('&'), param))(input)
}

/// Parse a share query. A leading `?` is optional; values are separated by a
/// literal comma (an escaped `%2C` stays inside its value) and digit-only
/// values become numbers.
pub fn parse_query(input: &str) -> Result<QueryParams, DashboardError> {
    let input = input.trim();
    match all_consuming(query)(input) {
        Ok((_, params)) => Ok(params),
        Err(err) => Err(DashboardError::InvalidQuery(format!("'{}': {:?}", input, err))),
    }
}

/// Build the share query for the current filters: active entries of
/// registered charts only, in filter order.
pub fn format_query(filters: &FilterSet, charts: &[ChartDescriptor]) -> String {
    filters
        .iter()
        .filter(|entry| entry.is_active())
        .filter(|entry| charts.iter().any(|c| c.chart_id == entry.dimension_id))
        .map(|entry| {
            let values: Vec<String> = entry.selected.iter().map(|v| encode(&v.to_string())).collect();
            format!("{}={}", encode(&entry.dimension_id), values.join(","))
        })
        .collect::<Vec<_>>()
        .join("&")
}

// Split before decoding, so an escaped comma stays part of its value
fn split_values(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(decode)
        .filter_map(|v| {
            let v = v.trim();
            (!v.is_empty()).then(|| Value::from_id_str(v))
        })
        .collect()
}

// `+` is a space in form-encoded queries; a literal plus arrives as `%2B`
fn decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_PART).to_string().replace(' ', "+")
}
