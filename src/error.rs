use thiserror::Error;

/// Problems a dashboard can run into without it being fatal for the whole group.
///
/// None of these escape the user-facing selection calls: the chart group logs
/// them and carries on with an empty result for the operation at hand.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("no chart is registered for dimension '{0}'")]
    UnknownChart(String),

    #[error("dynamic column '{target}' is malformed: {reason}")]
    MalformedDynamicColumn { target: String, reason: String },

    #[error("multi-select called on unregistered dimension '{0}'")]
    UnregisteredDimension(String),

    #[error("could not find the {expected} chart definition for '{chart_id}'")]
    ChartDefinitionMissing {
        chart_id: String,
        expected: &'static str,
    },

    #[error("invalid filter query: {0}")]
    InvalidQuery(String),
}
