use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::Value;

// =============================================================================
// Phase 1: Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Bar,
    #[default]
    StackedBar,
    Scatter,
    Radar,
}

impl ChartType {
    pub const ALL: [ChartType; 4] = [
        ChartType::Bar,
        ChartType::StackedBar,
        ChartType::Scatter,
        ChartType::Radar,
    ];

    /// Bar-like charts group rows by a categorical axis and honor the
    /// aggregation mode.
    pub fn is_grouped(self) -> bool {
        matches!(self, ChartType::Bar | ChartType::StackedBar)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::StackedBar => "stackedBar",
            ChartType::Scatter => "scatter",
            ChartType::Radar => "radar",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bar" => Ok(ChartType::Bar),
            "stackedBar" | "stacked_bar" | "stacked-bar" => Ok(ChartType::StackedBar),
            "scatter" => Ok(ChartType::Scatter),
            "radar" => Ok(ChartType::Radar),
            other => Err(format!("unknown chart type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Count,
    Sum,
    Average,
}

impl AggregationMode {
    /// Sum and average read the value axis; count never does.
    pub fn needs_value_axis(self) -> bool {
        !matches!(self, AggregationMode::Count)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregationMode::Count => "count",
            AggregationMode::Sum => "sum",
            AggregationMode::Average => "average",
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(AggregationMode::Count),
            "sum" => Ok(AggregationMode::Sum),
            "average" | "avg" | "mean" => Ok(AggregationMode::Average),
            other => Err(format!("unknown aggregation '{}'", other)),
        }
    }
}

/// The contract handed from the resolver to the engine and the renderer.
/// An empty axis key means "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChartConfiguration {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(rename = "xAxisKey", default)]
    pub x_axis_key: String,
    #[serde(rename = "yAxisKey", default)]
    pub y_axis_key: String,
    #[serde(default)]
    pub aggregation: AggregationMode,
}

/// Defaults derived for a chart type. `aggregation: None` leaves the
/// current mode untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialConfiguration {
    pub chart_type: ChartType,
    pub x_axis_key: String,
    pub y_axis_key: String,
    pub aggregation: Option<AggregationMode>,
}

impl PartialConfiguration {
    pub fn apply(self, current: AggregationMode) -> ChartConfiguration {
        ChartConfiguration {
            chart_type: self.chart_type,
            x_axis_key: self.x_axis_key,
            y_axis_key: self.y_axis_key,
            aggregation: self.aggregation.unwrap_or(current),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x axis"),
            Axis::Y => f.write_str("y axis"),
        }
    }
}

// =============================================================================
// Phase 2: Aggregation
// =============================================================================

/// Which column marks a row as churned, and the value that means "churned".
/// `radar_metrics` is the fixed metric list compared by the radar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSchema {
    pub status_field: String,
    pub churned_value: Value,
    pub radar_metrics: Vec<String>,
}

impl SeriesSchema {
    pub fn new(status_field: impl Into<String>, churned_value: impl Into<Value>) -> Self {
        Self {
            status_field: status_field.into(),
            churned_value: churned_value.into(),
            radar_metrics: Vec::new(),
        }
    }

    pub fn with_radar_metrics(mut self, metrics: Vec<String>) -> Self {
        self.radar_metrics = metrics;
        self
    }

    /// Exact match first; otherwise text on either side is compared after
    /// field normalization, so `"1"` from a JSON string matches a numeric
    /// sentinel and vice versa.
    pub fn is_churned(&self, status: Option<&Value>) -> bool {
        let Some(status) = status else {
            return false;
        };
        if *status == self.churned_value {
            return true;
        }
        match (status, &self.churned_value) {
            (Value::Text(raw), sentinel) if !matches!(sentinel, Value::Text(_)) => {
                Value::from_field(raw) == *sentinel
            }
            (status, Value::Text(raw)) if !matches!(status, Value::Text(_)) => {
                Value::from_field(raw) == *status
            }
            _ => false,
        }
    }
}

/// One bar position: the group key with its churned and retained values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPoint {
    pub group: Value,
    pub churned: f64,
    pub retained: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub metric: String,
    pub churned: f64,
    pub retained: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "lowercase")]
pub enum SeriesPoints {
    Grouped(Vec<GroupPoint>),
    Scatter(Vec<ScatterPoint>),
    Radar(Vec<RadarPoint>),
}

impl SeriesPoints {
    pub fn len(&self) -> usize {
        match self {
            SeriesPoints::Grouped(p) => p.len(),
            SeriesPoints::Scatter(p) => p.len(),
            SeriesPoints::Radar(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Engine output for one submit. Never mutated; the next submit replaces it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSeries {
    pub config: ChartConfiguration,
    pub series: SeriesPoints,
    /// Values left out of a numeric computation (missing or non-numeric).
    pub skipped: usize,
}

impl AggregatedSeries {
    /// Nothing to plot: either no rows, or every row was unplottable.
    pub fn no_data(&self) -> bool {
        self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_configuration_serde_names() {
        let config = ChartConfiguration {
            chart_type: ChartType::StackedBar,
            x_axis_key: "Region".to_string(),
            y_axis_key: String::new(),
            aggregation: AggregationMode::Count,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "stackedBar");
        assert_eq!(json["xAxisKey"], "Region");
        assert_eq!(json["yAxisKey"], "");
        assert_eq!(json["aggregation"], "count");

        let back: ChartConfiguration = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_chart_type_from_str() {
        assert_eq!("stacked_bar".parse::<ChartType>(), Ok(ChartType::StackedBar));
        assert_eq!("radar".parse::<ChartType>(), Ok(ChartType::Radar));
        assert!("pie".parse::<ChartType>().is_err());
        assert_eq!("mean".parse::<AggregationMode>(), Ok(AggregationMode::Average));
    }

    #[test]
    fn test_partial_apply_keeps_aggregation() {
        let partial = PartialConfiguration {
            chart_type: ChartType::Radar,
            x_axis_key: String::new(),
            y_axis_key: String::new(),
            aggregation: None,
        };
        let config = partial.apply(AggregationMode::Sum);
        assert_eq!(config.aggregation, AggregationMode::Sum);
    }
}
