// Syntax tree for the chart configuration mini-language

use crate::ir::{AggregationMode, ChartType};

/// A parsed configuration string: one chart command plus optional labels
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSpec {
    pub chart: ChartCommand,
    pub labels: Labels,
}

/// `stackedBar(x: Region, y: Charges, agg: average)`
///
/// Every field except the chart type is an override; `None` means
/// "use the default for this chart type".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartCommand {
    pub chart_type: ChartType,
    pub x: Option<String>,
    pub y: Option<String>,
    pub aggregation: Option<AggregationMode>,
}

impl ChartCommand {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            ..Default::default()
        }
    }
}

/// Plot labels (title, axes)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Labels {
    pub title: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

impl Labels {
    /// Later values win field by field
    pub fn merge(&mut self, other: Labels) {
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.x.is_some() {
            self.x = other.x;
        }
        if other.y.is_some() {
            self.y = other.y;
        }
    }
}
