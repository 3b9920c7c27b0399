use thiserror::Error;

use crate::ir::{AggregationMode, Axis, ChartType};

/// A submitted axis/aggregation combination breaks a chart rule.
/// Recovered at the UI boundary: the submit is rejected and nothing is computed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{chart_type} chart requires a column on the {axis}")]
    MissingAxis { chart_type: ChartType, axis: Axis },
    #[error("identifier column '{column}' cannot be used on the {axis}")]
    IdentifierAxis { axis: Axis, column: String },
    #[error("column '{column}' on the {axis} is not in the dataset")]
    UnknownColumn { axis: Axis, column: String },
    #[error("{chart_type} chart needs a categorical column on the {axis}, '{column}' is numeric")]
    NotCategorical {
        chart_type: ChartType,
        axis: Axis,
        column: String,
    },
    #[error("{axis} needs a numeric column, '{column}' is categorical")]
    NotNumeric { axis: Axis, column: String },
    #[error("{aggregation} aggregation requires a numeric value on the y axis")]
    ValueAxisRequired { aggregation: AggregationMode },
}

impl ConfigError {
    pub fn axis(&self) -> Axis {
        match self {
            ConfigError::MissingAxis { axis, .. }
            | ConfigError::IdentifierAxis { axis, .. }
            | ConfigError::UnknownColumn { axis, .. }
            | ConfigError::NotCategorical { axis, .. }
            | ConfigError::NotNumeric { axis, .. } => *axis,
            ConfigError::ValueAxisRequired { .. } => Axis::Y,
        }
    }
}

/// The engine was handed a configuration that never passed validation.
/// This is a caller bug, not a user-facing condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid configuration reached the aggregation engine: {0}")]
    ContractViolation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, Error>;
