// Library exports for churnplot

pub mod classify;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod ir;
pub mod parser;
pub mod render;
pub mod resolve;
pub mod session;
pub mod settings;
pub mod transform;

pub use classify::{classify, Classification, ColumnKind};
pub use data::{Dataset, Row, Value};
pub use error::{ConfigError, EngineError, Error};
pub use ir::{
    AggregatedSeries, AggregationMode, Axis, ChartConfiguration, ChartType, PartialConfiguration,
    SeriesPoints, SeriesSchema,
};
pub use resolve::{defaults_for, validate};
pub use session::Session;
pub use settings::Settings;
pub use transform::aggregate;

use serde::{Deserialize, Serialize};

/// What `render::render_series` emits: a raster image, a vector image, or
/// the computed series itself as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::default(),
        }
    }
}
