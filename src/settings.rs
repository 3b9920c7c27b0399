use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::classify::Classification;
use crate::data::Value;
use crate::ir::SeriesSchema;
use crate::RenderOptions;

/// Dataset schema and output settings, usually loaded from a JSON file.
///
/// ```json
/// { "id_column": "CustomerID", "status_field": "Churn", "churned_value": "Yes",
///   "radar_metrics": ["Tenure", "MonthlyCharges"], "render": { "type": "svg" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_status_field")]
    pub status_field: String,
    #[serde(default = "default_churned_value")]
    pub churned_value: Value,
    #[serde(default)]
    pub radar_metrics: Vec<String>,
    #[serde(default)]
    pub render: RenderOptions,
}

fn default_id_column() -> String { "CustomerID".to_string() }
fn default_status_field() -> String { "Churn".to_string() }
fn default_churned_value() -> Value { Value::Text("Yes".to_string()) }

impl Default for Settings {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            status_field: default_status_field(),
            churned_value: default_churned_value(),
            radar_metrics: Vec::new(),
            render: RenderOptions::default(),
        }
    }
}

impl Settings {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid settings file '{}'", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse settings JSON")
    }

    /// The churned sentinel as it will appear in ingested rows: text values
    /// go through the same normalization as CSV fields, so "1" matches a
    /// numeric status column.
    pub fn churned_value(&self) -> Value {
        match &self.churned_value {
            Value::Text(s) => Value::from_field(s),
            other => other.clone(),
        }
    }

    /// Build the engine schema for a loaded dataset. Without configured radar
    /// metrics, every numeric column except the status field is compared.
    pub fn schema(&self, classification: &Classification) -> SeriesSchema {
        let radar_metrics = if self.radar_metrics.is_empty() {
            classification
                .numeric
                .iter()
                .filter(|c| **c != self.status_field)
                .cloned()
                .collect()
        } else {
            self.radar_metrics.clone()
        };

        SeriesSchema {
            status_field: self.status_field.clone(),
            churned_value: self.churned_value(),
            radar_metrics,
        }
    }
}
