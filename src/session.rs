use crate::classify::Classification;
use crate::data::Dataset;
use crate::error::Result;
use crate::ir::{AggregatedSeries, AggregationMode, ChartConfiguration, ChartType, SeriesSchema};
use crate::parser::ChartCommand;
use crate::resolve::{defaults_for, validate};
use crate::settings::Settings;
use crate::transform::aggregate;

/// Upload → configure → submit flow over one dataset at a time.
///
/// Edits only touch the draft. Nothing is computed until [`Session::submit`],
/// and a successful submit replaces the previous series outright.
#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
    dataset: Dataset,
    schema: SeriesSchema,
    draft: ChartConfiguration,
    submitted: Option<ChartConfiguration>,
    series: Option<AggregatedSeries>,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let dataset = Dataset::new(Vec::new(), Vec::new(), &settings.id_column);
        let schema = settings.schema(dataset.classification());
        Self {
            settings,
            dataset,
            schema,
            draft: ChartConfiguration::default(),
            submitted: None,
            series: None,
        }
    }

    /// Replace the dataset. The submitted configuration and series are
    /// dropped and the draft resets to the current chart type's defaults.
    pub fn load(&mut self, dataset: Dataset) {
        tracing::info!(rows = dataset.len(), columns = dataset.columns().len(), "dataset loaded");
        self.schema = self.settings.schema(dataset.classification());
        self.dataset = dataset;
        self.submitted = None;
        self.series = None;
        self.reset_draft(self.draft.chart_type);
    }

    /// Switch chart type. Manual axis picks are discarded.
    pub fn select_chart_type(&mut self, chart_type: ChartType) {
        self.reset_draft(chart_type);
    }

    pub fn set_x_axis(&mut self, column: impl Into<String>) {
        self.draft.x_axis_key = column.into();
    }

    pub fn set_y_axis(&mut self, column: impl Into<String>) {
        self.draft.y_axis_key = column.into();
    }

    pub fn set_aggregation(&mut self, aggregation: AggregationMode) {
        self.draft.aggregation = aggregation;
    }

    /// Apply a parsed chart command: type change first, then its overrides.
    pub fn apply_command(&mut self, command: &ChartCommand) {
        self.select_chart_type(command.chart_type);
        if let Some(x) = &command.x {
            self.set_x_axis(x.clone());
        }
        if let Some(y) = &command.y {
            self.set_y_axis(y.clone());
        }
        if let Some(aggregation) = command.aggregation {
            self.set_aggregation(aggregation);
        }
    }

    /// Validate the draft and, if it holds, compute a fresh series.
    /// On rejection the previously computed series stays in place.
    pub fn submit(&mut self) -> Result<&AggregatedSeries> {
        let config = match validate(&self.draft, self.dataset.classification()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "configuration rejected");
                return Err(e.into());
            }
        };

        let series = aggregate(self.dataset.rows(), &config, &self.schema)?;
        self.submitted = Some(config);
        Ok(&*self.series.insert(series))
    }

    fn reset_draft(&mut self, chart_type: ChartType) {
        let defaults = defaults_for(chart_type, self.dataset.columns(), self.dataset.classification());
        self.draft = defaults.apply(self.draft.aggregation);
    }

    /// False until a dataset with at least one row is loaded.
    pub fn is_ready(&self) -> bool {
        !self.dataset.is_empty()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn classification(&self) -> &Classification {
        self.dataset.classification()
    }

    pub fn schema(&self) -> &SeriesSchema {
        &self.schema
    }

    pub fn draft(&self) -> &ChartConfiguration {
        &self.draft
    }

    pub fn submitted(&self) -> Option<&ChartConfiguration> {
        self.submitted.as_ref()
    }

    pub fn series(&self) -> Option<&AggregatedSeries> {
        self.series.as_ref()
    }
}
