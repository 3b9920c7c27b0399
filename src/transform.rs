use std::collections::HashMap;

use crate::data::{Row, Value};
use crate::error::EngineError;
use crate::ir::{
    AggregatedSeries, AggregationMode, ChartConfiguration, ChartType, GroupPoint, RadarPoint,
    ScatterPoint, SeriesPoints, SeriesSchema,
};

/// Main entry point: turn rows and a validated configuration into series.
///
/// Malformed individual values are skipped, never fatal. The only error is a
/// configuration missing an axis it structurally needs, which means the
/// caller skipped validation.
pub fn aggregate(
    rows: &[Row],
    config: &ChartConfiguration,
    schema: &SeriesSchema,
) -> Result<AggregatedSeries, EngineError> {
    check_contract(config)?;

    let (series, skipped) = match config.chart_type {
        ChartType::Bar | ChartType::StackedBar => {
            let (points, skipped) = aggregate_groups(rows, config, schema);
            (SeriesPoints::Grouped(points), skipped)
        }
        ChartType::Scatter => {
            let (points, skipped) = collect_scatter(rows, &config.x_axis_key, &config.y_axis_key);
            (SeriesPoints::Scatter(points), skipped)
        }
        ChartType::Radar => {
            let (points, skipped) = compare_metrics(rows, schema);
            (SeriesPoints::Radar(points), skipped)
        }
    };

    if series.is_empty() {
        tracing::debug!(chart_type = %config.chart_type, rows = rows.len(), "no data to plot");
    } else {
        tracing::debug!(
            chart_type = %config.chart_type,
            points = series.len(),
            skipped,
            "aggregated series"
        );
    }

    Ok(AggregatedSeries {
        config: config.clone(),
        series,
        skipped,
    })
}

fn check_contract(config: &ChartConfiguration) -> Result<(), EngineError> {
    let violation = match config.chart_type {
        ChartType::Bar | ChartType::StackedBar if config.x_axis_key.is_empty() => {
            Some("grouped chart without a group axis".to_string())
        }
        ChartType::Bar | ChartType::StackedBar
            if config.aggregation.needs_value_axis() && config.y_axis_key.is_empty() =>
        {
            Some(format!("{} aggregation without a value axis", config.aggregation))
        }
        ChartType::Scatter if config.x_axis_key.is_empty() || config.y_axis_key.is_empty() => {
            Some("scatter chart without both axes".to_string())
        }
        _ => None,
    };

    match violation {
        Some(reason) => Err(EngineError::ContractViolation(reason)),
        None => Ok(()),
    }
}

/// Running totals for one churned/retained partition.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    rows: usize,
    sum: f64,
    contributors: usize,
}

impl Accumulator {
    fn add_row(&mut self) {
        self.rows += 1;
    }

    fn add_value(&mut self, value: f64) {
        self.sum += value;
        self.contributors += 1;
    }

    fn average(&self) -> f64 {
        if self.contributors == 0 {
            0.0
        } else {
            finite(self.sum / self.contributors as f64)
        }
    }

    fn finish(&self, mode: AggregationMode) -> f64 {
        match mode {
            AggregationMode::Count => self.rows as f64,
            AggregationMode::Sum => finite(self.sum),
            AggregationMode::Average => self.average(),
        }
    }
}

/// Inputs are finite, so only overflow can leave the range; saturate it.
fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        tracing::warn!(value, "aggregate overflowed, saturating");
        value.clamp(f64::MIN, f64::MAX)
    }
}

#[derive(Debug, Default)]
struct Split {
    churned: Accumulator,
    retained: Accumulator,
}

impl Split {
    fn side(&mut self, churned: bool) -> &mut Accumulator {
        if churned {
            &mut self.churned
        } else {
            &mut self.retained
        }
    }
}

fn is_churned(row: &Row, schema: &SeriesSchema) -> bool {
    schema.is_churned(row.get(&schema.status_field))
}

/// Group rows by the raw x value in first-seen order, then split each group
/// by status.
fn aggregate_groups(
    rows: &[Row],
    config: &ChartConfiguration,
    schema: &SeriesSchema,
) -> (Vec<GroupPoint>, usize) {
    let mode = config.aggregation;
    let mut order: Vec<Value> = Vec::new();
    let mut index: HashMap<Value, usize> = HashMap::new();
    let mut splits: Vec<Split> = Vec::new();
    let mut skipped = 0;

    for row in rows {
        let key = row.get(&config.x_axis_key).cloned().unwrap_or(Value::Null);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            splits.push(Split::default());
            splits.len() - 1
        });

        let acc = splits[slot].side(is_churned(row, schema));
        acc.add_row();

        if mode.needs_value_axis() {
            match row.number(&config.y_axis_key) {
                Some(v) => acc.add_value(v),
                None => {
                    tracing::trace!(column = %config.y_axis_key, "skipping non-numeric value");
                    skipped += 1;
                }
            }
        }
    }

    let points = order
        .into_iter()
        .zip(splits)
        .map(|(group, split)| GroupPoint {
            group,
            churned: split.churned.finish(mode),
            retained: split.retained.finish(mode),
        })
        .collect();

    (points, skipped)
}

/// Raw x/y pairs, one per row; rows that cannot be plotted are left out.
fn collect_scatter(rows: &[Row], x_col: &str, y_col: &str) -> (Vec<ScatterPoint>, usize) {
    let mut points = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for row in rows {
        match (row.number(x_col), row.number(y_col)) {
            (Some(x), Some(y)) => points.push(ScatterPoint { x, y }),
            _ => {
                tracing::trace!(x = x_col, y = y_col, "skipping unplottable row");
                skipped += 1;
            }
        }
    }

    (points, skipped)
}

/// Average each fixed metric independently over the churned and retained
/// partitions of the whole row set.
fn compare_metrics(rows: &[Row], schema: &SeriesSchema) -> (Vec<RadarPoint>, usize) {
    if rows.is_empty() {
        return (Vec::new(), 0);
    }

    let mut splits: Vec<Split> = schema.radar_metrics.iter().map(|_| Split::default()).collect();
    let mut skipped = 0;

    for row in rows {
        let churned = is_churned(row, schema);
        for (metric, split) in schema.radar_metrics.iter().zip(splits.iter_mut()) {
            match row.number(metric) {
                Some(v) => split.side(churned).add_value(v),
                None => skipped += 1,
            }
        }
    }

    let points = schema
        .radar_metrics
        .iter()
        .zip(splits)
        .map(|(metric, split)| RadarPoint {
            metric: metric.clone(),
            churned: split.churned.average(),
            retained: split.retained.average(),
        })
        .collect();

    (points, skipped)
}
