use crate::classify::{Classification, ColumnKind};
use crate::error::ConfigError;
use crate::ir::{AggregationMode, Axis, ChartConfiguration, ChartType, PartialConfiguration};

/// Derive the default axes for `chart_type`.
///
/// Called explicitly when the chart type or the dataset changes; manual axis
/// picks are not carried over. Positional fallbacks skip the identifier
/// column, so it is never offered as an axis.
pub fn defaults_for(
    chart_type: ChartType,
    columns: &[String],
    classification: &Classification,
) -> PartialConfiguration {
    let positional: Vec<&String> = columns
        .iter()
        .filter(|c| !classification.is_identifier(c))
        .collect();
    let pick = |preferred: Option<&String>, position: usize| -> String {
        preferred
            .or_else(|| positional.get(position).copied())
            .cloned()
            .unwrap_or_default()
    };

    match chart_type {
        ChartType::Scatter => PartialConfiguration {
            chart_type,
            x_axis_key: pick(classification.numeric.first(), 0),
            y_axis_key: pick(classification.numeric.get(1), 1),
            aggregation: None,
        },
        ChartType::Radar => PartialConfiguration {
            chart_type,
            x_axis_key: String::new(),
            y_axis_key: String::new(),
            aggregation: None,
        },
        ChartType::Bar | ChartType::StackedBar => PartialConfiguration {
            chart_type,
            x_axis_key: pick(classification.categorical.first(), 0),
            y_axis_key: String::new(),
            aggregation: Some(AggregationMode::Count),
        },
    }
}

/// Check a submitted configuration against the column classification.
/// Returns it unchanged when every rule holds; never coerces.
///
/// For an empty dataset only the structural rules apply (required axes set,
/// no identifier axis), so the submit degrades to an empty series.
pub fn validate(
    config: &ChartConfiguration,
    classification: &Classification,
) -> Result<ChartConfiguration, ConfigError> {
    match config.chart_type {
        ChartType::Radar => {}
        ChartType::Scatter => {
            require_column(config, Axis::X, ColumnKind::Numeric, classification)?;
            require_column(config, Axis::Y, ColumnKind::Numeric, classification)?;
        }
        ChartType::Bar | ChartType::StackedBar => {
            require_column(config, Axis::X, ColumnKind::Categorical, classification)?;
            if config.aggregation.needs_value_axis() {
                if config.y_axis_key.is_empty() {
                    return Err(ConfigError::ValueAxisRequired {
                        aggregation: config.aggregation,
                    });
                }
                require_column(config, Axis::Y, ColumnKind::Numeric, classification)?;
            }
        }
    }

    Ok(config.clone())
}

fn require_column(
    config: &ChartConfiguration,
    axis: Axis,
    expected: ColumnKind,
    classification: &Classification,
) -> Result<(), ConfigError> {
    let column = match axis {
        Axis::X => &config.x_axis_key,
        Axis::Y => &config.y_axis_key,
    };

    if column.is_empty() {
        return Err(ConfigError::MissingAxis {
            chart_type: config.chart_type,
            axis,
        });
    }
    if classification.is_identifier(column) {
        return Err(ConfigError::IdentifierAxis {
            axis,
            column: column.clone(),
        });
    }
    // Nothing was sampled, so there are no column types to check against
    if !classification.is_available() {
        return Ok(());
    }

    match (classification.kind_of(column), expected) {
        (None, _) => Err(ConfigError::UnknownColumn {
            axis,
            column: column.clone(),
        }),
        (Some(found), wanted) if found == wanted => Ok(()),
        (Some(_), ColumnKind::Categorical) => Err(ConfigError::NotCategorical {
            chart_type: config.chart_type,
            axis,
            column: column.clone(),
        }),
        (Some(_), ColumnKind::Numeric) => Err(ConfigError::NotNumeric {
            axis,
            column: column.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::data::{Row, Value};

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn make_classification() -> (Vec<String>, Classification) {
        let columns = cols(&["CustomerID", "Region", "Tenure", "Plan", "Charges", "Churn"]);
        let row: Row = vec![
            ("CustomerID", Value::from("C-1")),
            ("Region", Value::from("North")),
            ("Tenure", Value::Number(3.0)),
            ("Plan", Value::from("Basic")),
            ("Charges", Value::Number(20.0)),
            ("Churn", Value::from("No")),
        ]
        .into_iter()
        .collect();
        let classification = classify(&columns, Some(&row), "CustomerID");
        (columns, classification)
    }

    fn config(chart_type: ChartType, x: &str, y: &str, aggregation: AggregationMode) -> ChartConfiguration {
        ChartConfiguration {
            chart_type,
            x_axis_key: x.to_string(),
            y_axis_key: y.to_string(),
            aggregation,
        }
    }

    #[test]
    fn test_defaults_scatter() {
        let (columns, c) = make_classification();
        let d = defaults_for(ChartType::Scatter, &columns, &c);
        assert_eq!(d.x_axis_key, "Tenure");
        assert_eq!(d.y_axis_key, "Charges");
        assert_eq!(d.aggregation, None);
    }

    #[test]
    fn test_defaults_bar_forces_count() {
        let (columns, c) = make_classification();
        for chart_type in [ChartType::Bar, ChartType::StackedBar] {
            let d = defaults_for(chart_type, &columns, &c);
            assert_eq!(d.x_axis_key, "Region");
            assert_eq!(d.y_axis_key, "");
            assert_eq!(d.aggregation, Some(AggregationMode::Count));
        }
    }

    #[test]
    fn test_defaults_radar_clears_axes() {
        let (columns, c) = make_classification();
        let d = defaults_for(ChartType::Radar, &columns, &c);
        assert!(d.x_axis_key.is_empty() && d.y_axis_key.is_empty());
    }

    #[test]
    fn test_positional_fallback_skips_identifier() {
        // Only text columns: scatter has no numeric candidates.
        let columns = cols(&["CustomerID", "Region", "Plan"]);
        let row: Row = vec![
            ("CustomerID", "C-1"),
            ("Region", "North"),
            ("Plan", "Basic"),
        ]
        .into_iter()
        .collect();
        let c = classify(&columns, Some(&row), "CustomerID");
        let d = defaults_for(ChartType::Scatter, &columns, &c);
        assert_eq!(d.x_axis_key, "Region");
        assert_eq!(d.y_axis_key, "Plan");
    }

    #[test]
    fn test_fallback_exhausted_leaves_unset() {
        let columns = cols(&["CustomerID", "Tenure"]);
        let row: Row = vec![("CustomerID", Value::from("C")), ("Tenure", Value::Number(1.0))]
            .into_iter()
            .collect();
        let c = classify(&columns, Some(&row), "CustomerID");

        let d = defaults_for(ChartType::Scatter, &columns, &c);
        assert_eq!(d.x_axis_key, "Tenure");
        assert_eq!(d.y_axis_key, "");

        let d = defaults_for(ChartType::Bar, &columns, &c);
        assert_eq!(d.x_axis_key, "Tenure");
    }

    #[test]
    fn test_validate_accepts_valid() {
        let (_, c) = make_classification();
        let ok = config(ChartType::StackedBar, "Region", "Charges", AggregationMode::Average);
        assert_eq!(validate(&ok, &c), Ok(ok.clone()));

        let count = config(ChartType::Bar, "Plan", "", AggregationMode::Count);
        assert!(validate(&count, &c).is_ok());

        let scatter = config(ChartType::Scatter, "Tenure", "Charges", AggregationMode::Count);
        assert!(validate(&scatter, &c).is_ok());

        let radar = config(ChartType::Radar, "", "", AggregationMode::Sum);
        assert!(validate(&radar, &c).is_ok());
    }

    #[test]
    fn test_validate_rejects_numeric_group_axis() {
        let (_, c) = make_classification();
        let bad = config(ChartType::Bar, "Tenure", "", AggregationMode::Count);
        let err = validate(&bad, &c).unwrap_err();
        assert!(matches!(err, ConfigError::NotCategorical { axis: Axis::X, .. }));
    }

    #[test]
    fn test_validate_rejects_sum_without_value_axis() {
        let (_, c) = make_classification();
        let bad = config(ChartType::StackedBar, "Region", "", AggregationMode::Sum);
        assert_eq!(
            validate(&bad, &c),
            Err(ConfigError::ValueAxisRequired {
                aggregation: AggregationMode::Sum
            })
        );

        let bad = config(ChartType::StackedBar, "Region", "Plan", AggregationMode::Average);
        assert!(matches!(
            validate(&bad, &c),
            Err(ConfigError::NotNumeric { axis: Axis::Y, .. })
        ));
    }

    #[test]
    fn test_validate_scatter_rules() {
        let (_, c) = make_classification();
        let missing = config(ChartType::Scatter, "Tenure", "", AggregationMode::Count);
        assert_eq!(
            validate(&missing, &c),
            Err(ConfigError::MissingAxis {
                chart_type: ChartType::Scatter,
                axis: Axis::Y
            })
        );

        let text = config(ChartType::Scatter, "Region", "Charges", AggregationMode::Count);
        assert!(matches!(
            validate(&text, &c),
            Err(ConfigError::NotNumeric { axis: Axis::X, .. })
        ));
    }

    #[test]
    fn test_validate_identifier_and_unknown() {
        let (_, c) = make_classification();
        let id = config(ChartType::Bar, "CustomerID", "", AggregationMode::Count);
        assert!(matches!(
            validate(&id, &c),
            Err(ConfigError::IdentifierAxis { .. })
        ));

        let unknown = config(ChartType::Bar, "Country", "", AggregationMode::Count);
        let err = validate(&unknown, &c).unwrap_err();
        assert_eq!(err.axis(), Axis::X);
        assert!(err.to_string().contains("Country"));
    }

    #[test]
    fn test_validate_without_classification() {
        let c = classify(&cols(&["CustomerID", "Region", "Churn"]), None, "CustomerID");
        let bar = config(ChartType::Bar, "Region", "", AggregationMode::Count);
        assert_eq!(validate(&bar, &c), Ok(bar.clone()));

        let unset = config(ChartType::StackedBar, "", "", AggregationMode::Count);
        assert!(matches!(
            validate(&unset, &c),
            Err(ConfigError::MissingAxis { axis: Axis::X, .. })
        ));

        let avg = config(ChartType::Bar, "Region", "", AggregationMode::Average);
        assert!(matches!(
            validate(&avg, &c),
            Err(ConfigError::ValueAxisRequired { .. })
        ));

        let id = config(ChartType::Bar, "CustomerID", "", AggregationMode::Count);
        assert!(matches!(
            validate(&id, &c),
            Err(ConfigError::IdentifierAxis { .. })
        ));

        let radar = config(ChartType::Radar, "", "", AggregationMode::Count);
        assert!(validate(&radar, &c).is_ok());
    }
}
