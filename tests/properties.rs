use churnplot::{
    aggregate, classify, defaults_for, validate, AggregationMode, ChartConfiguration, ChartType,
    Row, SeriesPoints, SeriesSchema, Value,
};
use proptest::prelude::*;

const ID: &str = "CustomerID";

fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0.0f64..500.0).prop_map(Value::Number),
        Just(Value::Null),
        Just(Value::from("n/a")),
    ]
}

fn churn_row() -> impl Strategy<Value = Row> {
    (
        0u32..10_000,
        prop::sample::select(vec!["North", "South", "East", "West"]),
        cell(),
        prop::bool::ANY,
    )
        .prop_map(|(id, region, charges, churned)| {
            vec![
                (ID, Value::Number(id as f64)),
                ("Region", Value::from(region)),
                ("Charges", charges),
                ("Churn", Value::from(if churned { "Yes" } else { "No" })),
            ]
            .into_iter()
            .collect::<Row>()
        })
}

fn columns(rotate: usize) -> Vec<String> {
    let mut columns: Vec<String> = [ID, "Region", "Charges", "Churn"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    columns.rotate_left(rotate % 4);
    columns
}

fn grouped(chart_type: ChartType, aggregation: AggregationMode) -> ChartConfiguration {
    ChartConfiguration {
        chart_type,
        x_axis_key: "Region".to_string(),
        y_axis_key: "Charges".to_string(),
        aggregation,
    }
}

fn schema() -> SeriesSchema {
    SeriesSchema::new("Churn", "Yes").with_radar_metrics(vec!["Charges".to_string()])
}

fn any_aggregation() -> impl Strategy<Value = AggregationMode> {
    prop_oneof![
        Just(AggregationMode::Count),
        Just(AggregationMode::Sum),
        Just(AggregationMode::Average),
    ]
}

proptest! {
    #[test]
    fn identifier_is_never_classified_or_defaulted(
        rows in prop::collection::vec(churn_row(), 0..8),
        rotate in 0usize..4,
    ) {
        let columns = columns(rotate);
        let classification = classify(&columns, rows.first(), ID);
        prop_assert!(!classification.numeric.iter().any(|c| c == ID));
        prop_assert!(!classification.categorical.iter().any(|c| c == ID));

        for chart_type in ChartType::ALL {
            let defaults = defaults_for(chart_type, &columns, &classification);
            prop_assert_ne!(defaults.x_axis_key.as_str(), ID);
            prop_assert_ne!(defaults.y_axis_key.as_str(), ID);
        }
    }

    #[test]
    fn counts_cover_every_row(
        rows in prop::collection::vec(churn_row(), 0..40),
        stacked in prop::bool::ANY,
    ) {
        let chart_type = if stacked { ChartType::StackedBar } else { ChartType::Bar };
        let series = aggregate(&rows, &grouped(chart_type, AggregationMode::Count), &schema()).unwrap();
        let total: f64 = match &series.series {
            SeriesPoints::Grouped(points) => points.iter().map(|p| p.churned + p.retained).sum(),
            other => return Err(TestCaseError::fail(format!("unexpected series {:?}", other))),
        };
        prop_assert_eq!(total, rows.len() as f64);
        prop_assert_eq!(series.skipped, 0);
    }

    #[test]
    fn aggregation_is_deterministic(
        rows in prop::collection::vec(churn_row(), 0..30),
        aggregation in any_aggregation(),
    ) {
        let config = grouped(ChartType::StackedBar, aggregation);
        let first = aggregate(&rows, &config, &schema()).unwrap();
        let second = aggregate(&rows, &config, &schema()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn averages_are_finite(rows in prop::collection::vec(churn_row(), 0..30)) {
        let bars = aggregate(&rows, &grouped(ChartType::Bar, AggregationMode::Average), &schema()).unwrap();
        if let SeriesPoints::Grouped(points) = &bars.series {
            for p in points {
                prop_assert!(p.churned.is_finite() && p.retained.is_finite());
            }
        }

        let radar = aggregate(&rows, &grouped(ChartType::Radar, AggregationMode::Count), &schema()).unwrap();
        if let SeriesPoints::Radar(points) = &radar.series {
            for p in points {
                prop_assert!(p.churned.is_finite() && p.retained.is_finite());
            }
        }
    }

    #[test]
    fn validated_defaults_aggregate_cleanly(
        rows in prop::collection::vec(churn_row(), 1..20),
        rotate in 0usize..4,
    ) {
        let columns = columns(rotate);
        let classification = classify(&columns, rows.first(), ID);
        for chart_type in ChartType::ALL {
            let config = defaults_for(chart_type, &columns, &classification).apply(AggregationMode::Count);
            if let Ok(config) = validate(&config, &classification) {
                prop_assert!(aggregate(&rows, &config, &schema()).is_ok());
            }
        }
    }
}
