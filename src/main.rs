use anyhow::{Context, Result};
use churnplot::parser::{self, ChartCommand, Labels};
use churnplot::{csv_reader, render, ChartType, OutputFormat, Session, Settings, Value};
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "churnplot")]
#[command(about = "Aggregate churn CSV data into chart series and render them", long_about = None)]
struct Args {
    /// Chart configuration (e.g., 'stackedBar(x: Region, y: MonthlyCharges, agg: average) | labs(title: "...")')
    config: Option<String>,

    /// CSV file to read (defaults to stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON settings file (id column, status field, churned value, radar metrics, render options)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    id_column: Option<String>,

    #[arg(long)]
    status_field: Option<String>,

    #[arg(long)]
    churned_value: Option<String>,

    /// Output format (overrides the settings file)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Print the column classification and per-chart defaults instead of a chart
    #[arg(long)]
    classify: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Svg,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Png => OutputFormat::Png,
            Format::Svg => OutputFormat::Svg,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    // Parse the configuration before touching the data
    let (command, labels) = match &args.config {
        Some(text) => match parser::parse_chart_spec(text) {
            Ok((_, spec)) => (spec.chart, spec.labels),
            Err(e) => {
                eprintln!("Parse error: {:?}", e);
                std::process::exit(2);
            }
        },
        None => (ChartCommand::new(ChartType::default()), Labels::default()),
    };

    let dataset = match &args.input {
        Some(path) => csv_reader::read_dataset_from_path(path, &settings.id_column),
        None => csv_reader::read_dataset_from_stdin(&settings.id_column),
    }
    .context("Failed to read CSV input")?;

    let render_options = settings.render.clone();
    let mut session = Session::new(settings);
    session.load(dataset);

    let output = if args.classify {
        classification_report(&session)?
    } else {
        session.apply_command(&command);
        let series = match session.submit() {
            Ok(series) => series,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        };
        render::render_series(series, &labels, &render_options).context("Failed to render chart")?
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(&output)
        .context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => Settings::from_path(path)?,
        None => Settings::default(),
    };

    if let Some(id) = &args.id_column {
        settings.id_column = id.clone();
    }
    if let Some(field) = &args.status_field {
        settings.status_field = field.clone();
    }
    if let Some(value) = &args.churned_value {
        settings.churned_value = Value::Text(value.clone());
    }
    if let Some(format) = args.format {
        settings.render.format = format.into();
    }
    if let Some(width) = args.width {
        settings.render.width = width;
    }
    if let Some(height) = args.height {
        settings.render.height = height;
    }

    Ok(settings)
}

fn classification_report(session: &Session) -> Result<Vec<u8>> {
    let columns = session.dataset().columns();
    let classification = session.classification();

    let defaults: serde_json::Map<String, serde_json::Value> = ChartType::ALL
        .iter()
        .map(|&chart_type| {
            let config = churnplot::defaults_for(chart_type, columns, classification)
                .apply(Default::default());
            (chart_type.to_string(), json!(config))
        })
        .collect();

    let report = json!({
        "rows": session.dataset().len(),
        "available": classification.is_available(),
        "classification": classification,
        "defaults": defaults,
        "radarMetrics": session.schema().radar_metrics,
    });

    let mut bytes = serde_json::to_vec_pretty(&report).context("Failed to serialize classification")?;
    bytes.push(b'\n');
    Ok(bytes)
}
