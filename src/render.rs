use anyhow::{bail, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::ops::Range;

use crate::ir::{AggregatedSeries, ChartType, GroupPoint, RadarPoint, ScatterPoint, SeriesPoints};
use crate::parser::Labels;
use crate::{OutputFormat, RenderOptions};

const CHURNED: RGBColor = RGBColor(220, 38, 38);
const RETAINED: RGBColor = RGBColor(37, 99, 235);

/// Largest accepted canvas side, in pixels
const MAX_DIMENSION: u32 = 8192;

/// Render a computed series in the requested output format
pub fn render_series(series: &AggregatedSeries, labels: &Labels, options: &RenderOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Json => serde_json::to_vec_pretty(series).context("Failed to serialize series"),
        OutputFormat::Svg => {
            check_canvas(options)?;
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
                    .into_drawing_area();
                draw(&root, series, labels)?;
            }
            Ok(svg.into_bytes())
        }
        OutputFormat::Png => {
            let mut buffer = vec![0u8; rgb_buffer_len(options)?];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (options.width, options.height))
                    .into_drawing_area();
                draw(&root, series, labels)?;
            }
            encode_png(&buffer, options.width, options.height)
        }
    }
}

fn check_canvas(options: &RenderOptions) -> Result<()> {
    let (width, height) = (options.width, options.height);
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        bail!(
            "Canvas size {}x{} is out of range (each side must be 1..={})",
            width,
            height,
            MAX_DIMENSION
        );
    }
    Ok(())
}

fn rgb_buffer_len(options: &RenderOptions) -> Result<usize> {
    check_canvas(options)?;
    (options.width as usize)
        .checked_mul(options.height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .context("Canvas too large for an RGB buffer")
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &AggregatedSeries,
    labels: &Labels,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let title = labels.title.clone().unwrap_or_else(|| default_title(series));

    if series.no_data() {
        draw_no_data(root, &title)?;
    } else {
        let x_desc = labels.x.clone().unwrap_or_else(|| series.config.x_axis_key.clone());
        let y_desc = labels.y.clone().unwrap_or_else(|| value_label(series));

        match &series.series {
            SeriesPoints::Grouped(points) => {
                let stacked = series.config.chart_type == ChartType::StackedBar;
                draw_grouped(root, points, stacked, &title, &x_desc, &y_desc)?;
            }
            SeriesPoints::Scatter(points) => {
                let y_desc = labels.y.clone().unwrap_or_else(|| series.config.y_axis_key.clone());
                draw_scatter(root, points, &title, &x_desc, &y_desc)?;
            }
            SeriesPoints::Radar(points) => draw_radar(root, points, &title)?,
        }
    }

    root.present().context("Failed to present drawing")?;
    Ok(())
}

fn default_title(series: &AggregatedSeries) -> String {
    let config = &series.config;
    match config.chart_type {
        ChartType::Bar | ChartType::StackedBar => format!("{} by {}", value_label(series), config.x_axis_key),
        ChartType::Scatter => format!("{} vs {}", config.y_axis_key, config.x_axis_key),
        ChartType::Radar => "Churned vs retained averages".to_string(),
    }
}

fn value_label(series: &AggregatedSeries) -> String {
    let config = &series.config;
    if config.aggregation.needs_value_axis() {
        format!("{} of {}", config.aggregation, config.y_axis_key)
    } else {
        "count".to_string()
    }
}

fn draw_no_data<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, title: &str) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (width, height) = root.dim_in_pixel();
    root.draw(&Text::new(title.to_string(), (10, 10), ("sans-serif", 20)))
        .context("Failed to draw title")?;
    root.draw(&Text::new(
        "No data".to_string(),
        (width as i32 / 2 - 40, height as i32 / 2),
        ("sans-serif", 24),
    ))
    .context("Failed to draw placeholder")?;
    Ok(())
}

/// Two series per category: side by side, or churned stacked under retained
fn draw_grouped<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[GroupPoint],
    stacked: bool,
    title: &str,
    x_desc: &str,
    y_desc: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let categories: Vec<String> = points
        .iter()
        .map(|p| {
            let label = p.group.to_string();
            if label.is_empty() { "(blank)".to_string() } else { label }
        })
        .collect();
    let num_categories = categories.len();

    let y_range = bar_value_range(points, stacked);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..num_categories as f64, y_range)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(num_categories)
        .x_label_formatter(&|x| {
            let idx = x.floor() as usize;
            categories.get(idx).cloned().unwrap_or_default()
        })
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .context("Failed to draw mesh")?;

    // (x_left, x_right, y_bottom, y_top) for each side
    let bar = |idx: usize, churned: bool, p: &GroupPoint| -> [(f64, f64); 2] {
        let center = idx as f64 + 0.5;
        if stacked {
            let (bottom, top) = if churned { (0.0, p.churned) } else { (p.churned, p.churned + p.retained) };
            [(center - 0.4, bottom), (center + 0.4, top)]
        } else if churned {
            [(center - 0.4, 0.0), (center, p.churned)]
        } else {
            [(center, 0.0), (center + 0.4, p.retained)]
        }
    };

    chart
        .draw_series(points.iter().enumerate().map(|(i, p)| Rectangle::new(bar(i, true, p), CHURNED.filled())))
        .context("Failed to draw churned bars")?
        .label("Churned")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], CHURNED.filled()));

    chart
        .draw_series(points.iter().enumerate().map(|(i, p)| Rectangle::new(bar(i, false, p), RETAINED.filled())))
        .context("Failed to draw retained bars")?
        .label("Retained")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], RETAINED.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .context("Failed to draw legend")?;

    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[ScatterPoint],
    title: &str,
    x_desc: &str,
    y_desc: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let x_range = padded_range(points.iter().map(|p| p.x));
    let y_range = padded_range(points.iter().map(|p| p.y));

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .context("Failed to draw mesh")?;

    chart
        .draw_series(points.iter().map(|p| Circle::new((p.x, p.y), 3, RETAINED.mix(0.6).filled())))
        .context("Failed to draw point series")?;

    Ok(())
}

/// Value-axis range covering every bar end, always including zero, with
/// 10% padding on the sides that hold data
fn bar_value_range(points: &[GroupPoint], stacked: bool) -> Range<f64> {
    let (lo, hi) = points
        .iter()
        .flat_map(|p| {
            if stacked {
                [p.churned, p.churned + p.retained]
            } else {
                [p.churned, p.retained]
            }
        })
        .map(|v| v.clamp(f64::MIN, f64::MAX))
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if lo == hi {
        return 0.0..1.0;
    }
    let padding = (hi - lo) * 0.1;
    let start = if lo < 0.0 { lo - padding } else { lo };
    let end = if hi > 0.0 { hi + padding } else { hi };
    if start.is_finite() && end.is_finite() {
        start..end
    } else {
        lo..hi
    }
}

/// Data range with 5% padding; a single value gets a unit window
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        0.0..1.0
    } else if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

/// One spoke per metric. Each spoke is scaled to the larger of its two
/// averages, so metrics with different units share the chart.
fn draw_radar<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, points: &[RadarPoint], title: &str) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let area = root.titled(title, ("sans-serif", 20)).context("Failed to draw title")?;
    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = (width.min(height) as f64 / 2.0 - 60.0).max(10.0);
    let n = points.len();

    let at = |idx: usize, fraction: f64| -> (i32, i32) {
        let angle = -PI / 2.0 + 2.0 * PI * idx as f64 / n as f64;
        (
            (center.0 + radius * fraction * angle.cos()).round() as i32,
            (center.1 + radius * fraction * angle.sin()).round() as i32,
        )
    };

    for ring in [0.25, 0.5, 0.75, 1.0] {
        let mut outline: Vec<(i32, i32)> = (0..n).map(|i| at(i, ring)).collect();
        outline.push(at(0, ring));
        area.draw(&PathElement::new(outline, BLACK.mix(0.15)))
            .context("Failed to draw grid")?;
    }

    for (i, p) in points.iter().enumerate() {
        area.draw(&PathElement::new(vec![at(i, 0.0), at(i, 1.0)], BLACK.mix(0.3)))
            .context("Failed to draw spoke")?;
        let (lx, ly) = at(i, 1.12);
        area.draw(&Text::new(p.metric.clone(), (lx - 20, ly - 7), ("sans-serif", 14)))
            .context("Failed to draw metric label")?;
    }

    let scale = |p: &RadarPoint, v: f64| -> f64 {
        let top = p.churned.max(p.retained);
        if top > 0.0 { v / top } else { 0.0 }
    };

    for (color, churned) in [(RETAINED, false), (CHURNED, true)] {
        let shape: Vec<(i32, i32)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| at(i, scale(p, if churned { p.churned } else { p.retained })))
            .collect();
        area.draw(&Polygon::new(shape.clone(), color.mix(0.25).filled()))
            .context("Failed to draw radar area")?;
        let mut outline = shape;
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }
        area.draw(&PathElement::new(outline, color.stroke_width(2)))
            .context("Failed to draw radar outline")?;
    }

    for (row, (name, color)) in [("Churned", CHURNED), ("Retained", RETAINED)].into_iter().enumerate() {
        let y = 10 + row as i32 * 20;
        area.draw(&Rectangle::new([(10, y), (20, y + 10)], color.filled()))
            .context("Failed to draw legend")?;
        area.draw(&Text::new(name.to_string(), (26, y - 2), ("sans-serif", 14)))
            .context("Failed to draw legend")?;
    }

    Ok(())
}
