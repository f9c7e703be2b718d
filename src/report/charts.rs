//! PNG charts of the top emitters

use anyhow::{Context, Result};
use plotters::coord::ranged1d::SegmentValue;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::writer::CleanedRow;

const BAR_SIZE: (u32, u32) = (1000, 600);
const PIE_SIZE: (u32, u32) = (600, 600);

const PIE_COLORS: [RGBColor; 5] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
];

/// Delete a chart left over from an earlier run
pub fn remove_stale_chart(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove stale {:?}", path))?;
        debug!("removed stale {}", path.display());
    }
    Ok(())
}

/// Bar chart of `rows` in the given order. Returns false if there was nothing to draw,
/// in which case no file is left at `path`.
pub fn render_bar_chart(path: &Path, rows: &[CleanedRow], title: &str) -> Result<bool> {
    if rows.is_empty() {
        warn!("no rows to chart; skipping {}", path.display());
        remove_stale_chart(path)?;
        return Ok(false);
    }

    let root = BitMapBackend::new(path, BAR_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = rows
        .iter()
        .map(|row| row.emission_value)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26).into_font())
        .margin(20)
        .x_label_area_size(140)
        .y_label_area_size(110)
        .build_cartesian_2d((0u32..rows.len() as u32).into_segmented(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Emissions (Metric Tons)")
        .x_labels(rows.len())
        .x_label_formatter(&|value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(idx) => rows
                .get(*idx as usize)
                .map(|row| row.country.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_label_style(
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(idx, row)| {
        let idx = idx as u32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(idx), 0.0),
                (SegmentValue::Exact(idx + 1), row.emission_value),
            ],
            BLUE.mix(0.8).filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;

    root.present()
        .with_context(|| format!("Failed to write {:?}", path))?;
    info!("wrote {}", path.display());
    Ok(true)
}

/// Pie chart of each row's share of the rows' total, labelled with percentages.
/// Negative values are drawn as empty wedges. Returns false if there was nothing to draw,
/// in which case no file is left at `path`.
pub fn render_pie_chart(path: &Path, rows: &[CleanedRow], title: &str) -> Result<bool> {
    let sizes = wedge_sizes(rows);
    if sizes.iter().sum::<f64>() <= 0.0 {
        warn!("top emitters have no positive emissions; skipping {}", path.display());
        remove_stale_chart(path)?;
        return Ok(false);
    }

    let root = BitMapBackend::new(path, PIE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 24).into_font())?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;
    let colors: Vec<RGBColor> = (0..rows.len())
        .map(|idx| PIE_COLORS[idx % PIE_COLORS.len()])
        .collect();
    let labels: Vec<&str> = rows.iter().map(|row| row.country.as_str()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", radius * 0.08).into_font().color(&WHITE));
    area.draw(&pie)?;

    root.present()
        .with_context(|| format!("Failed to write {:?}", path))?;
    info!("wrote {}", path.display());
    Ok(true)
}

fn wedge_sizes(rows: &[CleanedRow]) -> Vec<f64> {
    rows.iter()
        .map(|row| {
            if row.emission_value < 0.0 {
                warn!(
                    "negative emission {} for {} drawn as 0 in the pie chart",
                    row.emission_value, row.country
                );
                0.0
            } else {
                row.emission_value
            }
        })
        .collect()
}
