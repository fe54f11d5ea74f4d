//! Chart selection and rendering.
//!
//! The selection policy is positional and fixed: a correlation heatmap when
//! at least two numeric columns exist, a distribution plot for each of the
//! first two numeric columns, and a boxplot of the first numeric column over
//! the first textual column. Charts never fail the run: an unmet precondition
//! is a silent omission, a renderer error drops that artifact with a warning.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dataset::{Column, Dataset};
use crate::profiler::{sample_std, CorrelationMatrix, ProfileSummary};

/// Square canvas shared by every chart.
const CANVAS: (u32, u32) = (900, 900);

/// Fixed histogram bin count for distribution plots.
const HISTOGRAM_BINS: usize = 20;

/// Grid resolution of the overlaid density curve.
const KDE_GRID: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    CorrelationHeatmap,
    Distribution,
    Boxplot,
}

/// One rendered image: its kind, the caption drawn on it (reused as the
/// report sub-heading) and where it was written.
#[derive(Debug, Clone)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub title: String,
    pub path: PathBuf,
}

impl ChartArtifact {
    /// Bare file name, the form the report links since it sits in the same
    /// directory as the images.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("render error: {0}")]
    Render(String),
    #[error("column has no finite values")]
    NoFiniteValues,
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Render(err.to_string())
    }
}

/// Apply the selection policy and render every applicable chart into
/// `out_dir`, in policy order. Returns the artifacts that actually rendered.
pub fn render_all(
    dataset: &Dataset,
    profile: &ProfileSummary,
    out_dir: &Path,
) -> Vec<ChartArtifact> {
    let mut artifacts = Vec::new();
    let numeric: Vec<&Column> = dataset.numeric_columns().collect();
    let textual: Vec<&Column> = dataset.textual_columns().collect();

    if numeric.len() >= 2 {
        let path = out_dir.join("correlation_heatmap.png");
        let title = "Correlation Heatmap".to_string();
        match render_heatmap(&profile.correlation, &title, &path) {
            Ok(()) => {
                info!("Heatmap saved to: {}", path.display());
                artifacts.push(ChartArtifact {
                    kind: ChartKind::CorrelationHeatmap,
                    title,
                    path,
                });
            }
            Err(err) => warn!("Skipping correlation heatmap: {}", err),
        }
    } else {
        debug!("Fewer than two numeric columns, no correlation heatmap");
    }

    for col in numeric.iter().take(2) {
        let path = out_dir.join(format!("distribution_{}.png", sanitize(col.name())));
        let title = format!("Distribution of {}", col.name());
        match render_distribution(col, &title, &path) {
            Ok(()) => {
                info!("Distribution plot saved to: {}", path.display());
                artifacts.push(ChartArtifact {
                    kind: ChartKind::Distribution,
                    title,
                    path,
                });
            }
            Err(err) => warn!("Skipping distribution of {}: {}", col.name(), err),
        }
    }

    match (numeric.first(), textual.first()) {
        (Some(num), Some(cat)) => {
            let path = out_dir.join("boxplot.png");
            let title = format!("Boxplot of {} by {}", num.name(), cat.name());
            match render_boxplot(num, cat, &title, &path) {
                Ok(()) => {
                    info!("Boxplot saved to: {}", path.display());
                    artifacts.push(ChartArtifact {
                        kind: ChartKind::Boxplot,
                        title,
                        path,
                    });
                }
                Err(err) => warn!("Skipping boxplot: {}", err),
            }
        }
        _ => debug!("Need one numeric and one textual column for a boxplot"),
    }

    artifacts
}

/// Annotated correlation heatmap on a fixed blue-white-red diverging scale.
fn render_heatmap(
    matrix: &CorrelationMatrix,
    title: &str,
    path: &Path,
) -> Result<(), ChartError> {
    let n = matrix.size() as i32;
    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

    let labels = matrix.labels.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(matrix.size())
        .y_labels(matrix.size())
        .x_label_formatter(&|seg| segment_label(seg, &labels))
        .y_label_formatter(&|seg| segment_label(seg, &labels))
        .label_style(("sans-serif", 14))
        .draw()?;

    let cells = (0..n).flat_map(|i| (0..n).map(move |j| (i, j)));
    chart.draw_series(cells.clone().map(|(i, j)| {
        let value = matrix.values[i as usize][j as usize];
        let color = if value.is_nan() {
            RGBColor(224, 224, 224)
        } else {
            diverging_color(value)
        };
        Rectangle::new(
            [
                (SegmentValue::Exact(j), SegmentValue::Exact(i)),
                (SegmentValue::Exact(j + 1), SegmentValue::Exact(i + 1)),
            ],
            color.filled(),
        )
    }))?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    chart.draw_series(cells.map(|(i, j)| {
        let value = matrix.values[i as usize][j as usize];
        let ink = if !value.is_nan() && value.abs() > 0.6 {
            &WHITE
        } else {
            &BLACK
        };
        let style = TextStyle::from(("sans-serif", 16).into_font())
            .color(ink)
            .pos(centered);
        Text::new(
            format!("{:.2}", value),
            (SegmentValue::CenterOf(j), SegmentValue::CenterOf(i)),
            style,
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Histogram with a fixed bin count and an overlaid Gaussian-kernel density
/// curve scaled to the count axis.
fn render_distribution(col: &Column, title: &str, path: &Path) -> Result<(), ChartError> {
    let values: Vec<f64> = col
        .numbers()
        .unwrap_or_default()
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(ChartError::NoFiniteValues);
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let bin_width = (hi - lo) / HISTOGRAM_BINS as f64;
    let mut counts = vec![0usize; HISTOGRAM_BINS];
    for v in &values {
        let idx = (((v - lo) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }

    // Scott's rule; the curve is skipped for degenerate samples.
    let std = sample_std(&values);
    let bandwidth = std * (values.len() as f64).powf(-0.2);
    let kde = if bandwidth.is_finite() && bandwidth > 0.0 {
        let cut = 3.0 * bandwidth;
        density_curve(&values, bandwidth, lo - cut, hi + cut)
            .into_iter()
            .map(|(x, d)| (x, d * values.len() as f64 * bin_width))
            .collect()
    } else {
        Vec::new()
    };

    let (x_lo, x_hi) = kde
        .first()
        .zip(kde.last())
        .map(|(first, last)| (first.0, last.0))
        .unwrap_or((lo, hi));
    let y_max = counts
        .iter()
        .map(|&c| c as f64)
        .chain(kde.iter().map(|&(_, y)| y))
        .fold(0.0f64, f64::max)
        * 1.05;

    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc(col.name())
        .y_desc("Count")
        .label_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(idx, &count)| {
        let x0 = lo + idx as f64 * bin_width;
        Rectangle::new(
            [(x0, 0.0), (x0 + bin_width, count as f64)],
            BLUE.mix(0.5).filled(),
        )
    }))?;

    if !kde.is_empty() {
        chart.draw_series(LineSeries::new(
            kde,
            ShapeStyle::from(&BLUE).stroke_width(2),
        ))?;
    }

    root.present()?;
    Ok(())
}

/// Boxplot of the first numeric column grouped by the first textual column,
/// groups in first-occurrence order.
fn render_boxplot(num: &Column, cat: &Column, title: &str, path: &Path) -> Result<(), ChartError> {
    let numbers = num.numbers().unwrap_or_default();
    let texts = cat.texts().unwrap_or_default();

    let mut group_names: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<f64>> = Vec::new();
    for (text, number) in texts.iter().zip(numbers.iter()) {
        let (Some(label), Some(value)) = (text, number) else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        match group_names.iter().position(|g| g == label) {
            Some(idx) => groups[idx].push(*value),
            None => {
                group_names.push(label.clone());
                groups.push(vec![*value]);
            }
        }
    }
    if groups.is_empty() {
        return Err(ChartError::NoFiniteValues);
    }

    let quartiles: Vec<Quartiles> = groups.iter().map(|g| Quartiles::new(g)).collect();
    let mut y_lo = f32::INFINITY;
    let mut y_hi = f32::NEG_INFINITY;
    for q in &quartiles {
        for v in q.values() {
            y_lo = y_lo.min(v);
            y_hi = y_hi.max(v);
        }
    }
    if y_lo == y_hi {
        y_lo -= 0.5;
        y_hi += 0.5;
    }
    let pad = (y_hi - y_lo) * 0.05;

    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0..group_names.len() as i32).into_segmented(),
            (y_lo - pad)..(y_hi + pad),
        )?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(group_names.len())
        .x_label_formatter(&|seg| segment_label(seg, &group_names))
        .x_desc(cat.name())
        .y_desc(num.name())
        .label_style(("sans-serif", 14))
        .draw()?;

    let width = (700 / (group_names.len().max(1) * 2)).clamp(4, 40) as u32;
    chart.draw_series(quartiles.iter().enumerate().map(|(idx, q)| {
        Boxplot::new_vertical(SegmentValue::CenterOf(idx as i32), q)
            .width(width)
            .style(&BLUE)
    }))?;

    root.present()?;
    Ok(())
}

/// Gaussian kernel density over an even grid.
fn density_curve(values: &[f64], bandwidth: f64, lo: f64, hi: f64) -> Vec<(f64, f64)> {
    let n = values.len() as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());
    (0..KDE_GRID)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (KDE_GRID - 1) as f64;
            let density = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect()
}

/// Axis label for a segmented index axis.
fn segment_label(seg: &SegmentValue<i32>, names: &[String]) -> String {
    let idx = match seg {
        SegmentValue::Exact(v) | SegmentValue::CenterOf(v) => *v,
        SegmentValue::Last => return String::new(),
    };
    names.get(idx as usize).cloned().unwrap_or_default()
}

/// File-name-safe form of a column name.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "column".to_string()
    } else {
        cleaned
    }
}

/// Fixed diverging scale: -1 blue, 0 white, +1 red.
fn diverging_color(value: f64) -> RGBColor {
    let t = value.clamp(-1.0, 1.0);
    let (from, to, f) = if t < 0.0 {
        ((59u8, 76u8, 192u8), (221u8, 221u8, 221u8), t + 1.0)
    } else {
        ((221u8, 221u8, 221u8), (180u8, 4u8, 38u8), t)
    };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}
