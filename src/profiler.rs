//! Descriptive profiling of a loaded dataset.
//!
//! `profile` is a pure, total pass: zero rows, zero numeric columns or
//! all-missing columns produce empty-but-well-formed sub-structures, and
//! undefined statistics come back as NaN rather than an error. Conventions
//! match the usual dataframe ones: sample standard deviation, quartiles by
//! linear interpolation, adjusted Fisher-Pearson skewness, pairwise-complete
//! Pearson correlation.

use serde::Serialize;

use crate::dataset::{Column, ColumnKind, Dataset};

/// Immutable statistical digest of a [`Dataset`]. Column entries keep the
/// dataset's original order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileSummary {
    pub row_count: usize,
    pub columns: Vec<ColumnProfile>,
    pub correlation: CorrelationMatrix,
    pub skewness: Vec<SkewnessEntry>,
}

impl ProfileSummary {
    /// Column names in dataset order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
    pub stats: ColumnStats,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ColumnStats {
    Numeric(NumericStats),
    Textual(TextualStats),
    Empty(EmptyStats),
}

/// Field names mirror a dataframe `describe()` row for a numeric column.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextualStats {
    pub count: usize,
    pub unique: usize,
    pub top: String,
    pub freq: usize,
}

/// Stats entry for a column with no usable cells.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmptyStats {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkewnessEntry {
    pub column: String,
    pub value: f64,
}

/// Profile a dataset. Pure: same input, same digest.
pub fn profile(dataset: &Dataset) -> ProfileSummary {
    let columns = dataset.columns().iter().map(profile_column).collect();

    let numeric: Vec<&Column> = dataset.numeric_columns().collect();
    let correlation = correlation_matrix(&numeric);
    let skewness = numeric
        .iter()
        .map(|col| SkewnessEntry {
            column: col.name().to_string(),
            value: skewness(&present_values(col)),
        })
        .collect();

    ProfileSummary {
        row_count: dataset.row_count(),
        columns,
        correlation,
        skewness,
    }
}

fn profile_column(col: &Column) -> ColumnProfile {
    let stats = match col.kind() {
        ColumnKind::Numeric => ColumnStats::Numeric(numeric_stats(&present_values(col))),
        ColumnKind::Textual => ColumnStats::Textual(textual_stats(
            col.texts().unwrap_or_default(),
        )),
        ColumnKind::Unresolved => ColumnStats::Empty(EmptyStats { count: 0 }),
    };
    ColumnProfile {
        name: col.name().to_string(),
        kind: col.kind(),
        missing: col.missing_count(),
        stats,
    }
}

/// Non-missing cells of a numeric column. Empty for other kinds.
fn present_values(col: &Column) -> Vec<f64> {
    col.numbers()
        .map(|cells| cells.iter().flatten().copied().collect())
        .unwrap_or_default()
}

fn numeric_stats(values: &[f64]) -> NumericStats {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    NumericStats {
        count: values.len(),
        mean: mean(values),
        std: sample_std(values),
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: percentile(&sorted, 0.25),
        q50: percentile(&sorted, 0.50),
        q75: percentile(&sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

fn textual_stats(cells: &[Option<String>]) -> TextualStats {
    use std::collections::HashMap;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for value in cells.iter().flatten() {
        let entry = counts.entry(value.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }

    // Ties go to the value seen first.
    let mut top = "";
    let mut freq = 0;
    for value in &order {
        let count = counts[value];
        if count > freq {
            top = value;
            freq = count;
        }
    }

    TextualStats {
        count: cells.iter().flatten().count(),
        unique: counts.len(),
        top: top.to_string(),
        freq,
    }
}

/// Pairwise-complete Pearson matrix over the numeric columns, symmetric with
/// a unit diagonal. Empty when there are no numeric columns.
fn correlation_matrix(numeric: &[&Column]) -> CorrelationMatrix {
    let n = numeric.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for (i, row) in values.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearson(
                numeric[i].numbers().unwrap_or_default(),
                numeric[j].numbers().unwrap_or_default(),
            );
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        labels: numeric.iter().map(|c| c.name().to_string()).collect(),
        values,
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1). NaN below two observations.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    (ss / (n - 1) as f64).sqrt()
}

/// Linear-interpolation percentile over pre-sorted values, `p` in [0, 1].
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

/// Adjusted Fisher-Pearson skewness. NaN below three observations or at zero
/// variance.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }
    let m = mean(values);
    let nf = n as f64;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 <= 0.0 || !m2.is_finite() {
        return f64::NAN;
    }
    let g1 = m3 / m2.powf(1.5);
    let adjusted = g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0);
    if adjusted.is_finite() {
        adjusted
    } else {
        f64::NAN
    }
}

/// Pearson correlation over rows where both cells are present. NaN below two
/// complete pairs, at zero variance, or over non-finite data.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| x.zip(*y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in &pairs {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    let denom = (vx * vy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return f64::NAN;
    }
    let r = cov / denom;
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        f64::NAN
    }
}
