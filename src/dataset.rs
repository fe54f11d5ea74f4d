//! In-memory tabular model: columns with a kind fixed at load time.

use serde::Serialize;

/// Tokens treated as a missing cell, compared case-insensitively after
/// trimming. Mirrors the usual NA vocabulary of delimited exports.
const NA_TOKENS: &[&str] = &["na", "n/a", "null", "nan", "none"];

/// Scalar kind of a column, decided once when the dataset is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Textual,
    Unresolved,
}

/// Cell storage, typed per kind. `Unresolved` keeps only the length: every
/// cell of such a column is missing.
#[derive(Debug, Clone)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Textual(Vec<Option<String>>),
    Unresolved { len: usize },
}

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    /// Classify raw cells and build the typed column: numeric when every
    /// non-missing cell parses as a number, unresolved when no cell is
    /// present at all, textual otherwise.
    pub fn infer(name: String, cells: Vec<Option<String>>) -> Self {
        let mut any_present = false;
        let mut all_numeric = true;
        for raw in cells.iter().flatten() {
            any_present = true;
            if parse_numeric(raw).is_none() {
                all_numeric = false;
                break;
            }
        }

        let values = if !any_present {
            ColumnValues::Unresolved { len: cells.len() }
        } else if all_numeric {
            ColumnValues::Numeric(
                cells
                    .iter()
                    .map(|c| c.as_deref().and_then(parse_numeric))
                    .collect(),
            )
        } else {
            ColumnValues::Textual(cells)
        };

        Self { name, values }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Textual(_) => ColumnKind::Textual,
            ColumnValues::Unresolved { .. } => ColumnKind::Unresolved,
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Textual(v) => v.len(),
            ColumnValues::Unresolved { len } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of missing cells.
    pub fn missing_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValues::Textual(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValues::Unresolved { len } => *len,
        }
    }

    /// Cell slice when the column is numeric, `None` otherwise.
    pub fn numbers(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Cell slice when the column is textual, `None` otherwise.
    pub fn texts(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Textual(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered columns plus the invariant row count. Built once by the loader and
/// read-only from then on.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Self {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        debug_assert!(columns.iter().all(|c| c.len() == row_count));
        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Numeric columns, in dataset order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Numeric)
    }

    /// Textual columns, in dataset order.
    pub fn textual_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Textual)
    }
}

/// Missing-cell test for a raw cell as read from the file.
pub fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NA_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}

/// Numeric view of a raw cell. NA tokens are filtered out before this is
/// called, so `nan` never reaches the float parser.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
