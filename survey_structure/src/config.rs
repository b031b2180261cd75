// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The content of one spreadsheet cell, as handed over by the readers.
///
/// Readers are expected to collapse their own cell representations into these
/// variants. Dates are carried as their serial number.
#[derive(PartialEq, Debug, Clone, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// The trimmed textual rendering of the cell, or None for blank cells.
    ///
    /// Integral numbers are rendered without a fractional part, so that an
    /// index stored as a float reads `3` and not `3.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            CellValue::Number(f) => Some(render_number(*f)),
            CellValue::Bool(b) => Some(b.to_string()),
        }
    }

    /// Reads the cell as an integer index. Fractional or non-numeric content
    /// yields None.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            CellValue::Number(f) => float_to_index(*f),
            CellValue::Text(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().and_then(float_to_index))
            }
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_none()
    }
}

fn float_to_index(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        Some(f as i64)
    } else {
        None
    }
}

fn render_number(f: f64) -> String {
    match float_to_index(f) {
        Some(i) => i.to_string(),
        None => f.to_string(),
    }
}

/// One named sheet: an ordered list of rows of heterogeneous cells.
///
/// Rows do not need to have the same length.
#[derive(PartialEq, Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: &str, rows: Vec<Vec<CellValue>>) -> Sheet {
        Sheet {
            name: name.to_string(),
            rows,
        }
    }

    /// The number of columns of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// All the non-blank cells of a row, rendered and joined by a space.
    pub fn row_text(&self, row_idx: usize) -> String {
        self.rows
            .get(row_idx)
            .map(|row| {
                row.iter()
                    .filter_map(|c| c.as_text())
                    .collect::<Vec<String>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }
}

/// The content of a source file, as read by one of the readers.
#[derive(PartialEq, Debug, Clone)]
pub struct Workbook {
    /// The display title used when the sheets do not provide one (usually the file stem).
    pub title: String,
    /// The name of the source file, used for descriptions and bookkeeping.
    pub source_name: String,
    pub sheets: Vec<Sheet>,
}

// ******** Errors *********

/// Problems that prevent a single row from being turned into an entry.
///
/// These never escape the row loop: the row is skipped and a warning is logged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RowAnomaly {
    /// The row is shorter than the resolved column for this field.
    MissingColumn(&'static str),
    /// The row refers to an open container that the tree does not hold.
    DetachedCursor(&'static str),
}

impl Error for RowAnomaly {}

impl Display for RowAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowAnomaly::MissingColumn(field) => write!(f, "row has no {} column", field),
            RowAnomaly::DetachedCursor(node) => {
                write!(f, "open {} is missing from the tree", node)
            }
        }
    }
}

// ********* Configuration **********

/// Tunable thresholds of the extraction pipeline.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ExtractionSettings {
    /// Number of leading rows inspected by the format detector.
    pub detection_row_window: usize,
    /// Number of distinct structural markers needed to classify a sheet as tagged.
    pub min_marker_types: usize,
    /// Sheets with fewer rows are never tagged.
    pub min_rows: usize,
    /// Sheets with fewer columns are never tagged.
    pub min_columns: usize,
    /// Maximum length (in characters) of one path segment.
    pub max_segment_chars: usize,
    /// A truncated segment only breaks at punctuation or a space found after this position.
    pub min_break_chars: usize,
    /// Untagged text must be strictly longer than this to be taken as a question.
    pub min_question_chars: usize,
}

impl ExtractionSettings {
    pub const DEFAULT_SETTINGS: ExtractionSettings = ExtractionSettings {
        detection_row_window: 20,
        min_marker_types: 3,
        min_rows: 3,
        min_columns: 5,
        max_segment_chars: 60,
        min_break_chars: 40,
        min_question_chars: 10,
    };
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        ExtractionSettings::DEFAULT_SETTINGS
    }
}
