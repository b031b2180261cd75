pub use crate::config::*;

/// The header row of a tagged sheet, as produced by the modelisation tools.
pub const TAGGED_HEADER: [&str; 5] = [
    "entryId",
    "entryLabel",
    "entryName",
    "entryParentIndex",
    "entryIndex",
];

/// A builder for assembling sheets by hand.
///
/// Readers produce sheets from files; this builder is meant for embedding
/// callers and tests.
///
/// ```
/// use survey_structure::builder::{SheetBuilder, WorkbookBuilder};
/// use survey_structure::{extract_survey, ExtractionSettings};
///
/// let sheet = SheetBuilder::new("Feuil1")
///     .tagged_header()
///     .entry("Section", "Informations", None, Some(1))
///     .entry("Question", "Adresse du bureau", Some(1), Some(2))
///     .entry("Response", "Oui", Some(2), Some(3))
///     .entry("Response", "Non", Some(2), Some(4))
///     .build();
/// let workbook = WorkbookBuilder::new("diagnostic.xlsx").sheet(sheet).build();
///
/// let extraction = extract_survey(&workbook, &ExtractionSettings::DEFAULT_SETTINGS);
/// assert_eq!(extraction.survey.sections.len(), 1);
/// assert_eq!(extraction.survey.sections[0].questions[0].options.len(), 2);
/// ```
pub struct SheetBuilder {
    pub(crate) _name: String,
    pub(crate) _rows: Vec<Vec<CellValue>>,
}

impl SheetBuilder {
    pub fn new(name: &str) -> SheetBuilder {
        SheetBuilder {
            _name: name.to_string(),
            _rows: Vec::new(),
        }
    }

    /// Adds the standard header row of tagged sheets.
    pub fn tagged_header(self) -> SheetBuilder {
        self.row(&TAGGED_HEADER)
    }

    /// Adds a row of text cells. Empty strings become blank cells.
    pub fn row(self, cells: &[&str]) -> SheetBuilder {
        let row = cells
            .iter()
            .map(|s| {
                if s.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(s.to_string())
                }
            })
            .collect();
        self.cells(row)
    }

    /// Adds a row of arbitrary cells.
    pub fn cells(mut self, row: Vec<CellValue>) -> SheetBuilder {
        self._rows.push(row);
        self
    }

    /// Adds a tagged entry, laid out in the standard column order:
    /// row id, label, type, parent index, entry index.
    pub fn entry(
        self,
        kind: &str,
        label: &str,
        parent_index: Option<i64>,
        entry_index: Option<i64>,
    ) -> SheetBuilder {
        let id = CellValue::Number((self._rows.len() + 1) as f64);
        let index_cell = |x: Option<i64>| match x {
            Some(i) => CellValue::Number(i as f64),
            None => CellValue::Empty,
        };
        let row = vec![
            id,
            CellValue::Text(label.to_string()),
            CellValue::Text(kind.to_string()),
            index_cell(parent_index),
            index_cell(entry_index),
        ];
        self.cells(row)
    }

    pub fn build(self) -> Sheet {
        Sheet {
            name: self._name,
            rows: self._rows,
        }
    }
}

/// Groups sheets into a workbook named after a source file.
pub struct WorkbookBuilder {
    pub(crate) _source_name: String,
    pub(crate) _title: Option<String>,
    pub(crate) _sheets: Vec<Sheet>,
}

impl WorkbookBuilder {
    pub fn new(source_name: &str) -> WorkbookBuilder {
        WorkbookBuilder {
            _source_name: source_name.to_string(),
            _title: None,
            _sheets: Vec::new(),
        }
    }

    /// Overrides the display title. Defaults to the source name without its extension.
    pub fn title(mut self, title: &str) -> WorkbookBuilder {
        self._title = Some(title.to_string());
        self
    }

    pub fn sheet(mut self, sheet: Sheet) -> WorkbookBuilder {
        self._sheets.push(sheet);
        self
    }

    pub fn build(self) -> Workbook {
        let title = self._title.unwrap_or_else(|| {
            match self._source_name.rsplit_once('.') {
                Some((stem, _)) if !stem.is_empty() => stem.to_string(),
                _ => self._source_name.clone(),
            }
        });
        Workbook {
            title,
            source_name: self._source_name,
            sheets: self._sheets,
        }
    }
}
