use log::debug;
use std::collections::BTreeSet;

use crate::config::{CellValue, ExtractionSettings, RowAnomaly, Sheet};
use crate::tree::AuthoredNotes;

/// The literal markers that reveal a tagged sheet.
pub const STRUCTURE_MARKERS: [&str; 5] = ["Survey", "Section", "Question", "Response", "Context"];

/// The two conventions of the sources.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SourceFormat {
    /// Explicit entry type and parent columns on every row.
    Tagged,
    /// Free text anywhere, classified heuristically.
    Untagged,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Tagged => "tagged",
            SourceFormat::Untagged => "untagged",
        }
    }
}

/// Decides whether a sheet follows the tagged convention.
///
/// The leading rows are scanned for the structural markers; the sheet is tagged
/// as soon as enough distinct markers show up. Small sheets are never tagged.
pub fn detect_format(sheet: &Sheet, settings: &ExtractionSettings) -> SourceFormat {
    if sheet.rows.len() < settings.min_rows || sheet.width() < settings.min_columns {
        debug!(
            "detect_format: sheet {:?} too small ({} rows, {} columns)",
            sheet.name,
            sheet.rows.len(),
            sheet.width()
        );
        return SourceFormat::Untagged;
    }

    let mut found: BTreeSet<&str> = BTreeSet::new();
    let mut marked_rows = 0;
    for idx in 0..sheet.rows.len().min(settings.detection_row_window) {
        let text = sheet.row_text(idx);
        let markers: Vec<&str> = STRUCTURE_MARKERS
            .iter()
            .filter(|m| text.contains(*m))
            .cloned()
            .collect();
        if !markers.is_empty() {
            marked_rows += 1;
        }
        found.extend(markers);
    }
    debug!(
        "detect_format: sheet {:?}: markers {:?} in {} rows",
        sheet.name, found, marked_rows
    );

    if found.len() >= settings.min_marker_types {
        SourceFormat::Tagged
    } else {
        SourceFormat::Untagged
    }
}

// ******** Column resolution *********

/// The header token of the label column. Its presence marks a header row.
pub const LABEL_HEADER: &str = "entryLabel";

const DESCRIPTION_HEADERS: &[&str] = &["description", "desc"];
const ANNOTATION_HEADERS: &[&str] = &["annotation", "note", "remark", "comment"];
const CAUTION_HEADERS: &[&str] = &["caution", "warning", "attention", "avertissement"];
const CONDITION_HEADERS: &[&str] = &["condition", "prerequis", "requirement"];

/// The resolved position of each semantic field of a tagged sheet.
///
/// Computed once per sheet, then applied to every row.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ColumnMap {
    pub label: Option<usize>,
    pub kind: Option<usize>,
    pub parent_index: Option<usize>,
    pub entry_index: Option<usize>,
    pub description: Option<usize>,
    pub annotation: Option<usize>,
    pub caution: Option<usize>,
    pub conditions: Option<usize>,
    /// Index of the first data row.
    pub first_data_row: usize,
}

impl ColumnMap {
    /// The fixed layout used when the sheet has no recognizable header:
    /// label, type, parent and index in the 2nd to 5th columns.
    pub const POSITIONAL: ColumnMap = ColumnMap {
        label: Some(1),
        kind: Some(2),
        parent_index: Some(3),
        entry_index: Some(4),
        description: None,
        annotation: None,
        caution: None,
        conditions: None,
        first_data_row: 0,
    };

    fn is_structural(&self, idx: usize) -> bool {
        [self.label, self.kind, self.parent_index, self.entry_index].contains(&Some(idx))
    }

    /// Locates the note columns from the header names, skipping the structural columns.
    fn with_note_columns(mut self, header: &[CellValue]) -> ColumnMap {
        let names: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.is_structural(*idx))
            .filter_map(|(idx, c)| c.as_text().map(|s| (idx, s.to_lowercase())))
            .collect();
        let find = |tokens: &[&str]| {
            names
                .iter()
                .find(|(_, name)| tokens.iter().any(|t| name.contains(t)))
                .map(|(idx, _)| *idx)
        };
        self.description = find(DESCRIPTION_HEADERS);
        self.annotation = find(ANNOTATION_HEADERS);
        self.caution = find(CAUTION_HEADERS);
        self.conditions = find(CONDITION_HEADERS);
        self
    }
}

/// Finds the columns of a tagged sheet, from the header row when there is one.
pub fn resolve_columns(sheet: &Sheet) -> ColumnMap {
    let header = match sheet.rows.first() {
        Some(h) => h,
        None => return ColumnMap::POSITIONAL,
    };
    let has_header = header
        .iter()
        .any(|c| c.as_text().as_deref() == Some(LABEL_HEADER));
    if !has_header {
        debug!(
            "resolve_columns: no header in sheet {:?}, using positions",
            sheet.name
        );
        return ColumnMap::POSITIONAL;
    }

    let mut map = ColumnMap {
        first_data_row: 1,
        ..ColumnMap::default()
    };
    for (idx, cell) in header.iter().enumerate() {
        let name = match cell.as_text() {
            Some(n) => n,
            None => continue,
        };
        if name.contains(LABEL_HEADER) {
            map.label.get_or_insert(idx);
        } else if name.contains("entryName") {
            map.kind.get_or_insert(idx);
        } else if name.contains("entryParentIndex") {
            map.parent_index.get_or_insert(idx);
        } else if name.contains("entryIndex") {
            map.entry_index.get_or_insert(idx);
        }
    }
    let map = map.with_note_columns(header);
    debug!("resolve_columns: sheet {:?}: {:?}", sheet.name, map);
    map
}

// ******** Entries *********

/// The type tag of a row in a tagged sheet.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum EntryKind {
    Survey,
    Context,
    Section,
    Subsection,
    Question,
    Response,
}

impl EntryKind {
    /// Reads a type tag, ignoring case and surrounding spaces.
    pub fn parse(tag: &str) -> Option<EntryKind> {
        match tag.trim().to_lowercase().as_str() {
            "survey" => Some(EntryKind::Survey),
            "context" => Some(EntryKind::Context),
            "section" => Some(EntryKind::Section),
            "subsection" => Some(EntryKind::Subsection),
            "question" => Some(EntryKind::Question),
            "response" => Some(EntryKind::Response),
            _ => None,
        }
    }
}

/// One classified row of a tagged sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Entry {
    pub kind: EntryKind,
    pub label: String,
    pub parent_index: Option<i64>,
    pub entry_index: Option<i64>,
    pub notes: AuthoredNotes,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

fn cell<'a>(
    row: &'a [CellValue],
    col: Option<usize>,
    field: &'static str,
) -> Result<&'a CellValue, RowAnomaly> {
    let idx = col.ok_or(RowAnomaly::MissingColumn(field))?;
    Ok(row.get(idx).unwrap_or(&EMPTY_CELL))
}

fn note(row: &[CellValue], col: Option<usize>, label: Option<&str>) -> Option<String> {
    col.and_then(|idx| row.get(idx))
        .and_then(|c| c.as_text())
        .filter(|s| Some(s.as_str()) != label)
}

impl ColumnMap {
    /// Reads one row.
    ///
    /// Returns Ok(None) for rows to skip (blank label or type, unknown type),
    /// and an error when a structural column could not be resolved at all.
    pub fn read_entry(&self, row: &[CellValue]) -> Result<Option<Entry>, RowAnomaly> {
        let tag = cell(row, self.kind, "type")?.as_text();
        let label = cell(row, self.label, "label")?.as_text();
        let (tag, label) = match (tag, label) {
            (Some(t), Some(l)) => (t, l),
            _ => return Ok(None),
        };
        let kind = match EntryKind::parse(&tag) {
            Some(k) => k,
            None => {
                debug!("read_entry: unknown entry type {:?}", tag);
                return Ok(None);
            }
        };
        // -1 is the sentinel for "no parent".
        let parent_index = self
            .parent_index
            .and_then(|idx| row.get(idx))
            .and_then(|c| c.as_index())
            .filter(|p| *p != -1);
        let entry_index = self
            .entry_index
            .and_then(|idx| row.get(idx))
            .and_then(|c| c.as_index());
        let annotation = note(row, self.annotation, Some(&label));
        let notes = AuthoredNotes {
            // Annotation columns double as descriptions.
            description: note(row, self.description, Some(&label))
                .or_else(|| annotation.clone()),
            annotation,
            caution: note(row, self.caution, None),
            conditions: note(row, self.conditions, None),
        };
        Ok(Some(Entry {
            kind,
            label,
            parent_index,
            entry_index,
            notes,
        }))
    }
}
