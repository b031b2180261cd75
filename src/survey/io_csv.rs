// Primitives for reading CSV files.

use csv::ReaderBuilder;

use crate::survey::*;

/// Reads a CSV export as a single sheet named after the file.
///
/// Every line is a row, including the first one: header detection is left to
/// the extraction. Lines may have different lengths.
pub fn read_csv_sheet(path: &str) -> SurveyResult<Sheet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    // Exports from Excel are often not UTF-8: fields are decoded one by one.
    for (idx, record_r) in reader.byte_records().enumerate() {
        let lineno = idx + 1;
        let record = record_r.context(CsvLineParseSnafu { path, lineno })?;
        let row: Vec<CellValue> = record
            .iter()
            .map(|bytes| {
                let s = String::from_utf8_lossy(bytes);
                if s.contains(char::REPLACEMENT_CHARACTER) {
                    warn!(
                        "read_csv_sheet: {:?}: line {}: field is not valid UTF-8: {:?}",
                        path, lineno, s
                    );
                }
                if s.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(s.into_owned())
                }
            })
            .collect();
        rows.push(row);
    }
    debug!("read_csv_sheet: {:?}: {} rows", path, rows.len());
    Ok(Sheet::new(&file_stem(path), rows))
}
