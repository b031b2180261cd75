// Primitives for reading workbooks (xlsx, xls, ods, ...).

use calamine::{open_workbook_auto, DataType, Range, Reader};

use crate::survey::*;

fn read_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Bool(b) => CellValue::Bool(*b),
        // Dates are kept as their serial number.
        DataType::DateTime(f) => CellValue::Number(*f),
        // Error cells and blanks.
        _ => CellValue::Empty,
    }
}

/// Converts a calamine range into a sheet.
///
/// Ranges start at the first used cell. The rows are padded on the left so
/// that column positions are the positions in the worksheet.
pub fn range_to_sheet(name: &str, range: &Range<DataType>) -> Sheet {
    let col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| {
            let mut cells = vec![CellValue::Empty; col_offset];
            cells.extend(row.iter().map(read_cell));
            cells
        })
        .collect();
    debug!(
        "range_to_sheet: {:?}: {} rows, column offset {}",
        name,
        rows.len(),
        col_offset
    );
    Sheet::new(name, rows)
}

/// Reads all the worksheets of a workbook, in order, or only the given one.
pub fn read_excel_sheets(path: &str, worksheet_name: Option<&str>) -> SurveyResult<Vec<Sheet>> {
    debug!(
        "read_excel_sheets: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet) = worksheet_name {
        let range = workbook
            .worksheet_range(worksheet)
            .context(MissingWorksheetSnafu { worksheet, path })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(vec![range_to_sheet(worksheet, &range)]);
    }

    let sheets: Vec<Sheet> = workbook
        .worksheets()
        .iter()
        .map(|(name, range)| range_to_sheet(name, range))
        .collect();
    if sheets.is_empty() {
        whatever!("Workbook {} has no worksheet", path);
    }
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> DataType {
        DataType::String(s.to_string())
    }

    #[test]
    fn cells_are_converted() {
        assert_eq!(read_cell(&text("Section")), CellValue::Text("Section".to_string()));
        assert_eq!(read_cell(&DataType::Int(3)), CellValue::Number(3.0));
        assert_eq!(read_cell(&DataType::Float(-1.0)), CellValue::Number(-1.0));
        assert_eq!(read_cell(&DataType::Bool(true)), CellValue::Bool(true));
        assert_eq!(read_cell(&DataType::DateTime(44927.0)), CellValue::Number(44927.0));
        assert_eq!(read_cell(&DataType::Empty), CellValue::Empty);
    }

    #[test]
    fn ranges_keep_their_column_positions() {
        // Data starts in the second row and second column (B2).
        let mut range: Range<DataType> = Range::new((1, 1), (3, 5));
        let rows = [
            ["1", "Informations", "Section", "-1", "1"],
            ["2", "Adresse du bureau", "Question", "1", "2"],
            ["3", "Oui", "Response", "2", "3"],
        ];
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                range.set_value((1 + r as u32, 1 + c as u32), text(v));
            }
        }
        let sheet = range_to_sheet("Feuil1", &range);
        assert_eq!(sheet.name, "Feuil1");
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0].len(), 6);
        assert_eq!(sheet.rows[0][0], CellValue::Empty);
        assert_eq!(sheet.rows[1][2], text_value("Adresse du bureau"));
        assert_eq!(sheet.rows[2][3], text_value("Response"));
    }

    fn text_value(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn positioned_sheet_is_extracted() {
        let mut range: Range<DataType> = Range::new((0, 0), (3, 4));
        let rows = [
            ["1", "Informations", "Section", "-1", "1"],
            ["2", "Adresse du bureau", "Question", "1", "2"],
            ["3", "Oui", "Response", "2", "3"],
            ["4", "Non", "Response", "2", "4"],
        ];
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), text(v));
            }
        }
        let workbook = Workbook {
            title: "diagnostic".to_string(),
            source_name: "diagnostic.xlsx".to_string(),
            sheets: vec![range_to_sheet("Feuil1", &range)],
        };
        let ex = extract_survey(&workbook, &ExtractionSettings::DEFAULT_SETTINGS);
        assert_eq!(ex.format, SourceFormat::Tagged);
        let q = &ex.survey.sections[0].questions[0];
        assert_eq!(q.options.len(), 2);
        assert_eq!(q.question_type, QuestionType::SingleChoice);
    }

    #[test]
    fn missing_workbook() {
        assert!(matches!(
            read_excel_sheets("/nonexistent/file.xlsx", None),
            Err(SurveyError::OpeningExcel { .. })
        ));
    }
}
