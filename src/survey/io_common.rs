use std::path::Path;

use crate::survey::*;

/// The file name of a path, or the path itself when it has none.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The file name without its extension.
pub fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| simplify_file_name(path))
}

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// The readers available for the spreadsheets.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SourceKind {
    /// All the workbook formats: xlsx, xlsm, xlsb, xls, ods.
    Excel,
    Csv,
}

impl SourceKind {
    pub fn from_provider(provider: &str) -> SurveyResult<SourceKind> {
        match provider.trim().to_lowercase().as_str() {
            "excel" => Ok(SourceKind::Excel),
            "csv" => Ok(SourceKind::Csv),
            _ => InvalidConfigValueSnafu {
                field: "provider",
                value: provider,
            }
            .fail(),
        }
    }

    /// Guesses the reader from the file extension.
    pub fn from_path(path: &str) -> SurveyResult<SourceKind> {
        let extension = Path::new(path)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        if EXCEL_EXTENSIONS.contains(&extension.as_str()) {
            Ok(SourceKind::Excel)
        } else if extension == "csv" {
            Ok(SourceKind::Csv)
        } else {
            UnsupportedFormatSnafu { path, extension }.fail()
        }
    }
}

/// The database schemas the surveys are meant for.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SchemaName {
    Balance,
    Diagnostic,
    Program,
}

impl SchemaName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaName::Balance => "survey_balance",
            SchemaName::Diagnostic => "survey_diagnostic",
            SchemaName::Program => "survey_program",
        }
    }

    pub fn parse(name: &str) -> SurveyResult<SchemaName> {
        match name.trim() {
            "survey_balance" => Ok(SchemaName::Balance),
            "survey_diagnostic" => Ok(SchemaName::Diagnostic),
            "survey_program" => Ok(SchemaName::Program),
            _ => InvalidSchemaNameSnafu { name }.fail(),
        }
    }

    /// Guesses the schema from the name of the source file. Defaults to the balance schema.
    pub fn infer(file_name: &str) -> SchemaName {
        let lower = file_name.to_lowercase();
        if lower.contains("bilan") || lower.contains("activites") {
            SchemaName::Balance
        } else if lower.contains("diagnostic") {
            SchemaName::Diagnostic
        } else if lower.contains("programme") || lower.contains("programming") {
            SchemaName::Program
        } else {
            SchemaName::Balance
        }
    }
}
