use log::{debug, info, warn};

use snafu::{prelude::*, Backtrace, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use survey_structure::*;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::io_common::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Input file {path} does not exist"))]
    MissingFile { path: String },
    #[snafu(display("Unsupported file format {extension:?} for {path}"))]
    UnsupportedFormat { path: String, extension: String },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet:?} not found in {path}"))]
    MissingWorksheet { worksheet: String, path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of CSV file {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error reading JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid value for {field}: {value}"))]
    InvalidConfigValue { field: String, value: String },
    #[snafu(display("Configuration file {path} has no parent directory"))]
    MissingParentDir { path: String },
    #[snafu(display("No input file: use --input or a configuration file with fileSources"))]
    NoInput {},
    #[snafu(display(
        "Unknown schema name {name:?}, expected one of survey_balance, survey_diagnostic, survey_program"
    ))]
    InvalidSchemaName { name: String },
    #[snafu(display("Difference detected between the extracted surveys and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
        backtrace: Backtrace,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// Loads one file source into memory.
fn read_workbook(path: &Path, source: &FileSource) -> SurveyResult<Workbook> {
    let path_s = path.display().to_string();
    ensure!(path.exists(), MissingFileSnafu { path: path_s });
    let kind = match &source.provider {
        Some(p) => SourceKind::from_provider(p)?,
        None => SourceKind::from_path(&path_s)?,
    };
    info!("read_workbook: reading {:?} as {:?}", path_s, kind);
    let sheets = match kind {
        SourceKind::Excel => {
            io_excel::read_excel_sheets(&path_s, source.excel_worksheet_name.as_deref())?
        }
        SourceKind::Csv => vec![io_csv::read_csv_sheet(&path_s)?],
    };
    Ok(Workbook {
        title: source.title.clone().unwrap_or_else(|| file_stem(&path_s)),
        source_name: simplify_file_name(&path_s),
        sheets,
    })
}

fn build_result_js(schema_name: SchemaName, ex: &Extraction) -> SurveyResult<JSValue> {
    let issues: Vec<String> = ex.issues.iter().map(|i| i.to_string()).collect();
    let refs: Vec<String> = ex.table_references.iter().map(|r| r.to_string()).collect();
    let survey_js = serde_json::to_value(&ex.survey).context(ParsingJsonSnafu {})?;
    Ok(json!({
        "source": ex.survey.metadata.source_file,
        "schemaName": schema_name.as_str(),
        "format": ex.format.as_str(),
        "sheet": ex.sheet,
        "issues": issues,
        "tableReferences": refs,
        "survey": survey_js
    }))
}

/// Merges the command line with the configuration file, if any.
///
/// Returns the configuration and the directory that relative paths refer to.
fn assemble_config(args: &Args) -> SurveyResult<(ExtractConfig, PathBuf)> {
    let (mut config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {
                    path: config_path.clone(),
                })?
                .to_path_buf();
            (config, root)
        }
        None => (ExtractConfig::default(), PathBuf::new()),
    };

    if let Some(input) = &args.input {
        config.file_sources = vec![FileSource {
            file_path: input.clone(),
            ..FileSource::default()
        }];
    }
    for source in config.file_sources.iter_mut() {
        if args.input_type.is_some() {
            source.provider = args.input_type.clone();
        }
        if args.excel_worksheet_name.is_some() {
            source.excel_worksheet_name = args.excel_worksheet_name.clone();
        }
        if args.title.is_some() {
            source.title = args.title.clone();
        }
    }
    if args.out.is_some() {
        config.output_settings.output_path = args.out.clone();
    }
    if args.schema_name.is_some() {
        config.output_settings.schema_name = args.schema_name.clone();
    }
    // The input path is taken as given, not relative to the configuration.
    let root = if args.input.is_some() {
        PathBuf::new()
    } else {
        root
    };
    Ok((config, root))
}

/// Runs the extraction for every file source and returns the output document.
pub fn extract_all(config: &ExtractConfig, root: &Path) -> SurveyResult<JSValue> {
    ensure!(!config.file_sources.is_empty(), NoInputSnafu {});
    let settings = match &config.parser_settings {
        Some(ps) => ps.to_settings()?,
        None => ExtractionSettings::DEFAULT_SETTINGS,
    };
    debug!("extract_all: settings: {:?}", settings);
    let explicit_schema = match &config.output_settings.schema_name {
        Some(name) => Some(SchemaName::parse(name)?),
        None => None,
    };

    let mut results: Vec<JSValue> = Vec::new();
    for source in config.file_sources.iter() {
        let path: PathBuf = root.join(&source.file_path);
        let workbook = read_workbook(&path, source)?;
        let schema_name =
            explicit_schema.unwrap_or_else(|| SchemaName::infer(&workbook.source_name));
        let extraction = extract_survey(&workbook, &settings);
        for issue in extraction.issues.iter() {
            warn!(
                "{}: validation issue ({:?}): {}",
                workbook.source_name,
                issue.severity(),
                issue
            );
        }
        if !extraction.table_references.is_empty() {
            info!(
                "{}: table references: {:?}",
                workbook.source_name,
                extraction
                    .table_references
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<String>>()
            );
        }
        results.push(build_result_js(schema_name, &extraction)?);
    }
    Ok(json!({ "results": results }))
}

fn write_output(pretty_js: &str, output_path: &Option<String>) -> SurveyResult<()> {
    match output_path.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            info!("write_output: writing to {:?}", path);
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

fn check_reference(pretty_js: &str, reference_path: &str) -> SurveyResult<()> {
    let reference = read_reference(reference_path)?;
    let pretty_ref = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    if pretty_ref != pretty_js {
        warn!("Found differences with the reference {:?}", reference_path);
        print_diff(pretty_ref.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("Output matches the reference {:?}", reference_path);
    Ok(())
}

pub fn run_extraction(args: &Args) -> SurveyResult<()> {
    let (config, root) = assemble_config(args)?;
    info!("config: {:?}", config);

    let result_js = extract_all(&config, &root)?;
    let pretty_js = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_output(&pretty_js, &config.output_settings.output_path)?;

    if let Some(reference_path) = &args.reference {
        check_reference(&pretty_js, reference_path)?;
    }
    Ok(())
}
