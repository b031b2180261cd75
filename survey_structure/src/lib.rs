mod config;
mod tree;

pub mod builder;
pub mod detect;
pub mod enrich;
pub mod heuristic;
pub mod manual;
pub mod rules;
pub mod table_refs;
pub mod tagged;
pub mod validate;

use log::info;

pub use crate::config::*;
pub use crate::detect::SourceFormat;
pub use crate::tree::*;
pub use crate::validate::{Severity, ValidationIssue};

/// The outcome of the extraction of one workbook.
#[derive(PartialEq, Debug, Clone)]
pub struct Extraction {
    pub survey: Survey,
    /// The convention the survey was read with.
    pub format: SourceFormat,
    /// The tagged sheet the survey comes from. None on the untagged path.
    pub sheet: Option<String>,
    pub issues: Vec<ValidationIssue>,
    pub table_references: Vec<TableRef>,
}

/// Reconstructs the survey held by a workbook.
///
/// The first tagged sheet that yields at least one section provides the
/// survey. When there is none, every sheet is classified heuristically and
/// contributes at most one section.
///
/// The extraction never fails: thin or empty results are reported in the
/// issues.
///
/// ```
/// use survey_structure::builder::{SheetBuilder, WorkbookBuilder};
/// use survey_structure::*;
///
/// let notes = SheetBuilder::new("donnees_generales")
///     .row(&["Quel est le nom de la structure ?"])
///     .row(&["Combien d'agents employez-vous ?"])
///     .build();
/// let workbook = WorkbookBuilder::new("bilan.csv").sheet(notes).build();
///
/// let extraction = extract_survey(&workbook, &ExtractionSettings::DEFAULT_SETTINGS);
/// assert_eq!(extraction.format, SourceFormat::Untagged);
/// assert_eq!(extraction.survey.title, "bilan");
/// assert_eq!(extraction.survey.sections[0].title, "Donnees Generales");
/// assert_eq!(extraction.survey.question_count(), 2);
/// assert_eq!(
///     extraction.issues,
///     vec![ValidationIssue::FewQuestions(2)]
/// );
/// ```
pub fn extract_survey(workbook: &Workbook, settings: &ExtractionSettings) -> Extraction {
    let tagged = workbook.sheets.iter().find_map(|sheet| {
        let format = detect::detect_format(sheet, settings);
        info!(
            "extract_survey: sheet {:?}: format {}",
            sheet.name,
            format.as_str()
        );
        if format != SourceFormat::Tagged {
            return None;
        }
        let survey = tagged::build_survey(sheet, &workbook.title, &workbook.source_name);
        if survey.sections.is_empty() {
            info!(
                "extract_survey: tagged sheet {:?} has no section, skipping",
                sheet.name
            );
            None
        } else {
            Some((sheet.name.clone(), survey))
        }
    });

    let (mut survey, format, sheet) = match tagged {
        Some((name, survey)) => {
            info!("extract_survey: using tagged sheet {:?}", name);
            (survey, SourceFormat::Tagged, Some(name))
        }
        None => {
            info!("extract_survey: no usable tagged sheet, falling back to heuristics");
            let mut survey = Survey::untitled(&workbook.title, &workbook.source_name);
            survey.sections = workbook
                .sheets
                .iter()
                .filter_map(|s| heuristic::classify_sheet(s, settings))
                .collect();
            survey.metadata.total_rows = workbook.sheets.iter().map(|s| s.rows.len()).sum();
            (survey, SourceFormat::Untagged, None)
        }
    };

    enrich::enrich_survey(&mut survey, settings);
    let issues = validate::validate_survey(&survey);
    let table_references = table_refs::collect_table_refs(&survey);
    info!(
        "extract_survey: {} sections, {} questions, {} issues, {} table references",
        survey.sections.len(),
        survey.question_count(),
        issues.len(),
        table_references.len()
    );
    Extraction {
        survey,
        format,
        sheet,
        issues,
        table_references,
    }
}
