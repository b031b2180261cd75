use log::debug;

use crate::config::{ExtractionSettings, Sheet};
use crate::rules::{infer_question_type, is_required, looks_like_question};
use crate::tree::{Metadata, Question, Section};

/// `pieces_jointes` -> `Pieces Jointes`.
pub fn title_case(name: &str) -> String {
    let mut res = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                res.extend(c.to_lowercase());
            } else {
                res.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            res.push(c);
            prev_alpha = false;
        }
    }
    res
}

/// Collects the question-like cells of an untagged sheet into one section.
///
/// Every cell is considered on its own, row by row. Returns None when the
/// sheet has no question-like text.
pub fn classify_sheet(sheet: &Sheet, settings: &ExtractionSettings) -> Option<Section> {
    let mut section = Section::new(&title_case(&sheet.name), Metadata::default());
    for (idx, row) in sheet.rows.iter().enumerate() {
        for text in row.iter().filter_map(|c| c.as_text()) {
            if text.chars().count() <= settings.min_question_chars || !looks_like_question(&text) {
                continue;
            }
            let metadata = Metadata {
                source_row: Some(idx),
                ..Metadata::default()
            };
            section.questions.push(Question {
                question_type: infer_question_type(&text),
                is_required: is_required(&text),
                text,
                metadata,
                options: Vec::new(),
            });
        }
    }
    debug!(
        "classify_sheet: sheet {:?}: {} questions",
        sheet.name,
        section.questions.len()
    );
    if section.questions.is_empty() {
        None
    } else {
        Some(section)
    }
}
