use std::fmt::Display;

use crate::tree::Survey;

/// How much an issue should worry the caller.
#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord)]
pub enum Severity {
    /// The tree is probably usable but thin.
    Soft,
    /// The tree cannot be used as a survey.
    Hard,
}

/// A completeness problem of an extracted survey.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ValidationIssue {
    MissingTitle,
    NoSections,
    /// 0-based position of the section.
    UntitledSection(usize),
    NoQuestions,
    FewQuestions(usize),
    MostlyEmptySections { empty: usize, total: usize },
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self {
            ValidationIssue::MissingTitle
            | ValidationIssue::NoSections
            | ValidationIssue::NoQuestions => Severity::Hard,
            ValidationIssue::UntitledSection(_)
            | ValidationIssue::FewQuestions(_)
            | ValidationIssue::MostlyEmptySections { .. } => Severity::Soft,
        }
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::MissingTitle => write!(f, "Survey title is missing"),
            ValidationIssue::NoSections => write!(f, "No sections found in the survey"),
            ValidationIssue::UntitledSection(idx) => {
                write!(f, "Section {} is missing a title", idx + 1)
            }
            ValidationIssue::NoQuestions => write!(f, "No questions found in the entire survey"),
            ValidationIssue::FewQuestions(n) => write!(
                f,
                "Survey appears to have very few questions ({} total)",
                n
            ),
            ValidationIssue::MostlyEmptySections { empty, total } => write!(
                f,
                "Many sections appear to be empty ({} out of {}). This might indicate a parsing issue.",
                empty, total
            ),
        }
    }
}

/// Checks the completeness of a survey.
///
/// The checks are independent. Empty sections are only reported in aggregate,
/// as context and header sections legitimately hold no question.
pub fn validate_survey(survey: &Survey) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if survey.title.trim().is_empty() {
        issues.push(ValidationIssue::MissingTitle);
    }
    if survey.sections.is_empty() {
        issues.push(ValidationIssue::NoSections);
    }
    for (idx, section) in survey.sections.iter().enumerate() {
        if section.title.trim().is_empty() {
            issues.push(ValidationIssue::UntitledSection(idx));
        }
    }

    let total_questions = survey.question_count();
    let with_questions = survey
        .sections
        .iter()
        .filter(|s| s.question_count() > 0)
        .count();
    let empty = survey.sections.len() - with_questions;
    if total_questions == 0 {
        issues.push(ValidationIssue::NoQuestions);
    } else if total_questions < 5 && with_questions < 2 {
        issues.push(ValidationIssue::FewQuestions(total_questions));
    }
    if total_questions > 0 && 2 * empty > survey.sections.len() {
        issues.push(ValidationIssue::MostlyEmptySections {
            empty,
            total: survey.sections.len(),
        });
    }
    issues
}
