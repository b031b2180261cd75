use log::{debug, warn};

use crate::config::{RowAnomaly, Sheet};
use crate::detect::{resolve_columns, ColumnMap, Entry, EntryKind};
use crate::rules::{infer_question_type, is_required};
use crate::tree::*;

/// Where the builder stands, in terms of open containers.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum BuildState {
    NoSection,
    InSection,
    InSubsection,
    /// A question is open. It lives either in the open subsection or directly
    /// in the open section.
    InQuestion { under_subsection: bool },
}

/// The container a question gets attached to.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Container {
    Section,
    Subsection,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Action {
    SetTitle,
    OpenSection,
    OpenSubsection,
    AttachQuestion(Container),
    AttachOption,
    OpenContextSection,
    Drop,
}

/// The transition table of the builder.
///
/// Rows that have nowhere to attach are dropped and leave the state unchanged.
pub fn transition(state: BuildState, kind: EntryKind) -> (Action, BuildState) {
    use BuildState::*;
    match (kind, state) {
        (EntryKind::Survey, s) => (Action::SetTitle, s),

        (EntryKind::Section, _) => (Action::OpenSection, InSection),

        (EntryKind::Subsection, NoSection) => (Action::Drop, NoSection),
        (EntryKind::Subsection, _) => (Action::OpenSubsection, InSubsection),

        (EntryKind::Question, NoSection) => (Action::Drop, NoSection),
        (EntryKind::Question, InSection) | (EntryKind::Question, InQuestion { under_subsection: false }) => (
            Action::AttachQuestion(Container::Section),
            InQuestion {
                under_subsection: false,
            },
        ),
        (EntryKind::Question, InSubsection) | (EntryKind::Question, InQuestion { under_subsection: true }) => (
            Action::AttachQuestion(Container::Subsection),
            InQuestion {
                under_subsection: true,
            },
        ),

        (EntryKind::Response, s @ InQuestion { .. }) => (Action::AttachOption, s),
        (EntryKind::Response, s) => (Action::Drop, s),

        (EntryKind::Context, NoSection) => (Action::OpenContextSection, InSection),
        (EntryKind::Context, s) => (Action::Drop, s),
    }
}

struct TreeBuilder {
    survey: Survey,
    state: BuildState,
}

impl TreeBuilder {
    fn current_section(&mut self) -> Result<&mut Section, RowAnomaly> {
        self.survey
            .sections
            .last_mut()
            .ok_or(RowAnomaly::DetachedCursor("section"))
    }

    fn current_subsection(&mut self) -> Result<&mut Subsection, RowAnomaly> {
        self.current_section()?
            .subsections
            .last_mut()
            .ok_or(RowAnomaly::DetachedCursor("subsection"))
    }

    fn current_question(&mut self, container: Container) -> Result<&mut Question, RowAnomaly> {
        let questions = match container {
            Container::Section => &mut self.current_section()?.questions,
            Container::Subsection => &mut self.current_subsection()?.questions,
        };
        questions
            .last_mut()
            .ok_or(RowAnomaly::DetachedCursor("question"))
    }

    fn apply(&mut self, entry: Entry) -> Result<(), RowAnomaly> {
        let (action, next) = transition(self.state, entry.kind);
        let mut metadata = Metadata::positional(entry.entry_index, entry.parent_index);
        metadata.notes = entry.notes;
        match action {
            Action::SetTitle => {
                self.survey.description = format!("Survey: {}", entry.label);
                self.survey.title = entry.label;
            }
            Action::OpenSection => {
                self.survey
                    .sections
                    .push(Section::new(&entry.label, metadata));
            }
            Action::OpenSubsection => {
                self.current_section()?.subsections.push(Subsection {
                    title: entry.label,
                    metadata,
                    questions: Vec::new(),
                });
            }
            Action::AttachQuestion(container) => {
                let question = Question {
                    question_type: infer_question_type(&entry.label),
                    is_required: is_required(&entry.label),
                    text: entry.label,
                    metadata,
                    options: Vec::new(),
                };
                match container {
                    Container::Section => self.current_section()?.questions.push(question),
                    Container::Subsection => self.current_subsection()?.questions.push(question),
                }
            }
            Action::AttachOption => {
                let container = match self.state {
                    BuildState::InQuestion {
                        under_subsection: true,
                    } => Container::Subsection,
                    _ => Container::Section,
                };
                self.current_question(container)?.push_option(AnswerOption {
                    value: entry.label.clone(),
                    text: entry.label,
                    metadata,
                });
            }
            Action::OpenContextSection => {
                metadata.origin = Some(NodeOrigin::Context);
                let title = format!("Context: {}", entry.label);
                self.survey.sections.push(Section::new(&title, metadata));
            }
            Action::Drop => {
                debug!(
                    "apply: dropping {:?} {:?} in state {:?}",
                    entry.kind, entry.label, self.state
                );
            }
        }
        self.state = next;
        Ok(())
    }
}

fn short_label(label: &str) -> String {
    label.chars().take(50).collect()
}

/// Builds the survey tree of a tagged sheet.
///
/// Malformed rows are logged and skipped. The returned tree may have no
/// section at all if nothing in the sheet could be recognized.
pub fn build_survey(sheet: &Sheet, display_title: &str, source_name: &str) -> Survey {
    let columns: ColumnMap = resolve_columns(sheet);
    let mut builder = TreeBuilder {
        survey: Survey::untitled(display_title, source_name),
        state: BuildState::NoSection,
    };
    let data_rows = sheet.rows.iter().enumerate().skip(columns.first_data_row);
    builder.survey.metadata.total_rows = sheet.rows.len().saturating_sub(columns.first_data_row);

    for (idx, row) in data_rows {
        let entry = match columns.read_entry(row) {
            Ok(Some(e)) => e,
            Ok(None) => continue,
            Err(e) => {
                warn!("build_survey: skipping row {}: {}", idx, e);
                continue;
            }
        };
        debug!(
            "build_survey: row {}: {:?} - {}",
            idx,
            entry.kind,
            short_label(&entry.label)
        );
        if let Err(e) = builder.apply(entry) {
            warn!("build_survey: skipping row {}: {}", idx, e);
        }
    }
    debug!(
        "build_survey: sheet {:?}: {} sections, {} questions",
        sheet.name,
        builder.survey.sections.len(),
        builder.survey.question_count()
    );
    builder.survey
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SheetBuilder;

    fn build(sheet: &Sheet) -> Survey {
        build_survey(sheet, "MODELISATION", "MODELISATION.xlsx")
    }

    #[test]
    fn rows_keep_their_order() {
        let sheet = SheetBuilder::new("s")
            .entry("Section", "A", None, Some(1))
            .entry("Question", "Q1", Some(1), Some(2))
            .entry("Question", "Q2", Some(1), Some(3))
            .entry("Section", "B", None, Some(4))
            .build();
        let survey = build(&sheet);
        let titles: Vec<&str> = survey.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        let texts: Vec<&str> = survey.sections[0]
            .questions
            .iter()
            .map(|q| q.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Q1", "Q2"]);
        assert!(survey.sections[1].questions.is_empty());
    }

    #[test]
    fn two_responses_make_a_single_choice() {
        let sheet = SheetBuilder::new("s")
            .entry("Section", "A", None, Some(1))
            .entry("Question", "Nombre d'agents", Some(1), Some(2))
            .entry("Response", "Moins de 10", Some(2), Some(3))
            .entry("Response", "Plus de 10", Some(2), Some(4))
            .build();
        let q = &build(&sheet).sections[0].questions[0];
        assert_eq!(q.question_type, QuestionType::SingleChoice);
        assert_eq!(q.options.len(), 2);
        assert_eq!(q.options[1].value, "Plus de 10");
        assert_eq!(q.options[1].metadata.entry_index, Some(4));
    }

    #[test]
    fn orphan_subsection_is_dropped() {
        let sheet = SheetBuilder::new("s")
            .entry("Subsection", "Orpheline", None, Some(1))
            .entry("Question", "Q1", Some(1), Some(2))
            .entry("Section", "A", None, Some(3))
            .entry("Question", "Q2", Some(3), Some(4))
            .build();
        let survey = build(&sheet);
        assert_eq!(survey.sections.len(), 1);
        assert_eq!(survey.sections[0].title, "A");
        assert!(survey.sections[0].subsections.is_empty());
        assert_eq!(survey.question_count(), 1);
    }

    #[test]
    fn questions_go_to_the_open_subsection() {
        let sheet = SheetBuilder::new("s")
            .entry("Section", "A", None, Some(1))
            .entry("Question", "Q0", Some(1), Some(2))
            .entry("Subsection", "A.1", Some(1), Some(3))
            .entry("Question", "Q1", Some(3), Some(4))
            .entry("Response", "Oui", Some(4), Some(5))
            .entry("Section", "B", None, Some(6))
            .entry("Question", "Q2", Some(6), Some(7))
            .build();
        let survey = build(&sheet);
        let a = &survey.sections[0];
        assert_eq!(a.questions.len(), 1);
        assert_eq!(a.subsections[0].questions[0].text, "Q1");
        assert_eq!(a.subsections[0].questions[0].options[0].text, "Oui");
        // A new section closes the subsection.
        assert_eq!(survey.sections[1].questions[0].text, "Q2");
    }

    #[test]
    fn context_before_any_section() {
        let sheet = SheetBuilder::new("s")
            .entry("Context", "Année 2023", None, Some(1))
            .entry("Question", "Q1", Some(1), Some(2))
            .entry("Context", "Ignoré", None, Some(3))
            .build();
        let survey = build(&sheet);
        assert_eq!(survey.sections.len(), 1);
        let s = &survey.sections[0];
        assert_eq!(s.title, "Context: Année 2023");
        assert_eq!(s.metadata.origin, Some(NodeOrigin::Context));
        assert_eq!(s.questions.len(), 1);
    }

    #[test]
    fn last_survey_row_wins() {
        let sheet = SheetBuilder::new("s")
            .entry("Survey", "Bilan 2022", None, None)
            .entry("Survey", "Bilan 2023", None, None)
            .build();
        let survey = build(&sheet);
        assert_eq!(survey.title, "Bilan 2023");
        assert_eq!(survey.description, "Survey: Bilan 2023");
        assert!(survey.sections.is_empty());
    }

    #[test]
    fn untitled_survey_uses_the_fallback() {
        let sheet = SheetBuilder::new("s")
            .tagged_header()
            .entry("Section", "A", None, Some(1))
            .build();
        let survey = build(&sheet);
        assert_eq!(survey.title, "MODELISATION");
        assert_eq!(survey.description, "Survey generated from MODELISATION.xlsx");
        assert_eq!(survey.metadata.total_rows, 1);
    }

    #[test]
    fn unknown_and_blank_rows_are_skipped() {
        let sheet = SheetBuilder::new("s")
            .entry("Section", "A", None, Some(1))
            .entry("Footer", "Total", None, None)
            .row(&["", "", "", "", ""])
            .entry("Question", "", Some(1), None)
            .entry("Question", "Q1", Some(1), Some(2))
            .build();
        let survey = build(&sheet);
        assert_eq!(survey.question_count(), 1);
        assert_eq!(survey.metadata.total_rows, 5);
    }

    #[test]
    fn responses_without_question_are_dropped() {
        let sheet = SheetBuilder::new("s")
            .entry("Response", "Oui", None, Some(1))
            .entry("Section", "A", None, Some(2))
            .entry("Response", "Non", Some(2), Some(3))
            .build();
        let survey = build(&sheet);
        assert_eq!(survey.sections.len(), 1);
        assert_eq!(survey.question_count(), 0);
    }

    #[test]
    fn header_sheet_with_notes() {
        let sheet = SheetBuilder::new("s")
            .row(&[
                "entryId",
                "entryLabel",
                "entryName",
                "entryParentIndex",
                "entryIndex",
                "Description",
            ])
            .row(&["1", "A", "Section", "-1", "1", ""])
            .row(&["2", "Q1", "Question", "1", "2", "Nom complet du gérant"])
            .build();
        let survey = build(&sheet);
        let section = &survey.sections[0];
        assert_eq!(section.metadata.parent_index, None);
        let q = &section.questions[0];
        assert_eq!(q.metadata.parent_index, Some(1));
        assert_eq!(
            q.metadata.notes.description.as_deref(),
            Some("Nom complet du gérant")
        );
    }

    #[test]
    fn transition_table() {
        use BuildState::*;
        assert_eq!(
            transition(NoSection, EntryKind::Subsection),
            (Action::Drop, NoSection)
        );
        assert_eq!(
            transition(InQuestion { under_subsection: true }, EntryKind::Subsection),
            (Action::OpenSubsection, InSubsection)
        );
        assert_eq!(
            transition(InSubsection, EntryKind::Section),
            (Action::OpenSection, InSection)
        );
        assert_eq!(
            transition(InSection, EntryKind::Context),
            (Action::Drop, InSection)
        );
    }
}
