// ******** Output data structures *********

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// The placeholder used for `existingConditions` when nothing more specific applies.
pub const DEFAULT_CONDITIONS: &str = "Réponse conditionnelle basée sur une question précédente";

/// The description attached to sections synthesized from context rows.
pub const CONTEXT_DESCRIPTION: &str = "Section contextuelle contenant des informations de base";

/// The kind of input a question expects.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    Number,
    Date,
    Email,
    Phone,
    Boolean,
    SingleChoice,
    MultipleChoice,
    TableReference,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Number => "number",
            QuestionType::Date => "date",
            QuestionType::Email => "email",
            QuestionType::Phone => "phone",
            QuestionType::Boolean => "boolean",
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TableReference => "table_reference",
        }
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference to an external lookup table, such as the list of regions.
///
/// References compare and sort by their number, and render as `TableRef:NN`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct TableRef(pub u32);

impl Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TableRef:{:02}", self.0)
    }
}

impl Serialize for TableRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The capture schema for coordinates, following ISO 6709.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct CoordinateSchema {
    pub required: bool,
    pub format: &'static str,
    pub precision: &'static str,
    pub datum: &'static str,
    pub example: &'static str,
    pub validation_pattern: &'static str,
    pub description: &'static str,
}

impl CoordinateSchema {
    pub const ISO_6709: CoordinateSchema = CoordinateSchema {
        required: true,
        format: "ISO 6709:2022",
        precision: "decimal_degrees",
        datum: "WGS84",
        example: "+12.6392-008.0029/",
        validation_pattern: r"^[+-][0-9]{2,3}\.[0-9]{4}[+-][0-9]{3}\.[0-9]{4}/$",
        description:
            "Coordonnées géographiques au format ISO 6709:2022 pour localisation précise",
    };
}

/// Coordinates attached to a node. Serialized as `{}` when not applicable.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub enum Coordinates {
    #[default]
    NotApplicable,
    Capture(CoordinateSchema),
}

impl Serialize for Coordinates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Coordinates::NotApplicable => serializer.serialize_map(Some(0))?.end(),
            Coordinates::Capture(schema) => schema.serialize(serializer),
        }
    }
}

/// Marks the nodes that were synthesized rather than read.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOrigin {
    Context,
}

/// Free-form notes found in dedicated columns of the source row.
///
/// When present, they win over the values derived from the node text.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AuthoredNotes {
    pub description: Option<String>,
    pub annotation: Option<String>,
    pub caution: Option<String>,
    pub conditions: Option<String>,
}

impl AuthoredNotes {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.annotation.is_none()
            && self.caution.is_none()
            && self.conditions.is_none()
    }
}

/// The metadata record shared by sections, subsections, questions and options.
///
/// The positional fields are filled by the builders; all the other fields are
/// derived by the enricher.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct Metadata {
    pub entry_index: Option<i64>,
    pub parent_index: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub origin: Option<NodeOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_reference: Option<TableRef>,
    #[serde(rename = "entryFullPath")]
    pub entry_full_path: String,
    #[serde(rename = "entryDescription")]
    pub entry_description: String,
    #[serde(rename = "entryAnnotation")]
    pub entry_annotation: String,
    pub caution: String,
    #[serde(rename = "existingConditions")]
    pub existing_conditions: String,
    #[serde(rename = "JumpToEntry")]
    pub jump_to_entry: String,
    pub coordinates: Coordinates,
    #[serde(skip)]
    pub notes: AuthoredNotes,
}

impl Metadata {
    pub fn positional(entry_index: Option<i64>, parent_index: Option<i64>) -> Metadata {
        Metadata {
            entry_index,
            parent_index,
            ..Metadata::default()
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct AnswerOption {
    pub text: String,
    pub value: String,
    pub metadata: Metadata,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Question {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub is_required: bool,
    pub metadata: Metadata,
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Appends an option. A question with more than one option becomes a
    /// single choice, whatever its inferred type.
    pub fn push_option(&mut self, option: AnswerOption) {
        self.options.push(option);
        if self.options.len() > 1 {
            self.question_type = QuestionType::SingleChoice;
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Subsection {
    pub title: String,
    pub metadata: Metadata,
    pub questions: Vec<Question>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub metadata: Metadata,
    pub subsections: Vec<Subsection>,
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(title: &str, metadata: Metadata) -> Section {
        Section {
            title: title.to_string(),
            metadata,
            subsections: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// Number of questions, including the ones held by subsections.
    pub fn question_count(&self) -> usize {
        self.questions.len()
            + self
                .subsections
                .iter()
                .map(|s| s.questions.len())
                .sum::<usize>()
    }

    /// All the questions, the directly owned ones first.
    pub fn all_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .chain(self.subsections.iter().flat_map(|s| s.questions.iter()))
    }
}

/// Bookkeeping about the source of a survey.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
pub struct SurveyInfo {
    pub source_file: String,
    pub total_rows: usize,
}

/// The root of the reconstructed survey.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Survey {
    pub title: String,
    pub description: String,
    pub sections: Vec<Section>,
    pub metadata: SurveyInfo,
}

impl Survey {
    /// An empty survey carrying the fallback title and description of a source.
    pub fn untitled(display_title: &str, source_name: &str) -> Survey {
        Survey {
            title: display_title.to_string(),
            description: format!("Survey generated from {}", source_name),
            sections: Vec::new(),
            metadata: SurveyInfo {
                source_file: source_name.to_string(),
                total_rows: 0,
            },
        }
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.question_count()).sum()
    }

    pub fn all_questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.all_questions())
    }

    /// Visits every metadata record of the tree, in document order.
    pub fn for_each_metadata<F: FnMut(&Metadata)>(&self, mut f: F) {
        for section in self.sections.iter() {
            f(&section.metadata);
            for q in section.questions.iter() {
                f(&q.metadata);
                q.options.iter().for_each(|o| f(&o.metadata));
            }
            for sub in section.subsections.iter() {
                f(&sub.metadata);
                for q in sub.questions.iter() {
                    f(&q.metadata);
                    q.options.iter().for_each(|o| f(&o.metadata));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> Question {
        Question {
            text: text.to_string(),
            question_type: QuestionType::Number,
            is_required: false,
            metadata: Metadata::default(),
            options: vec![],
        }
    }

    fn option(text: &str) -> AnswerOption {
        AnswerOption {
            text: text.to_string(),
            value: text.to_string(),
            metadata: Metadata::default(),
        }
    }

    #[test]
    fn second_option_forces_single_choice() {
        let mut q = question("Nombre d'agents");
        q.push_option(option("Moins de 10"));
        assert_eq!(q.question_type, QuestionType::Number);
        q.push_option(option("Plus de 10"));
        assert_eq!(q.question_type, QuestionType::SingleChoice);
    }

    #[test]
    fn table_ref_rendering_and_order() {
        assert_eq!(TableRef(8).to_string(), "TableRef:08");
        assert_eq!(TableRef(123).to_string(), "TableRef:123");
        let mut refs = vec![TableRef(100), TableRef(11), TableRef(2)];
        refs.sort();
        assert_eq!(refs, vec![TableRef(2), TableRef(11), TableRef(100)]);
    }

    #[test]
    fn empty_coordinates_serialize_as_empty_object() {
        let js = serde_json::to_value(Coordinates::NotApplicable).unwrap();
        assert_eq!(js, serde_json::json!({}));
        let js = serde_json::to_value(Coordinates::Capture(CoordinateSchema::ISO_6709)).unwrap();
        assert_eq!(js["format"], "ISO 6709:2022");
        assert_eq!(js["datum"], "WGS84");
    }

    #[test]
    fn coordinate_example_matches_its_pattern() {
        let schema = CoordinateSchema::ISO_6709;
        let pattern = regex::Regex::new(schema.validation_pattern).unwrap();
        assert!(pattern.is_match(schema.example));
        assert!(!pattern.is_match("+12.6392-08.0029/"));
    }

    #[test]
    fn metadata_serialized_keys() {
        let mut m = Metadata::positional(Some(3), None);
        m.origin = Some(NodeOrigin::Context);
        m.notes.description = Some("hidden".to_string());
        let js = serde_json::to_value(&m).unwrap();
        let obj = js.as_object().unwrap();
        assert_eq!(obj["entry_index"], 3);
        assert!(obj["parent_index"].is_null());
        assert_eq!(obj["type"], "context");
        for k in [
            "entryFullPath",
            "entryDescription",
            "entryAnnotation",
            "caution",
            "existingConditions",
            "JumpToEntry",
            "coordinates",
        ] {
            assert!(obj.contains_key(k), "missing key {}", k);
        }
        assert!(!obj.contains_key("notes"));
        assert!(!obj.contains_key("table_reference"));
        assert!(!obj.contains_key("source_row"));
    }

    #[test]
    fn question_type_serialization() {
        let js = serde_json::to_value(QuestionType::SingleChoice).unwrap();
        assert_eq!(js, "single_choice");
        assert_eq!(QuestionType::TableReference.to_string(), "table_reference");
    }

    #[test]
    fn question_count_includes_subsections() {
        let mut s = Section::new("A", Metadata::default());
        s.questions.push(question("q1"));
        s.subsections.push(Subsection {
            title: "B".to_string(),
            metadata: Metadata::default(),
            questions: vec![question("q2"), question("q3")],
        });
        assert_eq!(s.question_count(), 3);
        let texts: Vec<&str> = s.all_questions().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["q1", "q2", "q3"]);
    }
}
