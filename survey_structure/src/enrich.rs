//! Derivation of the metadata records.
//!
//! Every derived field is recomputed from the node text, the titles of its
//! ancestors and the authored notes. Nothing derived is ever read back, so
//! enriching a tree a second time leaves it unchanged.

use log::debug;

use crate::config::ExtractionSettings;
use crate::rules::*;
use crate::tree::*;

const TRUNCATION_MARKERS: [&str; 2] = ["...", "…"];
const SENTENCE_BREAKS: [char; 3] = ['.', '?', '!'];

/// Cleans and shortens the text of one node for use in a path.
///
/// Truncation markers are removed. A text longer than the limit is cut after
/// the last sentence break of the allowed prefix, or at its last space, as
/// long as the break falls beyond `min_break_chars`. Otherwise it is cut hard.
pub fn path_segment(text: &str, settings: &ExtractionSettings) -> String {
    let mut cleaned = text.to_string();
    while let Some(marker) = TRUNCATION_MARKERS.iter().find(|m| cleaned.contains(*m)) {
        cleaned = cleaned.replace(marker, "");
    }
    let cleaned = cleaned.trim();
    if cleaned.chars().count() <= settings.max_segment_chars {
        return cleaned.to_string();
    }

    let prefix: Vec<char> = cleaned.chars().take(settings.max_segment_chars).collect();
    let last_break = prefix.iter().rposition(|c| SENTENCE_BREAKS.contains(c));
    let last_space = prefix.iter().rposition(|c| *c == ' ');
    let cut = match (last_break, last_space) {
        (Some(b), _) if b > settings.min_break_chars => b + 1,
        (_, Some(s)) if s > settings.min_break_chars => s,
        _ => prefix.len(),
    };
    prefix[..cut].iter().collect::<String>().trim_end().to_string()
}

fn child_path(parent: &str, text: &str, settings: &ExtractionSettings) -> String {
    format!("{}/{}", parent, path_segment(text, settings))
}

/// Fills the derived fields of one record.
fn derive(metadata: &mut Metadata, text: &str, path: String) {
    let notes = &metadata.notes;
    let context_description = match metadata.origin {
        Some(NodeOrigin::Context) => Some(CONTEXT_DESCRIPTION),
        None => None,
    };
    let description = notes
        .description
        .clone()
        .or_else(|| context_description.map(String::from))
        .or_else(|| first_match(DESCRIPTION_RULES, text).map(String::from))
        .unwrap_or_default();
    let annotation = notes
        .annotation
        .clone()
        .or_else(|| first_match(ANNOTATION_RULES, text).map(String::from))
        .unwrap_or_default();
    let caution = notes
        .caution
        .clone()
        .or_else(|| first_match(CAUTION_RULES, text).map(String::from))
        .unwrap_or_default();
    let conditions = notes
        .conditions
        .clone()
        .or_else(|| first_match(CONDITION_RULES, text).map(String::from))
        .unwrap_or_else(|| DEFAULT_CONDITIONS.to_string());

    metadata.entry_full_path = path;
    metadata.entry_description = description;
    metadata.entry_annotation = annotation;
    metadata.caution = caution;
    metadata.existing_conditions = conditions;
    metadata.jump_to_entry = String::new();
    metadata.coordinates = if is_geographic(text) {
        Coordinates::Capture(CoordinateSchema::ISO_6709)
    } else {
        Coordinates::NotApplicable
    };
}

fn enrich_question(question: &mut Question, parent_path: &str, settings: &ExtractionSettings) {
    let path = child_path(parent_path, &question.text, settings);
    for option in question.options.iter_mut() {
        let option_path = child_path(&path, &option.text, settings);
        derive(&mut option.metadata, &option.text, option_path);
    }
    question.metadata.table_reference = table_reference(&question.text);
    derive(&mut question.metadata, &question.text, path);
}

/// Computes the metadata of every node of the tree.
pub fn enrich_survey(survey: &mut Survey, settings: &ExtractionSettings) {
    let mut count = 0;
    for section in survey.sections.iter_mut() {
        let section_path = child_path("", &section.title, settings);
        for question in section.questions.iter_mut() {
            enrich_question(question, &section_path, settings);
            count += 1 + question.options.len();
        }
        for sub in section.subsections.iter_mut() {
            let sub_path = child_path(&section_path, &sub.title, settings);
            for question in sub.questions.iter_mut() {
                enrich_question(question, &sub_path, settings);
                count += 1 + question.options.len();
            }
            derive(&mut sub.metadata, &sub.title, sub_path);
            count += 1;
        }
        derive(&mut section.metadata, &section.title, section_path);
        count += 1;
    }
    debug!("enrich_survey: {} metadata records", count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SheetBuilder;
    use crate::tagged::build_survey;

    fn settings() -> ExtractionSettings {
        ExtractionSettings::DEFAULT_SETTINGS
    }

    fn sample_survey() -> Survey {
        let sheet = SheetBuilder::new("s")
            .entry("Context", "Exercice 2023", None, Some(1))
            .entry("Section", "Informations", None, Some(2))
            .entry("Question", "Adresse du bureau", Some(2), Some(3))
            .entry("Response", "Oui", Some(3), Some(4))
            .entry("Response", "Non", Some(3), Some(5))
            .entry("Subsection", "Liste des partenaires... techniques et financiers de la structure en 2023", Some(2), Some(6))
            .entry("Question", "Si oui, région d'intervention (TableRef:08)", Some(6), Some(7))
            .entry("Question", "Montant du budget annuel en FCFA *", Some(6), Some(8))
            .build();
        build_survey(&sheet, "t", "t.xlsx")
    }

    fn all_metadata(survey: &Survey) -> Vec<Metadata> {
        let mut res = Vec::new();
        survey.for_each_metadata(|m| res.push(m.clone()));
        res
    }

    #[test]
    fn segments_break_at_sentences_then_spaces() {
        let s = settings();
        assert_eq!(
            path_segment(
                "Nombre total d'agents permanents de la structure. Précisez par sexe et par catégorie",
                &s
            ),
            "Nombre total d'agents permanents de la structure."
        );
        assert_eq!(
            path_segment(
                "Quelle est la principale source de financement de vos activités au cours de l'année",
                &s
            ),
            "Quelle est la principale source de financement de vos"
        );
        assert_eq!(path_segment(&"A".repeat(75), &s), "A".repeat(60));
        assert_eq!(path_segment("Court… texte...", &s), "Court texte");
    }

    #[test]
    fn end_to_end_example() {
        let mut survey = sample_survey();
        enrich_survey(&mut survey, &settings());
        let section = &survey.sections[1];
        assert_eq!(section.title, "Informations");
        let q = &section.questions[0];
        assert_eq!(q.text, "Adresse du bureau");
        assert_eq!(q.question_type, QuestionType::SingleChoice);
        let options: Vec<&str> = q.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(options, vec!["Oui", "Non"]);
        assert_eq!(
            q.metadata.coordinates,
            Coordinates::Capture(CoordinateSchema::ISO_6709)
        );
        assert_eq!(q.metadata.entry_full_path, "/Informations/Adresse du bureau");
        assert_eq!(
            q.metadata.entry_description,
            "Adresse géographique avec coordonnées requises"
        );
        assert_eq!(
            q.options[1].metadata.entry_full_path,
            "/Informations/Adresse du bureau/Non"
        );
        assert_eq!(q.options[1].metadata.coordinates, Coordinates::NotApplicable);
    }

    #[test]
    fn enrichment_is_idempotent() {
        let mut once = sample_survey();
        enrich_survey(&mut once, &settings());
        let mut twice = once.clone();
        enrich_survey(&mut twice, &settings());
        assert_eq!(once, twice);
    }

    #[test]
    fn conditions_are_never_empty() {
        let mut survey = sample_survey();
        enrich_survey(&mut survey, &settings());
        let records = all_metadata(&survey);
        assert_eq!(records.len(), 8);
        for m in records.iter() {
            assert!(!m.existing_conditions.is_empty(), "{:?}", m.entry_full_path);
            assert!(m.jump_to_entry.is_empty());
        }
    }

    #[test]
    fn paths_are_well_formed() {
        let mut survey = sample_survey();
        enrich_survey(&mut survey, &settings());
        for m in all_metadata(&survey).iter() {
            let path = &m.entry_full_path;
            assert!(path.starts_with('/'), "{:?}", path);
            assert!(!path.contains("..."), "{:?}", path);
            for segment in path[1..].split('/') {
                assert!(segment.chars().count() <= 60, "{:?}", segment);
            }
        }
        let sub = &survey.sections[1].subsections[0];
        assert_eq!(
            sub.metadata.entry_full_path,
            "/Informations/Liste des partenaires techniques et financiers de la"
        );
    }

    #[test]
    fn rule_derived_fields() {
        let mut survey = sample_survey();
        enrich_survey(&mut survey, &settings());
        let context = &survey.sections[0];
        assert_eq!(context.metadata.entry_description, CONTEXT_DESCRIPTION);
        assert_eq!(context.metadata.existing_conditions, DEFAULT_CONDITIONS);

        let sub = &survey.sections[1].subsections[0];
        let region = &sub.questions[0];
        assert_eq!(region.metadata.table_reference, Some(TableRef(8)));
        assert_eq!(region.question_type, QuestionType::TableReference);
        assert_eq!(
            region.metadata.entry_annotation,
            "Référence à une table de données externe"
        );
        assert_eq!(region.metadata.existing_conditions, DEFAULT_CONDITIONS);

        let budget = &sub.questions[1];
        assert!(budget.is_required);
        assert_eq!(budget.metadata.entry_description, "Information financière");
        assert_eq!(budget.metadata.entry_annotation, "Champ obligatoire à remplir");
        assert_eq!(budget.metadata.table_reference, None);
    }

    #[test]
    fn table_reference_conditions() {
        let sheet = SheetBuilder::new("s")
            .entry("Section", "Localisation", None, Some(1))
            .entry("Question", "Région de résidence (TableRef:08)", Some(1), Some(2))
            .entry("Question", "Cercle (TableRef:12)", Some(1), Some(3))
            .build();
        let mut survey = build_survey(&sheet, "t", "t.xlsx");
        enrich_survey(&mut survey, &settings());
        let questions = &survey.sections[0].questions;
        assert_eq!(questions[0].metadata.existing_conditions, DEFAULT_CONDITIONS);
        assert_eq!(
            questions[1].metadata.existing_conditions,
            "Nécessite l'accès à une table de référence externe"
        );
    }

    #[test]
    fn authored_notes_win() {
        let sheet = SheetBuilder::new("s")
            .row(&["entryLabel", "entryName", "entryParentIndex", "entryIndex", "Caution", "Condition"])
            .row(&["A", "Section", "", "1", "", ""])
            .row(&["Ville", "Question", "1", "2", "Donnée publique", "Si établissement urbain"])
            .build();
        let mut survey = build_survey(&sheet, "t", "t.csv");
        enrich_survey(&mut survey, &settings());
        let q = &survey.sections[0].questions[0];
        assert_eq!(q.metadata.caution, "Donnée publique");
        assert_eq!(q.metadata.existing_conditions, "Si établissement urbain");
        assert_eq!(q.metadata.entry_description, "Ville ou entité géographique");
    }
}
