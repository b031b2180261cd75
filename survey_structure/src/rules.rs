//! Lexical rule tables.
//!
//! Every heuristic of the extractor is an ordered list of `(pattern, result)`
//! rules evaluated by [`first_match`]: the first rule whose pattern matches the
//! text wins. The vocabulary is French, as are the sources.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{QuestionType, TableRef};

/// How a rule recognizes a piece of text.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Pattern {
    /// Any of the keywords appears in the lower-cased text.
    Contains(&'static [&'static str]),
    /// Any of the keywords appears as a whole word in the lower-cased text.
    Word(&'static [&'static str]),
    /// The text embeds a reference to an external table.
    TableReference,
}

impl Pattern {
    /// `lower` must be the lower-cased version of `text`.
    fn matches(&self, text: &str, lower: &str) -> bool {
        match self {
            Pattern::Contains(keywords) => keywords.iter().any(|k| lower.contains(k)),
            Pattern::Word(keywords) => words(lower).any(|w| keywords.contains(&w)),
            Pattern::TableReference => table_reference(text).is_some(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Rule<T> {
    pub pattern: Pattern,
    pub result: T,
}

const fn rule<T>(pattern: Pattern, result: T) -> Rule<T> {
    Rule { pattern, result }
}

/// Evaluates the rules in order and returns the result of the first match.
pub fn first_match<T: Copy>(rules: &[Rule<T>], text: &str) -> Option<T> {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|r| r.pattern.matches(text, &lower))
        .map(|r| r.result)
}

fn words(lower: &str) -> impl Iterator<Item = &str> {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

// ******** Vocabulary *********

pub const GEOGRAPHIC_KEYWORDS: &[&str] = &[
    "adresse",
    "address",
    "ville",
    "city",
    "région",
    "region",
    "commune",
    "cercle",
    "département",
    "localisation",
    "location",
    "géographique",
    "geographic",
    "coordonnées",
    "coordinates",
];

const QUESTION_MARKERS: &[&str] = &[
    "?",
    "quel",
    "quelle",
    "quels",
    "quelles",
    "comment",
    "où",
    "quand",
    "combien",
    "pourquoi",
    "êtes-vous",
    "avez-vous",
    "faites-vous",
    "disposez-vous",
    "utilisez-vous",
];

const REQUIRED_MARKERS: &[&str] = &["obligatoire", "requis", "nécessaire", "*"];

// ******** Rule tables *********

/// Question type inference, in precedence order.
pub static QUESTION_TYPE_RULES: &[Rule<QuestionType>] = &[
    rule(Pattern::TableReference, QuestionType::TableReference),
    rule(
        Pattern::Contains(&["oui ou non", "oui/non", "vrai/faux", "disposez-vous"]),
        QuestionType::Boolean,
    ),
    rule(
        Pattern::Contains(&["sélectionner", "choisir", "cocher", "options"]),
        QuestionType::SingleChoice,
    ),
    rule(
        Pattern::Contains(&[
            "nombre",
            "montant",
            "quantité",
            "combien",
            "âge",
            "pourcentage",
        ]),
        QuestionType::Number,
    ),
    rule(
        Pattern::Contains(&["date", "quand", "année", "mois"]),
        QuestionType::Date,
    ),
    rule(Pattern::Contains(&["email", "@"]), QuestionType::Email),
    rule(
        Pattern::Contains(&["téléphone", "phone", "tél"]),
        QuestionType::Phone,
    ),
];

pub static DESCRIPTION_RULES: &[Rule<&str>] = &[
    rule(
        Pattern::Contains(&["adresse"]),
        "Adresse géographique avec coordonnées requises",
    ),
    rule(
        Pattern::Contains(&["ville", "city"]),
        "Ville ou entité géographique",
    ),
    rule(
        Pattern::Contains(&["téléphone", "phone", "contact"]),
        "Information de contact",
    ),
    rule(
        Pattern::Contains(&["email"]),
        "Adresse électronique de contact",
    ),
    rule(
        Pattern::Word(&["nom", "prénom", "prenom", "identifiant", "matricule", "nif"]),
        "Information d'identification",
    ),
    rule(
        Pattern::Contains(&["montant", "budget", "financement", "coût", "dépense", "fcfa"]),
        "Information financière",
    ),
];

pub static ANNOTATION_RULES: &[Rule<&str>] = &[
    rule(
        Pattern::TableReference,
        "Référence à une table de données externe",
    ),
    rule(
        Pattern::Contains(&["obligatoire", "*"]),
        "Champ obligatoire à remplir",
    ),
];

pub static CAUTION_RULES: &[Rule<&str>] = &[rule(
    Pattern::Contains(&["confidentiel", "personnel", "privé", "sensible"]),
    "Information sensible - manipuler avec précaution",
)];

pub static CONDITION_RULES: &[Rule<&str>] = &[
    // "si" also matches inside words (résidence, saisie).
    rule(
        Pattern::Contains(&["dépend", "si"]),
        crate::tree::DEFAULT_CONDITIONS,
    ),
    rule(
        Pattern::TableReference,
        "Nécessite l'accès à une table de référence externe",
    ),
];

// ******** Single-purpose checks *********

/// Infers the type of a question from its text. Defaults to free text.
pub fn infer_question_type(text: &str) -> QuestionType {
    first_match(QUESTION_TYPE_RULES, text).unwrap_or(QuestionType::Text)
}

pub fn is_required(text: &str) -> bool {
    Pattern::Contains(REQUIRED_MARKERS).matches(text, &text.to_lowercase())
}

pub fn is_geographic(text: &str) -> bool {
    Pattern::Contains(GEOGRAPHIC_KEYWORDS).matches(text, &text.to_lowercase())
}

/// Whether free text reads like a question (untagged sheets).
pub fn looks_like_question(text: &str) -> bool {
    Pattern::Contains(QUESTION_MARKERS).matches(text, &text.to_lowercase())
}

// The variants found in the sources, tried in order.
static TABLE_REF_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)@?TableRef\s*:\s*(\d+)",
        r"(?i)TableRef\s*(\d+)",
        r"(?i)liste\s+déroulante.*?(\d+)",
        r"(?i)table\s+de\s+référence.*?(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid table reference regex"))
    .collect()
});

/// Finds the first external table reference embedded in a text.
pub fn table_reference(text: &str) -> Option<TableRef> {
    TABLE_REF_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map(TableRef)
    })
}
