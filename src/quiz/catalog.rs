//! The word catalog: an immutable word -> question-configuration mapping,
//! loaded once from a JSON document at startup and never mutated.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use serde_json::Value;

/// A multiple-choice answer set. `correct` must be one of `choices`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AnswerSet {
    pub choices: Vec<String>,
    pub correct: String,
}

/// An analogy: `first` is to `second` (by `relation`) as the focus word is
/// to `correct`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AnalogySet {
    pub first: String,
    pub second: String,
    pub relation: String,
    pub choices: Vec<String>,
    pub correct: String,
}

/// Per-word question configuration. Any subset of the question types may be
/// present; generation skips a word for a type it has no configuration for.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct WordEntry {
    #[serde(default)]
    pub synonyms: Option<AnswerSet>,
    #[serde(default)]
    pub antonyms: Option<AnswerSet>,
    #[serde(default)]
    pub odd_one_out: Option<AnswerSet>,
    #[serde(default)]
    pub analogies: Option<AnalogySet>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse the word catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("the word catalog must be a JSON object keyed by word")]
    NotAnObject,
    #[error("word \"{word}\": {problem}")]
    BadEntry { word: String, problem: String },
}

pub struct WordCatalog {
    words: Vec<String>,
    entries: HashMap<String, WordEntry>,
}

impl WordCatalog {
    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    pub fn from_value(document: Value) -> Result<Self, CatalogError> {
        let Value::Object(map) = document else {
            return Err(CatalogError::NotAnObject);
        };

        let mut words = Vec::with_capacity(map.len());
        let mut entries = HashMap::with_capacity(map.len());
        for (word, value) in map {
            let entry: WordEntry = serde_json::from_value(value)?;
            validate_entry(&word, &entry)?;
            words.push(word.clone());
            entries.insert(word, entry);
        }
        Ok(Self { words, entries })
    }

    /// Word keys in document order, stable for the process lifetime.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn lookup(&self, word: &str) -> Option<&WordEntry> {
        self.entries.get(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn validate_entry(word: &str, entry: &WordEntry) -> Result<(), CatalogError> {
    if let Some(set) = &entry.synonyms {
        validate_answers(word, "synonyms", &set.choices, &set.correct)?;
    }
    if let Some(set) = &entry.antonyms {
        validate_answers(word, "antonyms", &set.choices, &set.correct)?;
    }
    if let Some(set) = &entry.odd_one_out {
        validate_answers(word, "odd_one_out", &set.choices, &set.correct)?;
    }
    if let Some(set) = &entry.analogies {
        validate_answers(word, "analogies", &set.choices, &set.correct)?;
    }
    Ok(())
}

fn validate_answers(
    word: &str,
    kind: &str,
    choices: &[String],
    correct: &str,
) -> Result<(), CatalogError> {
    if choices.len() < 2 {
        return Err(CatalogError::BadEntry {
            word: word.to_string(),
            problem: format!("{} needs at least two choices", kind),
        });
    }
    let distinct: HashSet<&str> = choices.iter().map(String::as_str).collect();
    if distinct.len() != choices.len() {
        return Err(CatalogError::BadEntry {
            word: word.to_string(),
            problem: format!("{} choices contain duplicates", kind),
        });
    }
    if !choices.iter().any(|choice| choice == correct) {
        return Err(CatalogError::BadEntry {
            word: word.to_string(),
            problem: format!(
                "{} correct answer \"{}\" is not among the choices",
                kind, correct
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_entries_in_document_order() {
        let catalog = WordCatalog::from_value(json!({
            "banana": { "synonyms": { "choices": ["plantain", "apple"], "correct": "plantain" } },
            "apple": { "odd_one_out": { "choices": ["pear", "brick"], "correct": "brick" } },
            "mango": {}
        }))
        .unwrap();

        assert_eq!(catalog.words(), ["banana", "apple", "mango"]);
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn lookup_of_unknown_word_is_none() {
        let catalog = WordCatalog::from_value(json!({
            "apple": {}
        }))
        .unwrap();

        assert!(catalog.lookup("apple").is_some());
        assert!(catalog.lookup("pear").is_none());
    }

    #[test]
    fn partial_entries_leave_missing_types_unset() {
        let catalog = WordCatalog::from_value(json!({
            "light": {
                "analogies": {
                    "first": "Hot", "second": "cold", "relation": "opposite",
                    "choices": ["dark", "bright"], "correct": "dark"
                }
            }
        }))
        .unwrap();

        let entry = catalog.lookup("light").unwrap();
        assert!(entry.synonyms.is_none());
        assert!(entry.antonyms.is_none());
        assert!(entry.odd_one_out.is_none());
        assert_eq!(entry.analogies.as_ref().unwrap().relation, "opposite");
    }

    #[test]
    fn rejects_correct_answer_missing_from_choices() {
        let result = WordCatalog::from_value(json!({
            "happy": { "synonyms": { "choices": ["sad", "angry"], "correct": "joyful" } }
        }));

        assert!(matches!(result, Err(CatalogError::BadEntry { .. })));
    }

    #[test]
    fn rejects_fewer_than_two_choices() {
        let result = WordCatalog::from_value(json!({
            "happy": { "antonyms": { "choices": ["sad"], "correct": "sad" } }
        }));

        assert!(matches!(result, Err(CatalogError::BadEntry { .. })));
    }

    #[test]
    fn rejects_duplicate_choices() {
        let result = WordCatalog::from_value(json!({
            "happy": { "odd_one_out": { "choices": ["sad", "sad", "angry"], "correct": "angry" } }
        }));

        assert!(matches!(result, Err(CatalogError::BadEntry { .. })));
    }

    #[test]
    fn rejects_non_object_documents() {
        let result = WordCatalog::from_value(json!(["happy", "sad"]));
        assert!(matches!(result, Err(CatalogError::NotAnObject)));
    }

    #[test]
    fn reads_a_document_from_bytes() {
        let doc = br#"{ "happy": { "synonyms": { "choices": ["joyful", "sad"], "correct": "joyful" } } }"#;
        let catalog = WordCatalog::from_reader(doc.as_slice()).unwrap();
        assert_eq!(catalog.words(), ["happy"]);
    }
}
