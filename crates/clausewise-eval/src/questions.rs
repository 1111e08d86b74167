//! Evaluation question sets.
//!
//! A question set is a JSON array of `{id, question, expected_keywords}`
//! records. It is validated against `schema/eval_set.schema.json` before
//! deserialization. Order is preserved and is the order questions are asked.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Embedded question-set schema (loaded at compile time).
const EVAL_SET_SCHEMA_JSON: &str = include_str!("../schema/eval_set.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from loading a question set.
#[derive(Error, Debug)]
pub enum QuestionSetError {
    #[error("Failed to read question set: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse question set JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load schema: {0}")]
    SchemaLoad(String),

    #[error("Question set does not match schema: {}", .0.join("; "))]
    Schema(Vec<String>),

    #[error("Duplicate question id: {0}")]
    DuplicateId(String),

    #[error("Question set is empty")]
    Empty,
}

/// One evaluation question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalQuestion {
    /// Question identity; numeric ids are normalized to strings
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    pub question: String,

    /// Keywords a correct answer should contain, in order
    #[serde(default)]
    pub expected_keywords: Vec<String>,
}

impl EvalQuestion {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        expected_keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            expected_keywords: expected_keywords.into_iter().map(Into::into).collect(),
        }
    }
}

fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

/// An ordered, validated list of questions. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSet {
    questions: Vec<EvalQuestion>,
}

impl QuestionSet {
    /// Build a set from questions, enforcing non-empty and unique ids.
    pub fn new(questions: Vec<EvalQuestion>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id.as_str()) {
                return Err(QuestionSetError::DuplicateId(question.id.clone()));
            }
        }
        Ok(Self { questions })
    }

    /// Parse and validate a question set from JSON.
    pub fn from_json(json: &str) -> Result<Self, QuestionSetError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        validate_schema(&value)?;
        let questions: Vec<EvalQuestion> = serde_json::from_value(value)?;
        Self::new(questions)
    }

    /// Load a question set from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, QuestionSetError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let set = Self::from_json(&content)?;
        tracing::info!(path = %path.display(), questions = set.len(), "Question set loaded");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed set; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvalQuestion> {
        self.questions.iter()
    }

    pub fn questions(&self) -> &[EvalQuestion] {
        &self.questions
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a EvalQuestion;
    type IntoIter = std::slice::Iter<'a, EvalQuestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn get_validator() -> Result<&'static jsonschema::Validator, QuestionSetError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema: serde_json::Value = serde_json::from_str(EVAL_SET_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;
        jsonschema::options()
            .build(&schema)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result
        .as_ref()
        .map_err(|e| QuestionSetError::SchemaLoad(e.clone()))
}

/// Validate a raw question-set value against the embedded schema.
pub fn validate_schema(value: &serde_json::Value) -> Result<(), QuestionSetError> {
    let validator = get_validator()?;
    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(QuestionSetError::Schema(errors))
    }
}
