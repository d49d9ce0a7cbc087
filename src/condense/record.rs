//! Caller-shaped chunk records.
//!
//! Records come from different retrievers and carry their text under different keys. The key
//! is resolved once per record into a [`TextField`] and the same variant is used to write the
//! condensed text back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Set to `true` on a record whose text went through the condenser.
pub const CONDENSED_KEY: &str = "condensed";
/// Character count of the text before condensation.
pub const ORIGINAL_LENGTH_KEY: &str = "original_length";
/// Character count of the text after condensation.
pub const CONDENSED_LENGTH_KEY: &str = "condensed_length";
/// Identity key matching condensed chunks back to result records.
pub const INDEX_KEY: &str = "index";
pub const SCORE_KEY: &str = "score";

/// Which key of a record holds its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Text,
    Content,
    PageContent,
}

impl TextField {
    /// Lookup order used by [`ChunkRecord::text`].
    pub const PRIORITY: [TextField; 3] = [TextField::Text, TextField::Content, TextField::PageContent];

    pub fn key(&self) -> &'static str {
        match self {
            TextField::Text => "text",
            TextField::Content => "content",
            TextField::PageContent => "page_content",
        }
    }
}

/// A JSON object record (`index`, `score`, text, plus whatever else the caller attached).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkRecord(Map<String, Value>);

impl ChunkRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// First of `text`, `content`, `page_content` holding a non-empty string.
    pub fn text(&self) -> Option<(TextField, &str)> {
        TextField::PRIORITY.into_iter().find_map(|field| {
            self.0
                .get(field.key())
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(|text| (field, text))
        })
    }

    pub fn set_text(&mut self, field: TextField, text: impl Into<String>) {
        self.0
            .insert(field.key().to_string(), Value::String(text.into()));
    }

    pub fn index(&self) -> Option<&Value> {
        self.0.get(INDEX_KEY)
    }

    pub fn is_condensed(&self) -> bool {
        self.0
            .get(CONDENSED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ChunkRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for ChunkRecord {
    type Error = Value;

    /// Accepts JSON objects; any other value is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<ChunkRecord> for Value {
    fn from(record: ChunkRecord) -> Self {
        Value::Object(record.0)
    }
}
