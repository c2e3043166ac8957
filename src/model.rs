// Domain types shared by every stage of the run: collections, texts and
// the values the prediction endpoint hands back.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// Server-assigned collection identifier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct CollectionId(pub u64);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned text identifier. Only a successful `text.create` call
/// produces one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TextId(pub u64);

impl fmt::Display for TextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sv,
}

/// Local reference to a remote collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    #[serde(rename = "collection_id")]
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub language: Language,
}

/// One usable row of the input file, before it exists remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub body: String,
    pub target_word: String,
}

/// Predicted sentiment as returned by the server. The endpoint is loosely
/// typed, so anything that is neither a number nor a string is kept as its
/// JSON text.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(from = "serde_json::Value")]
pub enum PredictedValue {
    Number(serde_json::Number),
    Text(String),
    #[default]
    Absent,
}

impl PredictedValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, PredictedValue::Absent)
    }
}

impl From<serde_json::Value> for PredictedValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PredictedValue::Absent,
            serde_json::Value::Number(n) => PredictedValue::Number(n),
            serde_json::Value::String(s) => PredictedValue::Text(s),
            other => PredictedValue::Text(other.to_string()),
        }
    }
}

/// Renders the CSV field: the number or string as-is, empty when absent.
impl fmt::Display for PredictedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictedValue::Number(n) => write!(f, "{}", n),
            PredictedValue::Text(s) => f.write_str(s),
            PredictedValue::Absent => Ok(()),
        }
    }
}

/// A text that was accepted by the server, plus what we know about it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionText {
    pub id: TextId,
    pub body: String,
    pub target_word: String,
    pub value: PredictedValue,
}

impl PredictionText {
    pub fn created(id: TextId, row: InputRow) -> Self {
        PredictionText {
            id,
            body: row.body,
            target_word: row.target_word,
            value: PredictedValue::Absent,
        }
    }
}

/// One entry of the `predictions` array.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Prediction {
    pub text_id: TextId,
    #[serde(default)]
    pub value: PredictedValue,
}

/// Returned by [`TextIndex::apply`] when the server names a text we never
/// created in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownText(pub TextId);

/// Texts created in this run, keyed by their server id. Iterates in
/// ascending id order.
#[derive(Debug, Default, Clone)]
pub struct TextIndex {
    texts: BTreeMap<TextId, PredictionText>,
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `text`. A text already stored under the same id is replaced
    /// and handed back.
    pub fn insert(&mut self, text: PredictionText) -> Option<PredictionText> {
        let id = text.id;
        let previous = self.texts.insert(id, text);
        if let Some(previous) = &previous {
            warn!(
                text_id = %id,
                "server returned an id already in use, replacing text '{}'", previous.body
            );
        }
        previous
    }

    pub fn get(&self, id: TextId) -> Option<&PredictionText> {
        self.texts.get(&id)
    }

    /// Store a predicted value on the matching text.
    pub fn apply(&mut self, prediction: Prediction) -> Result<(), UnknownText> {
        match self.texts.get_mut(&prediction.text_id) {
            Some(text) => {
                text.value = prediction.value;
                Ok(())
            }
            None => Err(UnknownText(prediction.text_id)),
        }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionText> {
        self.texts.values()
    }
}

/// Distinct target words, in lexicographic order.
pub type TargetWords = BTreeSet<String>;
