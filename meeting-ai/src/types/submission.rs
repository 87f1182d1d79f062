//! Types for submitting a transcript for analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metadata value: a scalar or a list of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    List(Vec<MetadataValue>),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Flag(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Number(value.into())
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(values: Vec<String>) -> Self {
        MetadataValue::List(values.into_iter().map(MetadataValue::Text).collect())
    }
}

/// A unit of work for the analysis service: transcript text plus metadata.
///
/// Serializes to the wire body `{ "transcript": ..., "metadata": { ... } }`.
/// The metadata keys `title`, `participants`, and `date` are understood by the
/// service; any other key is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRequest {
    pub transcript: String,
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl SubmissionRequest {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.with_field("title", title.into())
    }

    /// An empty list leaves `participants` out of the metadata.
    pub fn with_participants(self, participants: Vec<String>) -> Self {
        if participants.is_empty() {
            return self;
        }
        self.with_field("participants", participants)
    }

    pub fn with_date(self, date: impl Into<String>) -> Self {
        self.with_field("date", date.into())
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        match self.metadata.get("title") {
            Some(MetadataValue::Text(title)) => Some(title),
            _ => None,
        }
    }
}

/// Raw acknowledgement returned by the service for a submission.
///
/// Both fields are optional at this level; the submitter decides what a
/// missing identifier or status means.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
