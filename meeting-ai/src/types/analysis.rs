//! Types for assembled analysis results.

use serde::Serialize;
use serde_json::{Map, Value};

use super::job::{JobId, JobStatus};

/// Normalized outcome of a terminal job, tagged by terminal status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobResult {
    Completed(CompletedResult),
    Failed(FailedResult),
}

impl JobResult {
    pub fn status(&self) -> JobStatus {
        match self {
            JobResult::Completed(_) => JobStatus::Completed,
            JobResult::Failed(_) => JobStatus::Failed,
        }
    }

    pub fn job_id(&self) -> &JobId {
        match self {
            JobResult::Completed(result) => &result.job_id,
            JobResult::Failed(result) => &result.job_id,
        }
    }
}

/// Output of a successfully completed analysis.
///
/// Fields the service did not send are empty or `None`; nothing is filled
/// with placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedResult {
    pub job_id: JobId,
    pub topics: Vec<Topic>,
    pub action_items: Vec<ActionItem>,
    pub summary: Option<Summary>,
    pub sentiment: Option<Sentiment>,
    /// `None` when the payload carried no retrieved-context block.
    pub retrieved_documents: Option<Vec<RetrievedDocument>>,
}

/// A discussion topic identified in the meeting, in the order reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub name: String,
    pub description: Option<String>,
    /// Relevance on a 1 to 10 scale.
    pub relevance: Option<f64>,
    pub subtopics: Vec<String>,
    pub keywords: Vec<String>,
    pub participants: Vec<String>,
    pub duration: Option<String>,
}

/// A follow-up task extracted from the meeting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionItem {
    pub description: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub text: Option<String>,
    pub key_points: Vec<String>,
    pub decisions: Vec<String>,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    pub overall: Option<String>,
    pub score: Option<f64>,
    pub highlights: Vec<String>,
}

/// A supporting excerpt surfaced by the service's retrieval step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    /// Taken from `metadata.source`, falling back to `metadata.title`.
    pub source: Option<String>,
    /// Relevance in the closed range [0, 1].
    pub score: Option<f64>,
    pub content: String,
    pub metadata: Map<String, Value>,
}

/// Structured error detail from a failed analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedResult {
    pub job_id: JobId,
    pub errors: Vec<String>,
    /// Progress reached before the failure.
    pub progress: u8,
}

impl FailedResult {
    /// One-line description of why the job failed.
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            "unknown failure".to_string()
        } else {
            self.errors.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_id() -> JobId {
        JobId::new("abc123").unwrap()
    }

    #[test]
    fn test_failed_summary_joins_errors() {
        let failed = FailedResult {
            job_id: job_id(),
            errors: vec!["LLM timeout".to_string(), "retry limit reached".to_string()],
            progress: 60,
        };
        assert_eq!(failed.summary(), "LLM timeout; retry limit reached");

        let unknown = FailedResult {
            errors: vec![],
            ..failed
        };
        assert_eq!(unknown.summary(), "unknown failure");
    }

    #[test]
    fn test_result_serializes_with_status_tag() {
        let result = JobResult::Failed(FailedResult {
            job_id: job_id(),
            errors: vec!["boom".to_string()],
            progress: 10,
        });

        assert_eq!(result.status(), JobStatus::Failed);
        assert_eq!(result.job_id().as_str(), "abc123");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": "failed", "job_id": "abc123", "errors": ["boom"], "progress": 10})
        );
    }
}
