//! Normalization of terminal job payloads into typed results.

use log::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, MalformedResultError};
use crate::types::analysis::{
    ActionItem, CompletedResult, FailedResult, JobResult, RetrievedDocument, Sentiment, Summary,
    Topic,
};
use crate::types::job::{JobId, JobSnapshot, JobStatus, TerminalJob};

const RELEVANCE_RANGE: std::ops::RangeInclusive<f64> = 1.0..=10.0;
const SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;

/// Turns the raw payload of a terminal job into a [`JobResult`].
///
/// Missing or null fields become empty collections or `None`. A field that is
/// present with the wrong shape fails the whole assembly, naming the field.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, job: &TerminalJob) -> Result<JobResult, Error> {
        self.assemble_payload(&job.id, &job.payload)
    }

    /// Assemble a result straight from a poll response body.
    pub fn assemble_payload(&self, job_id: &JobId, payload: &Value) -> Result<JobResult, Error> {
        let result = assemble(job_id, payload).map_err(|e| {
            let e = e.for_job(job_id);
            warn!("Could not assemble result: {}", e);
            e
        })?;

        match &result {
            JobResult::Completed(completed) => debug!(
                "Assembled job {}: {} topic(s), {} action item(s), {} retrieved document(s)",
                job_id,
                completed.topics.len(),
                completed.action_items.len(),
                completed.retrieved_documents.as_ref().map_or(0, Vec::len)
            ),
            JobResult::Failed(failed) => {
                info!("Job {} failed: {}", job_id, failed.summary())
            }
        }

        Ok(result)
    }
}

fn assemble(job_id: &JobId, payload: &Value) -> Result<JobResult, MalformedResultError> {
    let snapshot = JobSnapshot::from_payload(payload)?;
    let object = payload
        .as_object()
        .ok_or_else(|| MalformedResultError::new("payload is not a JSON object"))?;

    match snapshot.status {
        JobStatus::Completed => completed(job_id, object).map(JobResult::Completed),
        JobStatus::Failed => Ok(JobResult::Failed(failed(job_id, snapshot, object)?)),
        status => Err(MalformedResultError::field(
            "status",
            format!("job is still {}", status),
        )),
    }
}

fn completed(
    job_id: &JobId,
    object: &Map<String, Value>,
) -> Result<CompletedResult, MalformedResultError> {
    Ok(CompletedResult {
        job_id: job_id.clone(),
        topics: topics(object)?,
        action_items: action_items(object)?,
        summary: summary(object)?,
        sentiment: sentiment(object)?,
        retrieved_documents: retrieved_documents(object)?,
    })
}

fn failed(
    job_id: &JobId,
    snapshot: JobSnapshot,
    object: &Map<String, Value>,
) -> Result<FailedResult, MalformedResultError> {
    let errors = match field::<Vec<String>>(object, "errors", "errors")? {
        Some(errors) => errors,
        None => field::<String>(object, "error", "error")?
            .into_iter()
            .collect(),
    };

    Ok(FailedResult {
        job_id: job_id.clone(),
        errors,
        progress: snapshot.progress,
    })
}

/// Decode `object[key]`, treating a missing or null value as absent.
fn field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<T>, MalformedResultError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|e| MalformedResultError::field(path, e.to_string())),
    }
}

fn element<T: DeserializeOwned>(value: &Value, path: &str) -> Result<T, MalformedResultError> {
    T::deserialize(value).map_err(|e| MalformedResultError::field(path, e.to_string()))
}

fn in_range(
    value: Option<f64>,
    range: &std::ops::RangeInclusive<f64>,
    path: impl FnOnce() -> String,
) -> Result<Option<f64>, MalformedResultError> {
    match value {
        Some(v) if !range.contains(&v) => Err(MalformedResultError::field(
            path(),
            format!(
                "{} is outside {}..={}",
                v,
                range.start(),
                range.end()
            ),
        )),
        other => Ok(other),
    }
}

/// A string or number, kept as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTopic {
    name: String,
    description: Option<String>,
    relevance: Option<f64>,
    subtopics: Option<Vec<String>>,
    keywords: Option<Vec<String>>,
    participants: Option<Vec<String>>,
    duration: Option<Scalar>,
}

fn topics(object: &Map<String, Value>) -> Result<Vec<Topic>, MalformedResultError> {
    let raw = field::<Vec<Value>>(object, "topics", "topics")?.unwrap_or_default();

    raw.iter()
        .enumerate()
        .map(|(i, value)| {
            let path = format!("topics[{}]", i);
            let topic: RawTopic = element(value, &path)?;
            let relevance = in_range(topic.relevance, &RELEVANCE_RANGE, || {
                format!("{}.relevance", path)
            })?;

            Ok(Topic {
                name: topic.name,
                description: topic.description,
                relevance,
                subtopics: topic.subtopics.unwrap_or_default(),
                keywords: topic.keywords.unwrap_or_default(),
                participants: topic.participants.unwrap_or_default(),
                duration: topic.duration.map(String::from),
            })
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActionItem {
    description: Option<String>,
    task: Option<String>,
    title: Option<String>,
    assignee: Option<String>,
    owner: Option<String>,
    due_date: Option<String>,
    deadline: Option<String>,
    priority: Option<Scalar>,
    status: Option<String>,
    context: Option<String>,
}

fn action_items(object: &Map<String, Value>) -> Result<Vec<ActionItem>, MalformedResultError> {
    let raw = field::<Vec<Value>>(object, "actionItems", "actionItems")?.unwrap_or_default();

    raw.iter()
        .enumerate()
        .map(|(i, value)| {
            let path = format!("actionItems[{}]", i);
            match value {
                Value::String(text) => Ok(ActionItem {
                    description: text.clone(),
                    assignee: None,
                    due_date: None,
                    priority: None,
                    status: None,
                    context: None,
                }),
                Value::Object(_) => {
                    let item: RawActionItem = element(value, &path)?;
                    let description = item
                        .description
                        .or(item.task)
                        .or(item.title)
                        .ok_or_else(|| {
                            MalformedResultError::field(format!("{}.description", path), "missing")
                        })?;
                    Ok(ActionItem {
                        description,
                        assignee: item.assignee.or(item.owner),
                        due_date: item.due_date.or(item.deadline),
                        priority: item.priority.map(String::from),
                        status: item.status,
                        context: item.context,
                    })
                }
                other => Err(MalformedResultError::field(
                    path,
                    format!("expected a string or an object, found {}", other),
                )),
            }
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    text: Option<String>,
    summary: Option<String>,
    overview: Option<String>,
    key_points: Option<Vec<String>>,
    decisions: Option<Vec<String>>,
    next_steps: Option<Vec<String>>,
}

fn summary(object: &Map<String, Value>) -> Result<Option<Summary>, MalformedResultError> {
    match object.get("summary") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(Summary {
            text: Some(text.clone()),
            key_points: Vec::new(),
            decisions: Vec::new(),
            next_steps: Vec::new(),
        })),
        Some(value) if value.is_object() => {
            let raw: RawSummary = element(value, "summary")?;
            Ok(Some(Summary {
                text: raw.text.or(raw.summary).or(raw.overview),
                key_points: raw.key_points.unwrap_or_default(),
                decisions: raw.decisions.unwrap_or_default(),
                next_steps: raw.next_steps.unwrap_or_default(),
            }))
        }
        Some(other) => Err(MalformedResultError::field(
            "summary",
            format!("expected a string or an object, found {}", other),
        )),
    }
}

#[derive(Deserialize)]
struct RawSentiment {
    overall: Option<String>,
    label: Option<String>,
    score: Option<f64>,
    highlights: Option<Vec<String>>,
}

fn sentiment(object: &Map<String, Value>) -> Result<Option<Sentiment>, MalformedResultError> {
    match object.get("sentiment") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(label)) => Ok(Some(Sentiment {
            overall: Some(label.clone()),
            score: None,
            highlights: Vec::new(),
        })),
        Some(value) if value.is_object() => {
            let raw: RawSentiment = element(value, "sentiment")?;
            Ok(Some(Sentiment {
                overall: raw.overall.or(raw.label),
                score: raw.score,
                highlights: raw.highlights.unwrap_or_default(),
            }))
        }
        Some(other) => Err(MalformedResultError::field(
            "sentiment",
            format!("expected a string or an object, found {}", other),
        )),
    }
}

#[derive(Deserialize)]
struct RawDocument {
    metadata: Option<Map<String, Value>>,
    content: Option<String>,
    score: Option<f64>,
}

fn retrieved_documents(
    object: &Map<String, Value>,
) -> Result<Option<Vec<RetrievedDocument>>, MalformedResultError> {
    let Some(context) = field::<Map<String, Value>>(object, "context", "context")? else {
        return Ok(None);
    };
    let Some(retrieved) =
        field::<Map<String, Value>>(&context, "retrievedContext", "context.retrievedContext")?
    else {
        return Ok(None);
    };
    let raw = field::<Vec<Value>>(
        &retrieved,
        "documents",
        "context.retrievedContext.documents",
    )?
    .unwrap_or_default();

    raw.iter()
        .enumerate()
        .map(|(i, value)| {
            let path = format!("context.retrievedContext.documents[{}]", i);
            let doc: RawDocument = element(value, &path)?;
            let score = in_range(doc.score, &SCORE_RANGE, || format!("{}.score", path))?;
            let metadata = doc.metadata.unwrap_or_default();
            let source = ["source", "title"]
                .iter()
                .find_map(|key| metadata.get(*key).and_then(Value::as_str))
                .map(str::to_string);

            Ok(RetrievedDocument {
                source,
                score,
                content: doc.content.unwrap_or_default(),
                metadata,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_id() -> JobId {
        JobId::new("abc123").unwrap()
    }

    fn assemble_json(payload: Value) -> Result<JobResult, Error> {
        ResultAssembler::new().assemble_payload(&job_id(), &payload)
    }

    fn completed_result(payload: Value) -> CompletedResult {
        match assemble_json(payload).unwrap() {
            JobResult::Completed(result) => result,
            other => panic!("expected a completed result, got {other:?}"),
        }
    }

    fn malformed_field(payload: Value) -> Option<String> {
        match assemble_json(payload) {
            Err(Error::MalformedResult(e)) => {
                assert_eq!(e.job_id, Some(job_id()));
                e.field
            }
            other => panic!("expected a malformed result error, got {other:?}"),
        }
    }

    #[test]
    fn test_single_topic_with_relevance() {
        let result = completed_result(json!({
            "status": "completed",
            "progress": 100,
            "topics": [{"name": "API Integration Issues", "relevance": 8}]
        }));

        assert_eq!(result.topics.len(), 1);
        assert_eq!(result.topics[0].name, "API Integration Issues");
        assert_eq!(result.topics[0].relevance, Some(8.0));
        assert!(result.topics[0].subtopics.is_empty());
        assert_eq!(result.topics[0].duration, None);
    }

    #[test]
    fn test_absent_fields_stay_empty() {
        let result = completed_result(json!({"status": "completed", "summary": null}));

        assert!(result.topics.is_empty());
        assert!(result.action_items.is_empty());
        assert_eq!(result.summary, None);
        assert_eq!(result.sentiment, None);
        assert_eq!(result.retrieved_documents, None);
    }

    #[test]
    fn test_full_payload() {
        let result = completed_result(json!({
            "status": "completed",
            "progress": 100,
            "topics": [{
                "name": "Release planning",
                "description": "Timeline for 2.0",
                "relevance": 9.5,
                "subtopics": ["QA"],
                "keywords": ["release", "qa"],
                "participants": ["John", "Sarah"],
                "duration": 12
            }],
            "actionItems": [
                "Send meeting notes",
                {"task": "Fix webhook retries", "owner": "Sarah", "dueDate": "2024-03-22", "priority": "high"}
            ],
            "summary": {
                "overview": "Team aligned on the release.",
                "keyPoints": ["Ship on Friday"],
                "nextSteps": ["Freeze the branch"]
            },
            "sentiment": {"label": "positive", "score": 0.7},
            "context": {
                "retrievedContext": {
                    "documents": [
                        {"metadata": {"title": "Runbook"}, "content": "Retry with backoff", "score": 0.82},
                        {"metadata": {"source": "wiki", "title": "Ignored"}, "content": "Release notes"}
                    ]
                }
            }
        }));

        let topic = &result.topics[0];
        assert_eq!(topic.description.as_deref(), Some("Timeline for 2.0"));
        assert_eq!(topic.keywords, vec!["release", "qa"]);
        assert_eq!(topic.duration.as_deref(), Some("12"));

        assert_eq!(result.action_items.len(), 2);
        assert_eq!(result.action_items[0].description, "Send meeting notes");
        assert_eq!(result.action_items[0].assignee, None);
        assert_eq!(result.action_items[1].description, "Fix webhook retries");
        assert_eq!(result.action_items[1].assignee.as_deref(), Some("Sarah"));
        assert_eq!(result.action_items[1].due_date.as_deref(), Some("2024-03-22"));
        assert_eq!(result.action_items[1].priority.as_deref(), Some("high"));

        let summary = result.summary.unwrap();
        assert_eq!(summary.text.as_deref(), Some("Team aligned on the release."));
        assert_eq!(summary.key_points, vec!["Ship on Friday"]);
        assert!(summary.decisions.is_empty());

        let sentiment = result.sentiment.unwrap();
        assert_eq!(sentiment.overall.as_deref(), Some("positive"));
        assert_eq!(sentiment.score, Some(0.7));

        let documents = result.retrieved_documents.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].source.as_deref(), Some("Runbook"));
        assert_eq!(documents[0].score, Some(0.82));
        assert_eq!(documents[1].source.as_deref(), Some("wiki"));
        assert_eq!(documents[1].score, None);
        assert_eq!(documents[1].content, "Release notes");
    }

    #[test]
    fn test_plain_string_summary_and_sentiment() {
        let result = completed_result(json!({
            "status": "completed",
            "summary": "Short meeting.",
            "sentiment": "neutral"
        }));

        assert_eq!(result.summary.unwrap().text.as_deref(), Some("Short meeting."));
        assert_eq!(result.sentiment.unwrap().overall.as_deref(), Some("neutral"));
    }

    #[test]
    fn test_fallback_keys_do_not_clash_with_primary_keys() {
        let result = completed_result(json!({
            "status": "completed",
            "actionItems": [
                {"title": "Fix retries", "description": "Add backoff to webhook", "assignee": "Sarah"},
                {"task": "Update runbook", "title": "Docs", "owner": "John", "deadline": "Friday"}
            ],
            "summary": {"summary": "Short", "text": "Longer text"},
            "sentiment": {"label": "positive", "overall": "mixed"}
        }));

        assert_eq!(result.action_items[0].description, "Add backoff to webhook");
        assert_eq!(result.action_items[0].assignee.as_deref(), Some("Sarah"));
        assert_eq!(result.action_items[1].description, "Update runbook");
        assert_eq!(result.action_items[1].assignee.as_deref(), Some("John"));
        assert_eq!(result.action_items[1].due_date.as_deref(), Some("Friday"));
        assert_eq!(result.summary.unwrap().text.as_deref(), Some("Longer text"));
        assert_eq!(result.sentiment.unwrap().overall.as_deref(), Some("mixed"));
    }

    #[test]
    fn test_empty_retrieved_context_is_present() {
        let result = completed_result(json!({
            "status": "completed",
            "context": {"retrievedContext": {}}
        }));
        assert_eq!(result.retrieved_documents, Some(vec![]));

        let result = completed_result(json!({"status": "completed", "context": {}}));
        assert_eq!(result.retrieved_documents, None);
    }

    #[test]
    fn test_topics_as_string_is_malformed() {
        let field = malformed_field(json!({
            "status": "completed",
            "topics": "API Integration Issues"
        }));
        assert_eq!(field.as_deref(), Some("topics"));
    }

    #[test]
    fn test_wrong_shapes_name_the_field() {
        let field = malformed_field(json!({"status": "completed", "topics": [{"relevance": 3}]}));
        assert_eq!(field.as_deref(), Some("topics[0]"));

        let field = malformed_field(json!({"status": "completed", "actionItems": [42]}));
        assert_eq!(field.as_deref(), Some("actionItems[0]"));

        let field = malformed_field(json!({"status": "completed", "actionItems": [{"owner": "Sarah"}]}));
        assert_eq!(field.as_deref(), Some("actionItems[0].description"));

        let field = malformed_field(json!({"status": "completed", "sentiment": 0.4}));
        assert_eq!(field.as_deref(), Some("sentiment"));

        let field = malformed_field(json!({"status": "completed", "context": []}));
        assert_eq!(field.as_deref(), Some("context"));
    }

    #[test]
    fn test_scores_outside_range_are_malformed() {
        let field = malformed_field(json!({
            "status": "completed",
            "topics": [{"name": "Budget", "relevance": 11}]
        }));
        assert_eq!(field.as_deref(), Some("topics[0].relevance"));

        let field = malformed_field(json!({
            "status": "completed",
            "context": {"retrievedContext": {"documents": [{"content": "x", "score": 1.5}]}}
        }));
        assert_eq!(
            field.as_deref(),
            Some("context.retrievedContext.documents[0].score")
        );
    }

    #[test]
    fn test_non_terminal_or_non_object_payload_is_malformed() {
        assert_eq!(
            malformed_field(json!({"status": "processing", "progress": 45})).as_deref(),
            Some("status")
        );
        assert_eq!(malformed_field(json!(["completed"])), None);
    }

    #[test]
    fn test_failed_job_collects_errors() {
        let result = assemble_json(json!({
            "status": "failed",
            "progress": 60,
            "errors": ["LLM timeout", "retry limit reached"]
        }))
        .unwrap();

        match result {
            JobResult::Failed(failed) => {
                assert_eq!(failed.progress, 60);
                assert_eq!(failed.summary(), "LLM timeout; retry limit reached");
            }
            other => panic!("expected a failed result, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_job_falls_back_to_single_error() {
        let result = assemble_json(json!({"status": "failed", "error": "quota exceeded"})).unwrap();
        match result {
            JobResult::Failed(failed) => assert_eq!(failed.errors, vec!["quota exceeded"]),
            other => panic!("expected a failed result, got {other:?}"),
        }

        let result = assemble_json(json!({"status": "failed"})).unwrap();
        match result {
            JobResult::Failed(failed) => assert_eq!(failed.summary(), "unknown failure"),
            other => panic!("expected a failed result, got {other:?}"),
        }
    }

    #[test]
    fn test_assemble_uses_terminal_job_payload() {
        let job = TerminalJob {
            id: job_id(),
            status: JobStatus::Completed,
            progress: 100,
            attempts: 3,
            payload: json!({"status": "completed", "topics": []}),
        };

        let result = ResultAssembler::new().assemble(&job).unwrap();
        assert_eq!(result.status(), JobStatus::Completed);
        assert_eq!(result.job_id(), &job_id());
    }
}
