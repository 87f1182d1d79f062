//! Scripted provider shared by the job flow tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{FetchError, SubmissionError, TransientFetchError};
use crate::traits::analysis::Provider;
use crate::types::job::JobId;
use crate::types::submission::{SubmissionReceipt, SubmissionRequest};

/// Replays a fixed sequence of fetch outcomes and counts the calls.
///
/// Once the script runs dry every further fetch fails transiently, which
/// makes an unexpected extra fetch visible in the counters.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    receipt: Mutex<Option<Result<SubmissionReceipt, SubmissionError>>>,
    fetches: Mutex<VecDeque<Result<Value, FetchError>>>,
    submit_calls: Mutex<u32>,
    fetch_calls: Mutex<u32>,
}

impl ScriptedProvider {
    pub(crate) fn new(fetches: Vec<Result<Value, FetchError>>) -> Self {
        Self {
            fetches: Mutex::new(fetches.into()),
            ..Default::default()
        }
    }

    pub(crate) fn with_receipt(self, receipt: Result<SubmissionReceipt, SubmissionError>) -> Self {
        *self.receipt.lock().unwrap() = Some(receipt);
        self
    }

    pub(crate) fn submit_calls(&self) -> u32 {
        *self.submit_calls.lock().unwrap()
    }

    pub(crate) fn fetch_calls(&self) -> u32 {
        *self.fetch_calls.lock().unwrap()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn submit(
        &self,
        _request: &SubmissionRequest,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        *self.submit_calls.lock().unwrap() += 1;
        self.receipt
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(SubmissionReceipt::default()))
    }

    async fn fetch(&self, _job_id: &JobId) -> Result<Value, FetchError> {
        *self.fetch_calls.lock().unwrap() += 1;
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Transient(TransientFetchError::network(
                    "script exhausted",
                )))
            })
    }
}
