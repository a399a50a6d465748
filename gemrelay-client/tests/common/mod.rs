//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use gemrelay_client::{
    ClientSettings, CredentialPool, RelayClient, RetryPolicy, Scheduler, Task, Transport,
    TransportError, TransportResponse,
};
use gemrelay_core::GenerateRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub key: String,
    pub prompt: String,
}

/// Transport replaying a fixed script of outcomes.
///
/// Once the script runs out every call fails with a connect error.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse::new(status, body)));
        self
    }

    pub fn fail(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Connect("connection refused".to_string())));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(
        &self,
        url: &str,
        body: &GenerateRequest,
    ) -> Result<TransportResponse, TransportError> {
        let key = url::Url::parse(url)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(name, _)| name == "key")
                    .map(|(_, value)| value.into_owned())
            })
            .unwrap_or_default();

        self.calls.lock().unwrap().push(RecordedCall {
            key,
            prompt: body.prompt().unwrap_or_default().to_string(),
        });

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("script exhausted".to_string())))
    }
}

/// Scheduler that records requested delays and runs tasks right away.
#[derive(Default)]
pub struct RecordingScheduler {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) {
        self.delays.lock().unwrap().push(delay);
        tokio::spawn(task);
    }
}

/// Client wired to test doubles.
pub struct Harness {
    pub client: RelayClient,
    pub transport: Arc<ScriptedTransport>,
    pub scheduler: Arc<RecordingScheduler>,
}

impl Harness {
    pub fn pool(&self) -> &Arc<CredentialPool> {
        self.client.pool()
    }
}

pub fn settings() -> ClientSettings {
    ClientSettings::default()
        .with_language("Spanish")
        .with_retry(RetryPolicy::new(
            Duration::from_secs(5),
            Duration::from_secs(10),
        ))
}

pub fn harness(keys: &[&str], transport: ScriptedTransport) -> Harness {
    harness_with(settings(), keys, transport)
}

pub fn harness_with(
    settings: ClientSettings,
    keys: &[&str],
    transport: ScriptedTransport,
) -> Harness {
    let transport = Arc::new(transport);
    let scheduler = Arc::new(RecordingScheduler::default());
    let pool = Arc::new(CredentialPool::new(keys.iter().copied()));

    let client = RelayClient::new(settings, pool, transport.clone(), scheduler.clone());

    Harness {
        client,
        transport,
        scheduler,
    }
}

/// Wraps model text in a `generateContent` response envelope.
pub fn envelope(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {
            "promptTokenCount": 12,
            "candidatesTokenCount": 8,
            "totalTokenCount": 20
        }
    })
    .to_string()
}
