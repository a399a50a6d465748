//! Bounded-retry request pipeline.
//!
//! A submitted prompt becomes a chain of attempts. Each attempt acquires a
//! credential, posts the request and either delivers a decoded value,
//! fails terminally, or hands the next attempt to the scheduler with one
//! less unit of budget. Nothing in the chain blocks a thread.

use futures::future::BoxFuture;
use gemrelay_core::{CredentialLease, GenerateRequest, ResultEnvelope};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

use crate::error::RelayError;
use crate::pool::CredentialPool;
use crate::scheduler::Scheduler;
use crate::settings::ClientSettings;
use crate::shape::{decode, ResponseShape};
use crate::transport::{endpoint_with_key, Transport, TransportResponse};

/// Boxed success callback.
pub type SuccessCallback<T> = Box<dyn FnOnce(T) + Send>;

/// Boxed failure callback.
pub type FailureCallback = Box<dyn FnOnce(RelayError) + Send>;

// ============================================================================
// Pending Request
// ============================================================================

/// State carried from one attempt to the next.
struct PendingRequest<T> {
    prompt: String,
    attempts_remaining: u32,
    budget: u32,
    on_success: SuccessCallback<T>,
    on_failure: FailureCallback,
}

impl<T> PendingRequest<T> {
    fn succeed(self, value: T) {
        (self.on_success)(value);
    }

    fn fail(self, error: RelayError) {
        (self.on_failure)(error);
    }
}

// ============================================================================
// Completion
// ============================================================================

/// One-shot completion shared by a success and a failure callback.
///
/// Whichever callback runs first delivers; later deliveries are dropped.
pub(crate) struct Completion<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Completion<T> {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let completion = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (completion, rx)
    }

    pub(crate) fn complete(&self, value: T) {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(tx) = sender {
            // The receiver may have been dropped by an impatient caller.
            let _ = tx.send(value);
        }
    }
}

// ============================================================================
// Request Pipeline
// ============================================================================

struct PipelineInner {
    settings: ClientSettings,
    pool: Arc<CredentialPool>,
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
}

/// Sends prompts with credential rotation and bounded retries.
///
/// Cloning is cheap; clones share the pool, transport and scheduler.
#[derive(Clone)]
pub struct RequestPipeline {
    inner: Arc<PipelineInner>,
}

impl fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("settings", &self.inner.settings)
            .field("pool", &self.inner.pool)
            .finish_non_exhaustive()
    }
}

impl RequestPipeline {
    /// Creates a pipeline from its collaborators.
    pub fn new(
        settings: ClientSettings,
        pool: Arc<CredentialPool>,
        transport: Arc<dyn Transport>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                settings,
                pool,
                transport,
                scheduler,
            }),
        }
    }

    /// Returns the settings.
    pub fn settings(&self) -> &ClientSettings {
        &self.inner.settings
    }

    /// Returns the credential pool.
    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.inner.pool
    }

    pub(crate) fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.inner.scheduler
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submits a prompt with the configured retry budget.
    ///
    /// Returns immediately. Exactly one of the callbacks runs later, unless
    /// the scheduler drops the task.
    pub fn submit<T, S, F>(&self, prompt: impl Into<String>, on_success: S, on_failure: F)
    where
        T: ResponseShape,
        S: FnOnce(T) + Send + 'static,
        F: FnOnce(RelayError) + Send + 'static,
    {
        self.submit_with_retries(prompt, self.inner.settings.max_retries, on_success, on_failure);
    }

    /// Submits a prompt with an explicit retry budget.
    ///
    /// A budget of zero fails with [`RelayError::RetriesExhausted`] without
    /// touching the network.
    pub fn submit_with_retries<T, S, F>(
        &self,
        prompt: impl Into<String>,
        max_retries: u32,
        on_success: S,
        on_failure: F,
    ) where
        T: ResponseShape,
        S: FnOnce(T) + Send + 'static,
        F: FnOnce(RelayError) + Send + 'static,
    {
        let prompt = format!("{}{}", self.inner.settings.rules_prefix(), prompt.into());
        debug!(budget = max_retries, "Submitting request");

        let pending = PendingRequest {
            prompt,
            attempts_remaining: max_retries,
            budget: max_retries,
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        };

        self.inner.scheduler.schedule(self.attempt(pending));
    }

    /// Sends a prompt and waits for the decoded answer.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the chain, or [`RelayError::Abandoned`]
    /// if the chain was dropped without an outcome.
    pub async fn request<T: ResponseShape>(
        &self,
        prompt: impl Into<String>,
    ) -> Result<T, RelayError> {
        self.request_with_retries(prompt, self.inner.settings.max_retries)
            .await
    }

    /// Like [`request`](Self::request) with an explicit retry budget.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn request_with_retries<T: ResponseShape>(
        &self,
        prompt: impl Into<String>,
        max_retries: u32,
    ) -> Result<T, RelayError> {
        let (completion, rx) = Completion::channel();
        let on_failure = completion.clone();

        self.submit_with_retries(
            prompt,
            max_retries,
            move |value| completion.complete(Ok(value)),
            move |err| on_failure.complete(Err(err)),
        );

        rx.await.unwrap_or(Err(RelayError::Abandoned))
    }

    // ========================================================================
    // Attempt Chain
    // ========================================================================

    fn attempt<T: ResponseShape>(&self, pending: PendingRequest<T>) -> BoxFuture<'static, ()> {
        let pipeline = self.clone();
        Box::pin(async move { pipeline.run_attempt(pending).await })
    }

    #[instrument(skip_all, fields(remaining = pending.attempts_remaining))]
    async fn run_attempt<T: ResponseShape>(&self, pending: PendingRequest<T>) {
        if pending.attempts_remaining == 0 {
            warn!(attempts = pending.budget, "Max retries reached");
            let attempts = pending.budget;
            pending.fail(RelayError::RetriesExhausted { attempts });
            return;
        }

        let lease = match self.inner.pool.acquire() {
            Ok(lease) => lease,
            Err(err) => {
                error!(error = %err, "No usable credential");
                pending.fail(err);
                return;
            }
        };

        let request = self.build_request(&pending.prompt);

        match self.dispatch(&lease, &request).await {
            Err(err) => {
                warn!(credential = %lease.id, error = %err, "Request failed");
                self.retry_later(pending);
            }
            Ok(response) if !response.is_success() => {
                let rejection = self.classify_rejection(&lease, response);
                debug!(error = %rejection, "Retrying after rejection");
                self.retry_later(pending);
            }
            Ok(response) => self.handle_body(&lease, &response.body, pending),
        }
    }

    fn handle_body<T: ResponseShape>(
        &self,
        lease: &CredentialLease,
        body: &str,
        pending: PendingRequest<T>,
    ) {
        if body.trim().is_empty() {
            warn!(credential = %lease.id, "Response body is empty");
            pending.fail(RelayError::EmptyBody);
            return;
        }

        if let Some(total) = ResultEnvelope::from_body(body)
            .ok()
            .and_then(|envelope| envelope.total_tokens())
        {
            debug!(credential = %lease.id, total_tokens = total, "Token usage");
        }

        match decode::<T>(body) {
            Ok(value) => {
                debug!(credential = %lease.id, "Response decoded");
                pending.succeed(value);
            }
            Err(err) => {
                debug!(error = %err, "Could not decode response");
                self.retry_later(pending);
            }
        }
    }

    fn retry_later<T: ResponseShape>(&self, mut pending: PendingRequest<T>) {
        pending.attempts_remaining = pending.attempts_remaining.saturating_sub(1);
        let delay = self.inner.settings.retry.request_delay;
        debug!(
            remaining = pending.attempts_remaining,
            delay_ms = delay.as_millis(),
            "Scheduling retry"
        );

        self.inner
            .scheduler
            .schedule_after(delay, self.attempt(pending));
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Builds the request body for a prompt.
    pub(crate) fn build_request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest::new(prompt, self.inner.settings.temperature)
    }

    /// Posts a request with the leased credential.
    pub(crate) async fn dispatch(
        &self,
        lease: &CredentialLease,
        request: &GenerateRequest,
    ) -> Result<TransportResponse, RelayError> {
        let url = endpoint_with_key(&self.inner.settings.endpoint, &lease.key)?;
        let response = self.inner.transport.post(&url, request).await?;
        Ok(response)
    }

    /// Interprets a non-success response.
    ///
    /// A body mentioning the quota marks the credential exhausted.
    pub(crate) fn classify_rejection(
        &self,
        lease: &CredentialLease,
        response: TransportResponse,
    ) -> RelayError {
        if response.body.to_lowercase().contains("quota") {
            if self.inner.pool.mark_exhausted(&lease.id) {
                info!(
                    credential = %lease.id,
                    available = self.inner.pool.available(),
                    "API key exceeded quota, removed from rotation"
                );
            }
            RelayError::QuotaExceeded {
                credential: lease.id.clone(),
            }
        } else {
            warn!(
                credential = %lease.id,
                status = response.status,
                body = %response.body,
                "Request rejected"
            );
            RelayError::NonSuccessStatus {
                status: response.status,
                body: response.body,
            }
        }
    }
}
