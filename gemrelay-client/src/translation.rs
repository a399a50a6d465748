//! Unbounded-retry YAML translation.
//!
//! A translation keeps retrying until the model returns a parseable
//! ```` ```yaml ```` block. Only an unreadable source file or an exhausted
//! credential pool ends the chain with an error.

use futures::future::BoxFuture;
use gemrelay_core::repair::{extract_fenced_block, unescape_recovered_text};
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

use crate::error::RelayError;
use crate::pipeline::{Completion, FailureCallback, RequestPipeline};

/// Builds the translation prompt for a YAML document.
pub fn translation_prompt(language: &str, document: &str) -> String {
    format!(
        "Translate YAML file below to {language}, keep the keys and special symbols (like §) \
         and DO NOT translate placeholders. Wrap result as ```yaml```. \n```yaml\n{document}\n```"
    )
}

struct PendingTranslation {
    path: PathBuf,
    prompt: String,
    attempt: u32,
    on_success: Box<dyn FnOnce(Mapping) + Send>,
    on_failure: FailureCallback,
}

/// Translates YAML documents through the request pipeline's credentials.
#[derive(Debug, Clone)]
pub struct TranslationWorkflow {
    pipeline: RequestPipeline,
}

impl TranslationWorkflow {
    /// Creates a workflow sharing the pipeline's pool, transport and scheduler.
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// Translates the YAML file at `path` into the configured language.
    ///
    /// Returns immediately. `on_success` receives the translated mapping.
    /// `on_failure` only sees [`RelayError::SourceUnreadable`] and
    /// [`RelayError::PoolExhausted`]. A translation whose YAML does not
    /// load is logged and dropped, so neither callback runs in that case.
    pub fn translate<S, F>(&self, path: impl Into<PathBuf>, on_success: S, on_failure: F)
    where
        S: FnOnce(Mapping) + Send + 'static,
        F: FnOnce(RelayError) + Send + 'static,
    {
        let path = path.into();
        let workflow = self.clone();

        self.pipeline.scheduler().schedule(Box::pin(async move {
            let document = match tokio::fs::read_to_string(&path).await {
                Ok(document) => document,
                Err(source) => {
                    error!(
                        path = %path.display(),
                        error = %source,
                        "Cannot read translation source"
                    );
                    on_failure(RelayError::SourceUnreadable { path, source });
                    return;
                }
            };

            let prompt = translation_prompt(&workflow.pipeline.settings().language, &document);
            info!(
                path = %path.display(),
                language = %workflow.pipeline.settings().language,
                "Starting translation"
            );

            let pending = PendingTranslation {
                path,
                prompt,
                attempt: 1,
                on_success: Box::new(on_success),
                on_failure: Box::new(on_failure),
            };

            workflow.run_attempt(pending).await;
        }));
    }

    /// Translates a file and waits for the mapping.
    ///
    /// # Errors
    ///
    /// Returns the chain's terminal error, or [`RelayError::Abandoned`] when
    /// the translated document could not be loaded.
    pub async fn translate_async(&self, path: impl AsRef<Path>) -> Result<Mapping, RelayError> {
        let (completion, rx) = Completion::channel();
        let on_failure = completion.clone();

        self.translate(
            path.as_ref(),
            move |mapping| completion.complete(Ok(mapping)),
            move |err| on_failure.complete(Err(err)),
        );

        rx.await.unwrap_or(Err(RelayError::Abandoned))
    }

    fn attempt(&self, pending: PendingTranslation) -> BoxFuture<'static, ()> {
        let workflow = self.clone();
        Box::pin(async move { workflow.run_attempt(pending).await })
    }

    #[instrument(skip_all, fields(path = %pending.path.display(), attempt = pending.attempt))]
    async fn run_attempt(&self, pending: PendingTranslation) {
        let lease = match self.pipeline.pool().acquire() {
            Ok(lease) => lease,
            Err(err) => {
                error!(error = %err, "No usable credential for translation");
                (pending.on_failure)(err);
                return;
            }
        };

        let request = self.pipeline.build_request(&pending.prompt);

        let response = match self.pipeline.dispatch(&lease, &request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(credential = %lease.id, error = %err, "Translation request failed");
                self.retry_later(pending);
                return;
            }
        };

        if !response.is_success() {
            self.pipeline.classify_rejection(&lease, response);
            self.retry_later(pending);
            return;
        }

        if response.body.trim().is_empty() {
            warn!(credential = %lease.id, "Translation response is empty");
            self.retry_later(pending);
            return;
        }

        let Some(block) = extract_fenced_block(&response.body, "yaml") else {
            debug!(body = %response.body, "No yaml block in translation response");
            info!(
                "Another attempt at generative translation... If it doesn't go away, \
                 turn off generative translation and report it."
            );
            self.retry_later(pending);
            return;
        };

        let cleaned = unescape_recovered_text(&block);
        match serde_yaml::from_str::<Mapping>(cleaned.trim()) {
            Ok(mapping) => {
                info!(keys = mapping.len(), "Translation complete");
                (pending.on_success)(mapping);
            }
            Err(err) => {
                let err = RelayError::DeserializationFailure(err.to_string());
                warn!(error = %err, "Failed to load translated document");
            }
        }
    }

    fn retry_later(&self, mut pending: PendingTranslation) {
        pending.attempt += 1;
        let delay = self.pipeline.settings().retry.translation_delay;
        debug!(
            next_attempt = pending.attempt,
            delay_ms = delay.as_millis(),
            "Scheduling translation retry"
        );

        self.pipeline
            .scheduler()
            .schedule_after(delay, self.attempt(pending));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_document() {
        let prompt = translation_prompt("German", "greeting: Hello");

        assert!(prompt.starts_with("Translate YAML file below to German"));
        assert!(prompt.contains("(like §)"));
        assert!(prompt.ends_with("```yaml\ngreeting: Hello\n```"));
    }
}
