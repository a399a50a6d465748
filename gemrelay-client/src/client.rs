//! High-level client wiring the pipeline together.

use std::path::Path;
use std::sync::Arc;

use serde_yaml::Mapping;

use crate::error::{RelayError, TransportError};
use crate::pipeline::RequestPipeline;
use crate::pool::CredentialPool;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::settings::ClientSettings;
use crate::shape::ResponseShape;
use crate::transport::{HttpTransport, Transport};
use crate::translation::TranslationWorkflow;

/// Entry point owning the pool, transport and scheduler.
///
/// # Example
///
/// ```ignore
/// use gemrelay_client::{ClientSettings, RelayClient};
///
/// let client = RelayClient::from_settings(ClientSettings::default(), ["my-key"])?;
/// let answer: String = client.ask("Name a blacksmith").await?;
/// ```
#[derive(Debug, Clone)]
pub struct RelayClient {
    pipeline: RequestPipeline,
    translator: TranslationWorkflow,
}

impl RelayClient {
    /// Creates a client from explicit collaborators.
    pub fn new(
        settings: ClientSettings,
        pool: Arc<CredentialPool>,
        transport: Arc<dyn Transport>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let pipeline = RequestPipeline::new(settings, pool, transport, scheduler);
        let translator = TranslationWorkflow::new(pipeline.clone());
        Self {
            pipeline,
            translator,
        }
    }

    /// Creates a client with the HTTP transport and the tokio scheduler.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built (for example an invalid
    /// proxy).
    pub fn from_settings<I, S>(settings: ClientSettings, keys: I) -> Result<Self, TransportError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transport = HttpTransport::new(settings.call_timeout, settings.proxy.as_ref())?;
        let pool = Arc::new(CredentialPool::new(keys));

        Ok(Self::new(
            settings,
            pool,
            Arc::new(transport),
            Arc::new(TokioScheduler::new()),
        ))
    }

    /// Returns the request pipeline.
    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Returns the translation workflow.
    pub fn translator(&self) -> &TranslationWorkflow {
        &self.translator
    }

    /// Returns the credential pool.
    pub fn pool(&self) -> &Arc<CredentialPool> {
        self.pipeline.pool()
    }

    /// Returns the settings.
    pub fn settings(&self) -> &ClientSettings {
        self.pipeline.settings()
    }

    /// Sends a prompt and waits for the decoded answer.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the request chain.
    pub async fn ask<T: ResponseShape>(&self, prompt: impl Into<String>) -> Result<T, RelayError> {
        self.pipeline.request(prompt).await
    }

    /// Translates a YAML file and waits for the mapping.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the translation chain.
    pub async fn translate(&self, path: impl AsRef<Path>) -> Result<Mapping, RelayError> {
        self.translator.translate_async(path).await
    }
}
