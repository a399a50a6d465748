// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `GemRelay` Client
//!
//! Resilient access to the `generateContent` API.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │  RelayClient  │────▶│ RequestPipeline  │────▶│   Transport    │
//! └───────────────┘     └──────────────────┘     └────────────────┘
//!         │                 │          │
//!         ▼                 ▼          ▼
//! ┌───────────────────┐ ┌──────────┐ ┌───────────┐
//! │TranslationWorkflow│ │   Pool   │ │ Scheduler │
//! └───────────────────┘ └──────────┘ └───────────┘
//! ```
//!
//! - [`CredentialPool`] rotates API keys and retires those over quota.
//! - [`RequestPipeline`] sends prompts with a bounded retry budget and
//!   decodes answers into a [`ResponseShape`].
//! - [`TranslationWorkflow`] translates YAML documents, retrying until a
//!   usable answer arrives.
//! - [`Scheduler`] runs deferred retries; [`TokioScheduler`] is the default.
//!
//! Outcomes are delivered through callbacks. The async conveniences
//! ([`RelayClient::ask`], [`RelayClient::translate`]) wrap them.

pub mod client;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod retry;
pub mod scheduler;
pub mod settings;
pub mod shape;
pub mod transport;
pub mod translation;

pub use client::RelayClient;
pub use error::{RelayError, TransportError};
pub use pipeline::{FailureCallback, RequestPipeline, SuccessCallback};
pub use pool::CredentialPool;
pub use retry::RetryPolicy;
pub use scheduler::{Scheduler, Task, TokioScheduler};
pub use settings::{ClientSettings, ProxyKind, ProxySettings, DEFAULT_ENDPOINT};
pub use shape::{decode, Json, ResponseShape, Text};
pub use transport::{endpoint_with_key, HttpTransport, Transport, TransportResponse};
pub use translation::{translation_prompt, TranslationWorkflow};
