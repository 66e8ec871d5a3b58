//! Engine construction and invocation.
//!
//! An [`Engine`] is a handle to the backend bound to one model id and the
//! fixed sampling temperature. Construction is pure; nothing is validated
//! until the engine is invoked, so an unknown model id surfaces as a
//! `NotFound` backend error at completion time.

use async_trait::async_trait;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::ollama::api::{self, ChatMessage, OllamaApi, SamplingOptions};
use crate::ollama::Error;

/// The sampling temperature every engine is bound to. Not configurable
/// per call.
pub(crate) const SAMPLING_TEMPERATURE: f32 = 0.3;

/// Outcome of driving one completion to its end.
#[derive(Debug)]
pub(crate) enum Completion {
    /// The fully resolved reply text.
    Answer(String),
    /// The stream was cancelled between chunks; any partial text is
    /// discarded.
    Interrupted,
}

/// The invocation seam between the orchestrator and the backend.
#[async_trait]
pub(crate) trait ChatEngine: Send + Sync {
    /// Resolves a rendered message sequence into a single reply string,
    /// honoring `cancel` between streamed chunks.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Result<Completion, Error>;
}

/// Constructs engines. Pure construction, no network I/O; the backend
/// address is bound once, the model id fresh per request.
pub(crate) trait EngineFactory: Send + Sync {
    fn engine(&self, model: &str) -> Box<dyn ChatEngine>;
}

pub(crate) struct Engine {
    api: OllamaApi,
    model: String,
}

impl Engine {
    pub(crate) fn bound(api: OllamaApi, model: String) -> Engine {
        Engine { api, model }
    }
}

#[async_trait]
impl ChatEngine for Engine {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Result<Completion, Error> {
        let options = SamplingOptions {
            temperature: SAMPLING_TEMPERATURE,
        };

        let mut stream = self.api.chat(&self.model, messages, options).await?;

        let mut reply = String::new();

        loop {
            select! {
                delta = stream.next() => {
                    match delta {
                        Some(Ok(delta)) => {
                            if delta.message.role == api::Role::Assistant {
                                reply.push_str(&delta.message.content);
                            }

                            if delta.done {
                                break;
                            }
                        }
                        Some(Err(err)) => return Err(err.into()),
                        None => break,
                    }
                }
                _ = cancel.cancelled() => return Ok(Completion::Interrupted),
            }
        }

        Ok(Completion::Answer(reply))
    }
}

pub(crate) struct OllamaEngineFactory {
    api: OllamaApi,
}

impl OllamaEngineFactory {
    pub(crate) fn new(api: OllamaApi) -> OllamaEngineFactory {
        OllamaEngineFactory { api }
    }
}

impl EngineFactory for OllamaEngineFactory {
    fn engine(&self, model: &str) -> Box<dyn ChatEngine> {
        Box::new(Engine::bound(self.api.clone(), model.to_string()))
    }
}
