use bytes::Bytes;
use futures_core::Stream;
use reqwest::{Client, IntoUrl, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ndjson::{self, NdjsonStream};

pub(crate) const DEFAULT_API_BASE: &str = "http://localhost:11434";

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("invalid backend api base: {0}")]
    InvalidApiBase(reqwest::Error),

    #[error("invalid backend endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("a request to the backend failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("failed to query backend resource: {0}")]
    NotFound(String),

    #[error("the backend rejected the request: {0}")]
    BadRequest(String),

    #[error("the backend encountered an internal error: {0}")]
    InternalError(String),

    #[error("the backend returned an unspecified error: {0}")]
    UnspecifiedError(String),

    #[error("could not parse streamed response: {0}")]
    Stream(#[from] ndjson::Error),
}

/* === IO === */

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Role {
    Assistant,
    User,
    System,
}

// Structures to serialize /api/chat
#[derive(Serialize, Debug, Clone)]
pub(crate) struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Sampling parameters forwarded verbatim in the request's `options` object.
#[derive(Serialize, Debug, Clone, Copy)]
pub(crate) struct SamplingOptions {
    pub temperature: f32,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'m> {
    model: &'m str,
    messages: &'m [ChatMessage],
    options: SamplingOptions,
}

// Structures to deserialize /api/chat
#[derive(Deserialize, Debug)]
pub(crate) struct MessageDelta {
    pub role: Role,
    pub content: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChatDelta {
    pub message: MessageDelta,
    pub done: bool,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ChatChunk {
    Delta(ChatDelta),
    Error(ApiError),
}

// Structures to deserialize /api/tags
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Tag {
    pub name: String,
    pub model: String,
    pub modified_at: String,
    pub size: u64,
    pub digest: String,
    pub details: Details,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Details {
    pub parent_model: String,
    pub format: String,
    pub family: String,
    pub families: Option<Vec<String>>, // null for models without a family list
    pub parameter_size: String,
    pub quantization_level: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct TagsList {
    models: Vec<Tag>,
}

// Errors
#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

pub(crate) struct ChatStream<S>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    stream: NdjsonStream<S>,
}

impl<S: Stream<Item = reqwest::Result<Bytes>> + Unpin> ChatStream<S> {
    /// The next completion delta. A mid-stream error object from the API is
    /// surfaced as an error, not a delta.
    pub(crate) async fn next(&mut self) -> Option<Result<ChatDelta, Error>> {
        let chunk = self.stream.parse::<ChatChunk>().await;

        chunk.map(|r| {
            r.map_err(Error::Stream).and_then(|chunk| match chunk {
                ChatChunk::Delta(d) => Ok(d),
                ChatChunk::Error(e) => Err(Error::UnspecifiedError(e.error)),
            })
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OllamaApi {
    api_base: Url,
    http: Client,
}

impl OllamaApi {
    pub(crate) fn with_api_base<U: IntoUrl>(api_base: U) -> Result<OllamaApi, Error> {
        Ok(OllamaApi {
            api_base: api_base.into_url().map_err(Error::InvalidApiBase)?,
            http: Client::new(),
        })
    }

    pub(crate) fn new() -> OllamaApi {
        Self::with_api_base(DEFAULT_API_BASE).unwrap()
    }

    async fn maybe_parse_api_error(res: Response) -> Result<Response, Error> {
        let status = res.status();

        if status.is_success() {
            return Ok(res);
        }

        let message = match res.json::<ApiError>().await {
            Ok(err) => err.error,
            Err(_) => format!("backend returned status {}", status),
        };

        match status {
            StatusCode::NOT_FOUND => Err(Error::NotFound(message)),
            code => match code.as_u16() {
                400..=499 => Err(Error::BadRequest(message)),
                500..=599 => Err(Error::InternalError(message)),
                _ => Err(Error::UnspecifiedError(message)),
            },
        }
    }

    /// A bare status check against the tag listing endpoint. Succeeds on any
    /// 2xx response; the body is not inspected.
    pub(crate) async fn heartbeat(&self) -> Result<(), Error> {
        let url = self.api_base.join("/api/tags")?;

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        Self::maybe_parse_api_error(res).await?;

        Ok(())
    }

    pub(crate) async fn tags(&self) -> Result<Vec<Tag>, Error> {
        let url = self.api_base.join("/api/tags")?;

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let res = Self::maybe_parse_api_error(res).await?;

        let tags: TagsList = res.json().await.map_err(Error::RequestFailed)?;

        Ok(tags.models)
    }

    pub(crate) async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: SamplingOptions,
    ) -> Result<ChatStream<impl Stream<Item = reqwest::Result<Bytes>> + Unpin>, Error> {
        let url = self.api_base.join("/api/chat")?;

        let res = self
            .http
            .post(url)
            .json(&ChatRequest {
                model,
                messages,
                options,
            })
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let res = Self::maybe_parse_api_error(res).await?;

        let stream = NdjsonStream::new(res.bytes_stream());

        Ok(ChatStream { stream })
    }
}
