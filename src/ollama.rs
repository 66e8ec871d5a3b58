//! Client for the Ollama inference backend.
//!
//! The [`api`] submodule holds the wire types and request plumbing for the
//! two endpoints this crate consumes: `POST /api/chat` (newline-delimited
//! JSON stream of completion deltas) and `GET /api/tags` (model listing,
//! doubling as the startup health check).
//!
//! The API surfaces its own bespoke error type; callers outside this module
//! see [`Error`], which classifies every failure into an [`ErrorKind`] so
//! higher layers can react to the category (connectivity, missing model,
//! backend fault) without matching on transport details.

pub(crate) mod api;
mod ndjson;

use std::error::Error as StdError;
use std::fmt;

/// General categories of errors raised while talking to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// Failed to connect to the backend. This could be due to DNS
    /// resolution, connectivity issues, or routing problems.
    Connection,
    /// A request timed out.
    TimedOut,
    /// The requested resource was not found. This likely means the model
    /// requested by the user is not available on the backend.
    NotFound,
    /// The request was malformed or otherwise improper. Corresponds to
    /// HTTP status codes in the 400s.
    BadRequest,
    /// The backend encountered an error. Corresponds to HTTP status codes
    /// in the 500s.
    InternalError,
    /// A response was unable to be deserialized, was malformed, or
    /// otherwise violated the assumptions of the client.
    UnexpectedResponse,
    /// An error that does not fit into any of the other categories.
    UnspecifiedError,
}

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub(crate) fn from_kind(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }

    pub(crate) fn from_source(kind: ErrorKind, source: Box<dyn StdError + Send + Sync>) -> Error {
        Error {
            kind,
            source: Some(source),
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Connection => "failed to connect to the backend",
            ErrorKind::TimedOut => "request timed out",
            ErrorKind::NotFound => "the requested resource was not found",
            ErrorKind::BadRequest => "the request was bad or malformed",
            ErrorKind::InternalError => "the backend encountered an internal error",
            ErrorKind::UnexpectedResponse => "the backend response was unexpected or malformed",
            ErrorKind::UnspecifiedError => "an unspecified error occurred",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())?;

        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

fn classify_reqwest(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::TimedOut
    } else if err.is_connect() {
        ErrorKind::Connection
    } else if err.is_decode() {
        ErrorKind::UnexpectedResponse
    } else {
        ErrorKind::UnspecifiedError
    }
}

impl From<api::Error> for Error {
    fn from(value: api::Error) -> Self {
        let kind = match &value {
            api::Error::InvalidApiBase(_) | api::Error::InvalidEndpoint(_) => ErrorKind::Connection,
            api::Error::RequestFailed(err) => classify_reqwest(err),
            api::Error::NotFound(_) => ErrorKind::NotFound,
            api::Error::BadRequest(_) => ErrorKind::BadRequest,
            api::Error::InternalError(_) => ErrorKind::InternalError,
            api::Error::UnspecifiedError(_) => ErrorKind::UnspecifiedError,
            api::Error::Stream(err) => match err {
                ndjson::Error::StreamFailed(err) => classify_reqwest(err),
                _ => ErrorKind::UnexpectedResponse,
            },
        };

        Error::from_source(kind, Box::new(value))
    }
}
