//! Error taxonomy.
//!
//! Two layers. [`HttpError`] is the classified kind: a status code in the
//! 400–599 range, a stable kind tag, a message, and a structured context
//! payload. Domain and middleware code constructs one, returns it from a
//! handler or step, and the error boundary consumes it exactly once.
//!
//! [`Error`] is the crate-wide sum of everything that can end a request:
//! classified failures, transport faults while reading the body, socket-level
//! io, and middleware misusing the chain continuation. Anything that is not a
//! classified 4xx renders opaque at the boundary; only a generic message
//! crosses the wire.

use serde::Serialize;
use serde_json::Value;

/// A classified HTTP failure.
///
/// Serializes to the wire shape the error boundary echoes back for client
/// errors:
///
/// ```
/// use serde_json::json;
/// use tsuji::HttpError;
///
/// let err = HttpError::not_found("User not found").with_context(json!({"id": "42"}));
/// assert_eq!(err.status_code(), 404);
/// assert_eq!(
///     serde_json::to_value(&err).unwrap(),
///     json!({
///         "name": "NotFoundException",
///         "statusCode": 404,
///         "message": "User not found",
///         "context": {"id": "42"},
///     }),
/// );
/// ```
#[derive(Clone, Debug, Serialize, thiserror::Error)]
#[error("{kind} ({status_code}): {message}")]
pub struct HttpError {
    #[serde(rename = "name")]
    kind: String,
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: String,
    context: Value,
}

impl HttpError {
    /// A classified error with an empty context. `status_code` must be in
    /// the 400–599 range.
    pub fn new(status_code: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        debug_assert!(
            (400..=599).contains(&status_code),
            "HttpError status must be an error status"
        );
        Self {
            kind: kind.into(),
            status_code,
            message: message.into(),
            context: Value::Object(serde_json::Map::new()),
        }
    }

    /// `400 BadRequestException`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "BadRequestException", message)
    }

    /// `404 NotFoundException`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "NotFoundException", message)
    }

    /// Attaches a structured context payload. Client-range errors echo the
    /// context back to the caller verbatim.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &Value {
        &self.context
    }
}

/// Everything that can terminate a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A classified failure from a handler or middleware step.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The transport failed while delivering the request.
    #[error("transport: {0}")]
    Transport(#[from] hyper::Error),

    /// A middleware step invoked a chain continuation the cursor had already
    /// passed. A programming defect in that step, fatal for the request.
    #[error("chain continuation for position {position} invoked after the cursor passed it")]
    InvalidContinuation { position: usize },

    /// Binding or accepting on the listen socket failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
