//! The error-to-response boundary.
//!
//! Exactly one place turns errors into bytes on the wire: the dispatcher
//! catches whatever escapes the middleware chain or the matched handler and
//! hands it here, once per request. Everything below the dispatcher only
//! returns typed errors.
//!
//! Classified client errors (4xx) are already safe to echo, so the caller
//! gets the full serialized detail. Everything else (classified 5xx, transport
//! faults, chain misuse, unrecognized failures) is opaque by
//! design: the raw error goes to the server-side log, a generic body goes to
//! the caller.

use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::error::Error;
use crate::response::Response;

const OPAQUE_BODY: &[u8] = br#"{"message":"Internal Server Error"}"#;

/// Translates any request-terminating error into a response.
///
/// Never fails; if a body cannot be serialized the generic body stands in.
/// Writing the response to the wire is the caller's concern.
pub(crate) fn translate(error: &Error) -> Response {
    // The raw error always lands in the log, whatever crosses the wire.
    error!(%error, "request failed");

    match error {
        Error::Http(http_error) if (400..=499).contains(&http_error.status_code()) => {
            let body = serde_json::to_vec(http_error).unwrap_or_else(|_| OPAQUE_BODY.to_vec());
            Response::builder().status(client_status(http_error.status_code())).json(body)
        }
        Error::Http(http_error) => {
            let body = serde_json::to_vec(&json!({ "message": http_error.message() }))
                .unwrap_or_else(|_| OPAQUE_BODY.to_vec());
            Response::builder().status(server_status(http_error.status_code())).json(body)
        }
        _ => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .json(OPAQUE_BODY.to_vec()),
    }
}

fn client_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// A classified server error keeps its own status; anything outside the
/// server range collapses to 500.
fn server_status(code: u16) -> StatusCode {
    if (500..=599).contains(&code) {
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
