//! Built-in health-check handlers.
//!
//! Orchestrators ask two questions: is the process alive (`/healthz`;
//! failure means restart) and can it serve traffic (`/readyz`; failure means
//! pulled from the load-balancer). Register the answers as exact routes:
//!
//! ```rust,no_run
//! use tsuji::{Router, health};
//!
//! let table = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Override `readiness` with your own handler to gate on dependency
//! availability (database connections, downstream services).

use crate::error::HttpError;
use crate::request::Request;
use crate::response::Response;

/// Liveness probe handler.
///
/// Always `200 OK` with body `"ok"`. If the process can respond to HTTP at
/// all, it is alive. Intentionally has no dependencies.
pub async fn liveness(_req: Request) -> Result<Response, HttpError> {
    Ok(Response::text("ok"))
}

/// Readiness probe handler (default implementation).
///
/// Always `200 OK` with body `"ready"`. Replace it if your application needs
/// a warm-up period or must verify dependency health first.
pub async fn readiness(_req: Request) -> Result<Response, HttpError> {
    Ok(Response::text("ready"))
}
