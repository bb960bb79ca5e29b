//! Request tracing middleware.

use std::time::Instant;

use tracing::info;

use super::{Next, Step, StepFuture};
use crate::request::Request;

/// Logs one line per request: method, path, status, latency.
///
/// Push it first so the latency covers the whole chain. Failures are logged
/// by the error boundary; this step only reports responses that made it out.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Trace {
    pub fn new() -> Self {
        Self
    }
}

impl Step for Trace {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> StepFuture<'a> {
        Box::pin(async move {
            let method = req.method().clone();
            let path = req.path().to_owned();
            let start = Instant::now();

            let result = next.run(req).await;

            if let Ok(response) = &result {
                info!(
                    %method,
                    path = %path,
                    status = response.status_code().as_u16(),
                    elapsed = ?start.elapsed(),
                    "request",
                );
            }
            result
        })
    }
}
