//! Middleware layer.
//!
//! A middleware [`Step`] sits between the transport and the matched handler.
//! Each step receives the request and a [`Next`] continuation and chooses to:
//!
//! - **proceed** — `next.run(req).await`, resuming the chain and getting the
//!   downstream response back;
//! - **short-circuit** — return its own response without touching `next`
//!   (nothing downstream runs);
//! - **fail** — return an error, which travels straight to the dispatcher's
//!   error boundary.
//!
//! A [`Chain`] drives the steps as an explicit state machine: a step list
//! plus a cursor recording the deepest position entered. The cursor is fresh
//! per [`Chain::run`] call, so one chain value serves any number of
//! concurrent requests. Advancing past a position is permanent for that
//! request; a step that invokes its continuation twice gets
//! [`Error::InvalidContinuation`] instead of running anything downstream a
//! second time.
//!
//! Built-in steps: [`BodyReader`] and [`Trace`].
//!
//! ```
//! use tsuji::middleware::{Next, Step, StepFuture};
//! use tsuji::{Request, Response, StatusCode};
//!
//! /// Rejects requests that declare a non-JSON payload.
//! struct RequireJson;
//!
//! impl Step for RequireJson {
//!     fn call<'a>(&'a self, req: Request, next: Next<'a>) -> StepFuture<'a> {
//!         Box::pin(async move {
//!             let json = req
//!                 .header("content-type")
//!                 .map_or(true, |value| value.starts_with("application/json"));
//!             if json {
//!                 next.run(req).await
//!             } else {
//!                 Ok(Response::status(StatusCode::UNSUPPORTED_MEDIA_TYPE))
//!             }
//!         })
//!     }
//! }
//! ```

mod body;
mod trace;

pub use body::BodyReader;
pub use trace::Trace;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::Error;
use crate::handler::{BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;

/// A heap-allocated step future, borrowing the in-flight chain state.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'a>>;

/// A chain-participating middleware step.
pub trait Step: Send + Sync + 'static {
    fn call<'a>(&'a self, req: Request, next: Next<'a>) -> StepFuture<'a>;
}

pub(crate) type BoxedStep = Arc<dyn Step>;

/// An ordered list of middleware steps ending in a terminal handler.
pub struct Chain {
    steps: Vec<BoxedStep>,
}

impl Chain {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step. Steps run in push order.
    pub fn push(&mut self, step: impl Step) {
        self.steps.push(Arc::new(step));
    }

    /// Runs `req` through every step in order, ending in `terminal`.
    ///
    /// Resolves once the whole chain (terminal included) has completed, or as
    /// soon as a step short-circuits or fails. Every invocation gets its own
    /// cursor.
    pub async fn run(&self, req: Request, terminal: BoxedHandler) -> Result<Response, Error> {
        let state = ChainState {
            steps: &self.steps,
            terminal,
            entered: AtomicI64::new(-1),
        };
        Next { state: &state, position: 0 }.run(req).await
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-invocation chain state: the step list and the cursor.
struct ChainState<'c> {
    steps: &'c [BoxedStep],
    terminal: BoxedHandler,
    /// Deepest chain position entered; -1 before the first step.
    entered: AtomicI64,
}

/// The continuation handed to each step.
pub struct Next<'c> {
    state: &'c ChainState<'c>,
    position: usize,
}

impl<'c> Next<'c> {
    /// Resumes the chain: runs the step at this continuation's position, or
    /// the terminal handler once the cursor has passed the last step.
    ///
    /// Valid at most once per step invocation. Invoking a continuation the
    /// cursor has already passed is a defect in the calling step and fails
    /// the request instead of running anything twice.
    pub fn run(&self, req: Request) -> StepFuture<'c> {
        let state = self.state;
        let position = self.position;
        Box::pin(async move {
            // One request's chain executes sequentially; the atomic exists
            // because the future may migrate threads across awaits.
            if position as i64 <= state.entered.load(Ordering::Acquire) {
                return Err(Error::InvalidContinuation { position });
            }
            state.entered.store(position as i64, Ordering::Release);

            match state.steps.get(position) {
                Some(step) => step.call(req, Next { state, position: position + 1 }).await,
                None => state.terminal.call(req).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use http::Method;

    use crate::error::HttpError;
    use crate::handler::Handler;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    /// Appends its name to the log, then proceeds.
    struct Mark {
        name: &'static str,
        log: Log,
    }

    impl Step for Mark {
        fn call<'a>(&'a self, req: Request, next: Next<'a>) -> StepFuture<'a> {
            Box::pin(async move {
                self.log.lock().unwrap().push(self.name);
                next.run(req).await
            })
        }
    }

    /// Answers directly without proceeding.
    struct Halt;

    impl Step for Halt {
        fn call<'a>(&'a self, _req: Request, _next: Next<'a>) -> StepFuture<'a> {
            Box::pin(async move { Ok(Response::text("halted")) })
        }
    }

    /// Misuses the continuation: proceeds, then proceeds again.
    struct RunTwice;

    impl Step for RunTwice {
        fn call<'a>(&'a self, req: Request, next: Next<'a>) -> StepFuture<'a> {
            Box::pin(async move {
                next.run(req).await?;
                next.run(Request::test(Method::GET, "/again")).await
            })
        }
    }

    fn terminal(log: &Log) -> BoxedHandler {
        let log = Arc::clone(log);
        (move |_req: Request| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push("terminal");
                Ok::<_, HttpError>(Response::text("done"))
            }
        })
        .into_boxed_handler()
    }

    #[tokio::test]
    async fn steps_run_in_order_before_the_terminal() {
        let log = Log::default();
        let mut chain = Chain::new();
        chain.push(Mark { name: "a", log: Arc::clone(&log) });
        chain.push(Mark { name: "b", log: Arc::clone(&log) });

        let response = chain
            .run(Request::test(Method::GET, "/"), terminal(&log))
            .await
            .unwrap();

        assert_eq!(response.body(), b"done");
        assert_eq!(*log.lock().unwrap(), ["a", "b", "terminal"]);
    }

    #[tokio::test]
    async fn an_empty_chain_goes_straight_to_the_terminal() {
        let log = Log::default();
        let chain = Chain::new();
        let response = chain
            .run(Request::test(Method::GET, "/"), terminal(&log))
            .await
            .unwrap();
        assert_eq!(response.body(), b"done");
        assert_eq!(*log.lock().unwrap(), ["terminal"]);
    }

    #[tokio::test]
    async fn a_step_that_never_proceeds_short_circuits() {
        let log = Log::default();
        let mut chain = Chain::new();
        chain.push(Mark { name: "a", log: Arc::clone(&log) });
        chain.push(Halt);
        chain.push(Mark { name: "b", log: Arc::clone(&log) });

        let response = chain
            .run(Request::test(Method::GET, "/"), terminal(&log))
            .await
            .unwrap();

        assert_eq!(response.body(), b"halted");
        assert_eq!(*log.lock().unwrap(), ["a"]);
    }

    #[tokio::test]
    async fn proceeding_twice_surfaces_as_an_error() {
        let log = Log::default();
        let mut chain = Chain::new();
        chain.push(RunTwice);

        let err = chain
            .run(Request::test(Method::GET, "/"), terminal(&log))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidContinuation { position: 1 }));
        // The terminal ran once, not twice.
        assert_eq!(*log.lock().unwrap(), ["terminal"]);
    }

    #[tokio::test]
    async fn concurrent_runs_get_independent_cursors() {
        let log = Log::default();
        let mut chain = Chain::new();
        chain.push(Mark { name: "a", log: Arc::clone(&log) });

        let (left, right) = tokio::join!(
            chain.run(Request::test(Method::GET, "/"), terminal(&log)),
            chain.run(Request::test(Method::GET, "/"), terminal(&log)),
        );

        assert!(left.is_ok());
        assert!(right.is_ok());
    }
}
