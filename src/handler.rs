//! Handler trait and type erasure.
//!
//! The router holds handlers of *different* concrete types in one table, so
//! each handler is hidden behind a trait object. The chain from user code to
//! vtable call:
//!
//! ```text
//! async fn hello(req: Request) -> Result<Response, HttpError> { … }
//!        ↓ router.get("/", hello)
//! hello.into_boxed_handler()                  ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                  ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  at request time          ← one vtable dispatch
//! ```
//!
//! The per-request cost is one Arc clone plus one virtual call.
//!
//! Handlers are fallible: the error slot accepts anything convertible into
//! the crate [`Error`], and whatever a handler returns travels up to the
//! dispatcher's boundary untouched; handlers never write failure responses
//! themselves.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased handler future.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'static>>;

/// Object-safe dispatch interface.
///
/// `#[doc(hidden)] pub` instead of `pub(crate)`: it shows up in the return
/// type of `Handler::into_boxed_handler`, which is public.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler, cheaply shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Never implemented by hand: the blanket impl below satisfies it for any
/// `async fn` of the shape
///
/// ```text
/// async fn name(req: Request) -> Result<impl IntoResponse, impl Into<Error>>
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R, E> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<Error> + Send + 'static,
{
}

impl<F, Fut, R, E> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype bridging a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R, E> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.map(IntoResponse::into_response).map_err(Into::into) })
    }
}
