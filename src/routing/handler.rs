//! Handler abstraction shared by route bindings and the authorizer.

use std::future::Future;
use std::pin::Pin;

use crate::http::{Context, Status};

/// Boxed future returned by [`Handler::call`].
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Async request callback. `None` means OK.
///
/// Implemented for every `Fn(Context) -> impl Future<Output = Option<Status>>`,
/// so plain async closures and `async fn`s can be registered directly.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: Context) -> BoxFuture<Option<Status>>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Status>> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture<Option<Status>> {
        Box::pin(self(ctx))
    }
}
