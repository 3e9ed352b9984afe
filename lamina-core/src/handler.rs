//! Handlers and middleware.
//!
//! A [`Handler`] is an async function over a mutable context. A
//! [`Middleware`] turns one handler into another: it receives the next
//! handler in the chain and returns a handler that runs code before and
//! after it.
//!
//! Middleware are applied so that the first one listed is the outermost:
//!
//! ```text
//! compose(handler, [m1, m2])  ==  m1(m2(handler))
//!
//! m1 in -> m2 in -> handler -> m2 out -> m1 out
//! ```

use crate::error::HandlerResult;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed, sendable future borrowing from the context.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type HandlerFn<C> = dyn for<'a> Fn(&'a mut C) -> BoxFuture<'a, HandlerResult> + Send + Sync;

type MiddlewareFn<C> = dyn Fn(Handler<C>) -> Handler<C> + Send + Sync;

/// Async handler over a context of type `C`.
///
/// # Example
///
/// ```rust
/// use lamina_core::Handler;
///
/// let handler = Handler::new(|count: &mut u32| {
///     Box::pin(async move {
///         *count += 1;
///         Ok(())
///     })
/// });
/// # let _ = handler;
/// ```
pub struct Handler<C> {
    inner: Arc<HandlerFn<C>>,
}

impl<C> Clone for Handler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Send + 'static> Handler<C> {
    /// Create a handler from an async function returning a boxed future.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Create a handler from a synchronous function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut C) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(move |ctx| {
            let result = f(ctx);
            Box::pin(std::future::ready(result))
        })
    }

    /// Run the handler.
    #[inline]
    pub fn call<'a>(&self, ctx: &'a mut C) -> BoxFuture<'a, HandlerResult> {
        (self.inner)(ctx)
    }

    /// Wrap this handler in `middleware`; the first element runs outermost.
    pub fn with_middleware<I>(self, middleware: I) -> Self
    where
        I: IntoIterator<Item = Middleware<C>>,
        I::IntoIter: DoubleEndedIterator,
    {
        compose(self, middleware)
    }
}

impl<C> std::fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// Handler decorator.
pub struct Middleware<C> {
    inner: Arc<MiddlewareFn<C>>,
}

impl<C> Clone for Middleware<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Send + 'static> Middleware<C> {
    /// Create middleware from a function that wraps the next handler.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Handler<C>) -> Handler<C> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Create middleware from an async function that receives the context
    /// and the next handler.
    ///
    /// ```rust
    /// use lamina_core::{Handler, Middleware};
    ///
    /// let double = Middleware::from_fn(|n: &mut u32, next: Handler<u32>| {
    ///     Box::pin(async move {
    ///         next.call(n).await?;
    ///         *n *= 2;
    ///         Ok(())
    ///     })
    /// });
    /// # let _ = double;
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, Handler<C>) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next| {
            let f = Arc::clone(&f);
            Handler::new(move |ctx| f(ctx, next.clone()))
        })
    }

    /// Apply this middleware to `next`.
    #[inline]
    pub fn wrap(&self, next: Handler<C>) -> Handler<C> {
        (self.inner)(next)
    }
}

impl<C> std::fmt::Debug for Middleware<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

/// Apply `middleware` to `handler` in reverse order, so the first element
/// ends up outermost.
pub fn compose<C, I>(handler: Handler<C>, middleware: I) -> Handler<C>
where
    C: Send + 'static,
    I: IntoIterator<Item = Middleware<C>>,
    I::IntoIter: DoubleEndedIterator,
{
    middleware
        .into_iter()
        .rev()
        .fold(handler, |next, layer| layer.wrap(next))
}
