//! Route handlers and the per-request context they receive.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::Method;
use crate::router::body::DecodedBody;
use crate::router::script;
use crate::server::{Error, HttpResponse};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Type alias for a handler function that takes a RequestContext and returns a HandlerFuture.
pub type HandlerFn = Arc<dyn Fn(RequestContext) -> HandlerFuture + Send + Sync>;

/// Everything a handler learns about one request.
///
/// Built fresh for every dispatch and moved into the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// The request method.
    pub method: Method,
    /// The matched route path, after base-path stripping and normalization.
    pub path: String,
    /// Query parameters; the last occurrence of a key wins.
    pub params: HashMap<String, String>,
    /// The body decoded according to its content type.
    pub body: DecodedBody,
}

impl RequestContext {
    /// Get a query parameter value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// What a route resolves to.
#[derive(Clone)]
pub enum Handler {
    /// An async function called with the request context.
    Invocable(HandlerFn),
    /// An executable run once per request, CGI style.
    ///
    /// The query parameters and decoded body are passed as JSON in the
    /// `ROUTE_PARAMS` and `ROUTE_BODY` environment variables, next to
    /// `ROUTE_METHOD` and `ROUTE_PATH`. Standard output becomes the body of a
    /// 200 response.
    Script(PathBuf),
}

impl Handler {
    /// Wrap an async function as a handler.
    pub fn from_fn<F, Fut>(handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        Handler::Invocable(Arc::new(move |ctx: RequestContext| -> HandlerFuture {
            Box::pin(handler(ctx))
        }))
    }

    /// A handler that runs the executable at `path`.
    pub fn script(path: impl Into<PathBuf>) -> Self {
        Handler::Script(path.into())
    }

    /// Run the handler to completion.
    pub async fn invoke(&self, ctx: RequestContext) -> Result<HttpResponse, Error> {
        match self {
            Handler::Invocable(handler) => handler(ctx).await,
            Handler::Script(path) => script::run(path, &ctx).await,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Invocable(_) => f.write_str("Invocable(..)"),
            Handler::Script(path) => f.debug_tuple("Script").field(path).finish(),
        }
    }
}
