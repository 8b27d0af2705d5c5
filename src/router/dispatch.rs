//! The router: registration plus per-request dispatch.

use std::future::Future;
use std::path::PathBuf;

use log::{debug, error, warn};

use crate::parser::{HttpRequest, Method};
use crate::router::body::decode_body;
use crate::router::handler::{Handler, RequestContext};
use crate::router::query::parse_query;
use crate::router::table::RouteTable;
use crate::router::target::split_target;
use crate::server::{Error, HttpResponse};

/// Routes requests to handlers by exact method and path.
///
/// Routes are registered during startup through `&mut self`; once the router
/// is shared (for example inside an `Arc` by [`HttpServer`](crate::HttpServer))
/// it is read-only and safe to dispatch from many tasks at once.
#[derive(Debug, Default, Clone)]
pub struct Router {
    table: RouteTable,
    base_path: String,
}

impl Router {
    /// Create a router without a base path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a router that strips `base_path` from every request target.
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            table: RouteTable::new(),
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Register `handler` for `(method, path)`, replacing any earlier registration.
    pub fn register(&mut self, method: Method, path: &str, handler: Handler) -> &mut Self {
        self.table.register(method, path, handler);
        self
    }

    /// Register an async function for `(method, path)`.
    pub fn route<F, Fut>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.register(method, path, Handler::from_fn(handler))
    }

    /// Register an executable for `(method, path)`.
    pub fn script(&mut self, method: Method, path: &str, file: impl Into<PathBuf>) -> &mut Self {
        self.register(method, path, Handler::script(file))
    }

    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub fn put<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.route(Method::PUT, path, handler)
    }

    pub fn delete<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    pub fn patch<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.route(Method::PATCH, path, handler)
    }

    pub fn head<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.route(Method::HEAD, path, handler)
    }

    pub fn options<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.route(Method::OPTIONS, path, handler)
    }

    /// Find the handler for `(method, path)`.
    pub fn lookup(&self, method: Method, path: &str) -> Option<&Handler> {
        self.table.lookup(method, path)
    }

    /// Resolve a request to its handler and build the context it will be called with.
    ///
    /// The body is only decoded once a route has matched.
    pub fn resolve(&self, request: &HttpRequest) -> Result<(&Handler, RequestContext), Error> {
        let (path, query) = split_target(&request.target, &self.base_path);

        let handler = self
            .table
            .lookup(request.method, &path)
            .ok_or_else(|| Error::RouteNotFound {
                method: request.method,
                path: path.clone(),
            })?;

        let params = query.as_deref().map(parse_query).unwrap_or_default();
        let body = decode_body(request.content_type(), &request.body);

        Ok((
            handler,
            RequestContext {
                method: request.method,
                path,
                params,
                body,
            },
        ))
    }

    /// Dispatch one request.
    ///
    /// Exactly one handler call or one 404 happens per request. Errors never
    /// escape: a miss becomes a 404 and a failing handler becomes the response
    /// for its error.
    pub async fn dispatch(&self, request: &HttpRequest) -> HttpResponse {
        let (handler, ctx) = match self.resolve(request) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("{e}");
                return e.to_response();
            }
        };

        debug!("Dispatching {} {} with {} query params", ctx.method, ctx.path, ctx.params.len());
        let (method, path) = (ctx.method, ctx.path.clone());

        match handler.invoke(ctx).await {
            Ok(response) => response,
            Err(e) => {
                error!("Handler for {method} {path} failed: {e}");
                e.to_response()
            }
        }
    }
}
