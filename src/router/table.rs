//! Route storage keyed by path, then method.

use std::collections::HashMap;

use log::debug;

use crate::parser::Method;
use crate::router::handler::Handler;
use crate::router::target::normalize_path;

/// Maps `(method, path)` to a handler by exact path match.
///
/// Paths are normalized on the way in and on lookup, so `/users/` and `/users` are the same route.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: HashMap<String, HashMap<Method, Handler>>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handler` under `(method, path)`.
    ///
    /// # Returns
    ///
    /// The handler previously registered for the same pair, which is replaced
    pub fn register(&mut self, method: Method, path: &str, handler: Handler) -> Option<Handler> {
        let path = normalize_path(path);
        let previous = self
            .routes
            .entry(path.clone())
            .or_default()
            .insert(method, handler);

        if previous.is_some() {
            debug!("Replaced handler for {method} {path}");
        }
        previous
    }

    /// Find the handler for `(method, path)`.
    pub fn lookup(&self, method: Method, path: &str) -> Option<&Handler> {
        self.routes
            .get(normalize_path(path).as_str())
            .and_then(|methods| methods.get(&method))
    }

    /// Number of registered `(method, path)` pairs.
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered pairs, sorted by path then method.
    pub fn routes(&self) -> Vec<(Method, &str)> {
        let mut routes: Vec<(Method, &str)> = self
            .routes
            .iter()
            .flat_map(|(path, methods)| methods.keys().map(move |method| (*method, path.as_str())))
            .collect();
        routes.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)));
        routes
    }
}
