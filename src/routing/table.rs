//! Route table: ordered templates with per-method bindings.
//!
//! # Responsibilities
//! - Compile each distinct template once and keep it in registration order
//! - Hold one binding per method on each route
//! - Find the route for a request path
//!
//! # Design Decisions
//! - Append-only; built before serving starts
//! - First match wins. Registration order is routing precedence, even when
//!   a later template would be a more specific match
//! - Re-registering a method on a template replaces its binding

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::handler::Handler;
use crate::routing::pattern::{PathPattern, RouteError};

/// Named path variables extracted from a request path.
pub type Params = HashMap<String, String>;

/// One method's handler on a route.
#[derive(Clone)]
pub struct Binding {
    handler: Arc<dyn Handler>,
    public: bool,
}

impl Binding {
    fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            public: false,
        }
    }

    /// Exempt this binding from the authorization gate.
    pub fn mark_public(&mut self) -> &mut Self {
        self.public = true;
        self
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub(crate) fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// A distinct template and its bindings.
#[derive(Debug)]
pub struct Route {
    pattern: PathPattern,
    bindings: Vec<(Method, Binding)>,
}

impl Route {
    fn new(pattern: PathPattern) -> Self {
        Self {
            pattern,
            bindings: Vec::new(),
        }
    }

    fn bind(&mut self, method: Method, handler: Arc<dyn Handler>) -> &mut Binding {
        let binding = Binding::new(handler);
        let index = match self.bindings.iter().position(|(m, _)| *m == method) {
            Some(index) => {
                self.bindings[index].1 = binding;
                index
            }
            None => {
                self.bindings.push((method, binding));
                self.bindings.len() - 1
            }
        };
        &mut self.bindings[index].1
    }

    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn binding(&self, method: &Method) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, binding)| binding)
    }

    /// Bound methods in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.bindings.iter().map(|(method, _)| method)
    }

    /// Value of the `Allow` header: bound methods followed by `OPTIONS`.
    pub fn allow(&self) -> String {
        let mut methods: Vec<&str> = self
            .methods()
            .filter(|m| **m != Method::OPTIONS)
            .map(Method::as_str)
            .collect();
        methods.push(Method::OPTIONS.as_str());
        methods.join(", ")
    }

    /// Path variables of `path`, empty if it does not match this route.
    ///
    /// Values are percent-decoded; values that do not decode to UTF-8 are
    /// kept as sent.
    pub fn params(&self, path: &str) -> Params {
        let Some(values) = self.pattern.captures(path) else {
            return Params::new();
        };

        self.pattern
            .variables()
            .zip(values)
            .map(|(name, value)| {
                let value = urlencoding::decode(value)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| value.to_string());
                (name.to_string(), value)
            })
            .collect()
    }
}

/// Ordered collection of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `method` on `template`.
    ///
    /// A new template is compiled and appended; a known one gets its binding
    /// for `method` added or replaced.
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<&mut Binding, RouteError> {
        let index = match self.routes.iter().position(|r| r.template() == template) {
            Some(index) => index,
            None => {
                let pattern = PathPattern::compile(template)?;
                self.routes.push(Route::new(pattern));
                self.routes.len() - 1
            }
        };

        tracing::debug!(method = %method, template = %template, "Route registered");
        Ok(self.routes[index].bind(method, handler))
    }

    /// First route, in registration order, whose template matches `path`.
    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.pattern.matches(path))
    }

    /// Path variables of `path` under its matching route.
    pub fn params(&self, path: &str) -> Params {
        self.find(path)
            .map(|route| route.params(path))
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
