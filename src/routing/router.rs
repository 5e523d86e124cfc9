//! Ordered route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Find the first route whose method and URL match
//! - Return the route with its extracted parameters, or no match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins; no specificity ranking
//! - A route whose template fails to compile is skipped with a warning

use std::collections::HashMap;

use crate::routing::matcher::TemplateMatcher;
use crate::routing::route::RouteDefinition;

/// A route matched against a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'a> {
    /// The matched definition.
    pub route: &'a RouteDefinition,
    /// Parameter values keyed by normalized (`_`) name.
    pub params: HashMap<String, String>,
}

#[derive(Debug)]
struct CompiledRoute {
    definition: RouteDefinition,
    matcher: TemplateMatcher,
}

/// Route table for one API.
#[derive(Debug, Default)]
pub struct RouteMatcher {
    routes: Vec<CompiledRoute>,
}

impl RouteMatcher {
    /// Compile `routes` against `base_url`, preserving their order.
    pub fn new(base_url: &str, routes: Vec<RouteDefinition>) -> Self {
        let mut compiled = Vec::with_capacity(routes.len());
        for definition in routes {
            match TemplateMatcher::compile(base_url, &definition.url) {
                Ok(matcher) => compiled.push(CompiledRoute { definition, matcher }),
                Err(e) => {
                    tracing::warn!(
                        url = %definition.url,
                        method = %definition.method,
                        error = %e,
                        "Skipping route with invalid URL template"
                    );
                }
            }
        }

        Self { routes: compiled }
    }

    /// Find the first route matching `method` and `url`.
    pub fn match_request(&self, method: &str, url: &str) -> Option<MatchResult<'_>> {
        self.routes
            .iter()
            .filter(|route| route.definition.method == method)
            .find_map(|route| {
                route.matcher.matches(url).map(|params| MatchResult {
                    route: &route.definition,
                    params,
                })
            })
    }

    /// Number of usable routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no usable routes are configured.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Absolute templates, in lookup order.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.matcher.template())
    }
}
