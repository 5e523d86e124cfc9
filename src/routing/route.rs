//! Route definitions consumed by the matcher.

use crate::auth::AuthRequirement;
use crate::crud::ActionKind;

/// One configured CRUD route.
///
/// Immutable once loaded; a reload replaces the whole route list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    /// Operation performed when the route matches.
    pub action: ActionKind,

    /// HTTP method, compared case-sensitively.
    pub method: String,

    /// URL template relative to the API base URL, may contain `{name}`.
    pub url: String,

    /// Query-path expression, may contain `{name}`.
    pub query: String,

    /// Route-level authorization, evaluated after the API-level check.
    pub auth: AuthRequirement,
}

impl RouteDefinition {
    /// Create an unauthenticated route using the action's default method.
    pub fn new(action: ActionKind, url: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            action,
            method: action.default_method().to_string(),
            url: url.into(),
            query: query.into(),
            auth: AuthRequirement::None,
        }
    }

    /// Override the HTTP method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Attach a route-level authorization requirement.
    pub fn with_auth(mut self, auth: AuthRequirement) -> Self {
        self.auth = auth;
        self
    }
}
