//! A loaded mock API: base URL, routes, API-wide auth and dataset.

use crate::auth::AuthRequirement;
use crate::routing::{MatchResult, RouteDefinition, RouteMatcher};
use crate::store::DocumentStore;

/// One mock API as served by the engine.
#[derive(Debug)]
pub struct MockApi {
    base_url: String,
    auth: AuthRequirement,
    routes: RouteMatcher,
    store: DocumentStore,
}

impl MockApi {
    /// Build an API from its definition and dataset.
    pub fn new(
        base_url: impl Into<String>,
        auth: AuthRequirement,
        routes: Vec<RouteDefinition>,
        store: DocumentStore,
    ) -> Self {
        let base_url = base_url.into();
        let routes = RouteMatcher::new(&base_url, routes);
        Self {
            base_url,
            auth,
            routes,
            store,
        }
    }

    /// An API that owns no requests, used when its dataset could not be loaded.
    pub fn disabled(base_url: impl Into<String>) -> Self {
        Self::new(base_url, AuthRequirement::None, Vec::new(), DocumentStore::empty())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthRequirement {
        &self.auth
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn routes(&self) -> &RouteMatcher {
        &self.routes
    }

    /// Whether serving is enabled (at least one usable route).
    pub fn is_enabled(&self) -> bool {
        !self.routes.is_empty()
    }

    /// Whether `url` falls under this API's base URL.
    pub fn owns(&self, url: &str) -> bool {
        self.is_enabled() && url.starts_with(self.base_url.trim_end_matches('/'))
    }

    pub fn match_request(&self, method: &str, url: &str) -> Option<MatchResult<'_>> {
        self.routes.match_request(method, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::ActionKind;
    use serde_json::json;

    fn api(base_url: &str) -> MockApi {
        MockApi::new(
            base_url,
            AuthRequirement::None,
            vec![RouteDefinition::new(ActionKind::GetAll, "", "$")],
            DocumentStore::new(json!([])).unwrap(),
        )
    }

    #[test]
    fn test_owns_by_prefix() {
        let api = api("https://api.contoso.com/v1/customers/");

        assert!(api.owns("https://api.contoso.com/v1/customers"));
        assert!(api.owns("https://api.contoso.com/v1/customers/42"));
        assert!(!api.owns("https://api.contoso.com/v1/orders"));
    }

    #[test]
    fn test_disabled_owns_nothing() {
        let api = MockApi::disabled("/api");

        assert!(!api.is_enabled());
        assert!(!api.owns("/api/customers"));
    }
}
