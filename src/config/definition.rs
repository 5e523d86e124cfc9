//! Mock API definition files.
//!
//! An API definition is a JSON document naming the base URL, the data file
//! and the ordered list of actions:
//!
//! ```json
//! {
//!   "baseUrl": "https://api.contoso.com/v1/customers",
//!   "dataFile": "customers-data.json",
//!   "auth": "entra",
//!   "entraAuthConfig": { "audience": "api://contoso", "roles": ["Admin"] },
//!   "actions": [
//!     { "action": "getAll" },
//!     { "action": "getOne", "url": "/{customer-id}", "query": "$.[?(@.id == {customer_id})]" }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthRequirement, TokenRequirement};
use crate::crud::ActionKind;
use crate::pipeline::MockApi;
use crate::routing::RouteDefinition;
use crate::store::DocumentStore;

/// Authentication scheme named in a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuthKind {
    #[default]
    None,
    Entra,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthKind::None => f.write_str("none"),
            AuthKind::Entra => f.write_str("entra"),
        }
    }
}

impl FromStr for AuthKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            Ok(AuthKind::None)
        } else if s.eq_ignore_ascii_case("entra") {
            Ok(AuthKind::Entra)
        } else {
            Err(format!("unknown auth type '{}'", s))
        }
    }
}

impl TryFrom<String> for AuthKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AuthKind> for String {
    fn from(kind: AuthKind) -> Self {
        kind.to_string()
    }
}

/// Bearer token parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntraAuthConfig {
    /// Expected `aud`; empty means any.
    pub audience: String,
    /// Expected `iss`; empty means any.
    pub issuer: String,
    pub scopes: Vec<String>,
    pub roles: Vec<String>,
    pub validate_lifetime: bool,
    pub validate_signing_key: bool,
}

impl EntraAuthConfig {
    pub fn to_requirement(&self) -> TokenRequirement {
        let mut requirement = TokenRequirement::default()
            .with_roles(self.roles.iter().cloned())
            .with_scopes(self.scopes.iter().cloned());

        if !self.audience.is_empty() {
            requirement = requirement.with_audience(self.audience.clone());
        }
        if !self.issuer.is_empty() {
            requirement = requirement.with_issuer(self.issuer.clone());
        }
        if self.validate_lifetime {
            requirement = requirement.validating_lifetime();
        }
        if self.validate_signing_key {
            requirement = requirement.validating_signature();
        }

        requirement
    }
}

/// One entry of `actions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    pub action: ActionKind,
    #[serde(default)]
    pub url: String,
    /// Defaults per action kind when absent.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub auth: AuthKind,
    #[serde(default)]
    pub entra_auth_config: Option<EntraAuthConfig>,
}

impl ActionDefinition {
    pub fn to_route(&self) -> RouteDefinition {
        let method = match &self.method {
            Some(method) => method.to_ascii_uppercase(),
            None => self.action.default_method().to_string(),
        };
        let scope = format!("{} {}", method, self.url);
        let auth = auth_requirement(self.auth, self.entra_auth_config.as_ref(), &scope);

        RouteDefinition::new(self.action, self.url.clone(), self.query.clone())
            .with_method(method)
            .with_auth(auth)
    }
}

/// Contents of an API definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiDefinition {
    pub base_url: String,
    pub data_file: String,
    pub auth: AuthKind,
    pub entra_auth_config: Option<EntraAuthConfig>,
    pub actions: Vec<ActionDefinition>,
}

impl ApiDefinition {
    /// Data file location; relative paths resolve against the definition file.
    pub fn data_file_path(&self, api_file: &Path) -> PathBuf {
        let data_file = Path::new(&self.data_file);
        if data_file.is_absolute() {
            return data_file.to_path_buf();
        }
        api_file
            .parent()
            .map(|dir| dir.join(data_file))
            .unwrap_or_else(|| data_file.to_path_buf())
    }

    pub fn auth_requirement(&self) -> AuthRequirement {
        auth_requirement(self.auth, self.entra_auth_config.as_ref(), &self.base_url)
    }

    pub fn routes(&self) -> Vec<RouteDefinition> {
        self.actions.iter().map(ActionDefinition::to_route).collect()
    }

    /// Assemble the servable API over `store`.
    pub fn into_api(self, store: DocumentStore) -> MockApi {
        let auth = self.auth_requirement();
        let routes = self.routes();
        MockApi::new(self.base_url, auth, routes, store)
    }
}

/// Token auth without parameters cannot be evaluated; serve anonymously instead.
fn auth_requirement(kind: AuthKind, config: Option<&EntraAuthConfig>, scope: &str) -> AuthRequirement {
    match (kind, config) {
        (AuthKind::None, _) => AuthRequirement::None,
        (AuthKind::Entra, Some(config)) => AuthRequirement::Token(config.to_requirement()),
        (AuthKind::Entra, None) => {
            tracing::warn!(
                scope = %scope,
                "Entra auth is enabled but no configuration is provided. Serving anonymously"
            );
            AuthRequirement::None
        }
    }
}
