//! Authorization requirements attached to APIs and routes.

/// What a request must present to be admitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Anyone is admitted.
    #[default]
    None,
    /// A valid bearer token is required.
    Token(TokenRequirement),
}

impl AuthRequirement {
    /// Whether this requirement admits anonymous requests.
    pub fn is_none(&self) -> bool {
        matches!(self, AuthRequirement::None)
    }
}

/// Bearer-token validation parameters.
///
/// `None` for `audience`/`issuer` leaves that claim unconstrained.
/// `roles` and `scopes` are OR-matched; roles take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequirement {
    pub audience: Option<String>,
    pub issuer: Option<String>,
    pub scopes: Vec<String>,
    pub roles: Vec<String>,
    pub validate_lifetime: bool,
    pub validate_signing_key: bool,
}

impl TokenRequirement {
    /// Require the given audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Require the given issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Require any one of `roles`.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Require any one of `scopes`.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Enable `exp`/`nbf` validation.
    pub fn validating_lifetime(mut self) -> Self {
        self.validate_lifetime = true;
        self
    }

    /// Enable signature validation.
    pub fn validating_signature(mut self) -> Self {
        self.validate_signing_key = true;
        self
    }
}
