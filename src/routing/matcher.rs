//! URL template matching.
//!
//! # Responsibilities
//! - Join the API base URL and a route URL into an absolute template
//! - Compile `{name}` placeholders into named capture groups
//! - Match a request URL and extract parameters
//!
//! # Design Decisions
//! - Templates without placeholders are compared as plain strings
//! - Literal text is regex-escaped; placeholders match `[^/&]+`
//! - Full-string match, never a prefix match
//! - Compiled once per load, never per request

use std::collections::HashMap;

use regex::Regex;

use crate::store::query::normalize_param_name;

/// Join a base URL and a route URL the same way for matching and ownership checks.
pub fn absolute_template(base_url: &str, route_url: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route_url.trim_start_matches('/')
    )
    .trim_end_matches('/')
    .to_string()
}

/// A route URL template ready for matching.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    template: String,
    pattern: Option<Regex>,
}

impl TemplateMatcher {
    /// Compile the template formed by `base_url` and `route_url`.
    pub fn compile(base_url: &str, route_url: &str) -> Result<Self, regex::Error> {
        let template = absolute_template(base_url, route_url);
        let pattern = if template.contains('{') {
            Some(Regex::new(&template_to_pattern(&template))?)
        } else {
            None
        };

        Ok(Self { template, pattern })
    }

    /// The absolute template this matcher was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Match `url`, returning the extracted parameters on success.
    pub fn matches(&self, url: &str) -> Option<HashMap<String, String>> {
        let Some(pattern) = &self.pattern else {
            return (url == self.template).then(HashMap::new);
        };

        let captures = pattern.captures(url)?;
        let params = pattern
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();
        Some(params)
    }
}

/// Escape literal text and turn each `{name}` into a named group.
fn template_to_pattern(template: &str) -> String {
    let mut pattern = String::with_capacity(template.len() * 2);
    pattern.push('^');

    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        pattern.push_str(&regex::escape(&rest[..open]));
        let name = normalize_param_name(&rest[open + 1..close]);
        pattern.push_str(&format!("(?P<{}>[^/&]+)", name));
        rest = &rest[close + 1..];
    }
    pattern.push_str(&regex::escape(rest));

    pattern.push('$');
    pattern
}
