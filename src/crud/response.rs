//! Transport-neutral responses produced by the mock engine.

use axum::http::StatusCode;
use serde::Serialize;

/// Content type of every JSON body the engine produces.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const UNAUTHORIZED_BODY: &str = r#"{"error":{"message":"Unauthorized"}}"#;
const NOT_FOUND_BODY: &str = r#"{"error":{"message":"Not found"}}"#;

/// How a handled request is reported to the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Answered by the mock, including expected not-found answers.
    Mocked,
    /// Denied or failed while processing.
    Failed,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Mocked => "mocked",
            Classification::Failed => "failed",
        }
    }
}

/// The single log entry emitted for a handled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLog {
    pub lines: Vec<String>,
    pub classification: Classification,
}

impl RequestLog {
    pub fn mocked(lines: Vec<String>) -> Self {
        Self {
            lines,
            classification: Classification::Mocked,
        }
    }

    pub fn failed(lines: Vec<String>) -> Self {
        Self {
            lines,
            classification: Classification::Failed,
        }
    }
}

/// Response handed back to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub log: RequestLog,
}

impl ResponseDescriptor {
    /// A JSON response.
    pub fn json(status: StatusCode, body: impl Into<String>, log: RequestLog) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
            body: body.into(),
            log,
        }
    }

    /// A response with no body.
    pub fn empty(status: StatusCode, log: RequestLog) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
            log,
        }
    }

    /// The generic 401 answer; `reason` only reaches the log.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::json(
            StatusCode::UNAUTHORIZED,
            UNAUTHORIZED_BODY,
            RequestLog::failed(vec!["401 Unauthorized".to_string(), reason.into()]),
        )
    }

    /// The generic 404 answer for a query that resolved to nothing.
    pub fn not_found(url: &str) -> Self {
        Self::json(
            StatusCode::NOT_FOUND,
            NOT_FOUND_BODY,
            RequestLog::mocked(vec![status_line(StatusCode::NOT_FOUND, url)]),
        )
    }

    /// Allow any origin, for requests that carried an `Origin` header.
    pub fn with_cors(mut self) -> Self {
        self.headers
            .push(("access-control-allow-origin".to_string(), "*".to_string()));
        self
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// `"<code> <url>"`, the first log line of every CRUD answer.
pub fn status_line(status: StatusCode, url: &str) -> String {
    format!("{} {}", status.as_u16(), url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized() {
        let response = ResponseDescriptor::unauthorized("No token found on the request.");

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, r#"{"error":{"message":"Unauthorized"}}"#);
        assert_eq!(response.header("Content-Type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(response.log.classification, Classification::Failed);
        assert_eq!(response.log.lines[1], "No token found on the request.");
        assert!(!response.body.contains("token"));
    }

    #[test]
    fn test_not_found_is_mocked() {
        let response = ResponseDescriptor::not_found("/{id}");

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.log, RequestLog::mocked(vec!["404 /{id}".to_string()]));
    }

    #[test]
    fn test_cors() {
        let response = ResponseDescriptor::empty(StatusCode::NO_CONTENT, RequestLog::mocked(vec![]));
        assert!(response.header("access-control-allow-origin").is_none());

        let response = response.with_cors();
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }
}
