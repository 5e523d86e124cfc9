//! Response writing.
//!
//! # Responsibilities
//! - Turn engine `ResponseDescriptor`s into HTTP responses
//!
//! # Design Decisions
//! - Headers that are not valid HTTP are dropped with a warning, never a panic

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::crud::ResponseDescriptor;

impl IntoResponse for ResponseDescriptor {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        for (name, value) in self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().append(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }

        response
    }
}
