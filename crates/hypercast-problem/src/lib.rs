//! Problem Details for HTTP APIs ([RFC 7807]).
//!
//! The renderer falls back to `application/problem+json` whenever the
//! client accepts no other error format, so every renderer should carry
//! this mapper.
//!
//! ```
//! use hypercast::v1::{ApiError, Renderer, RequestContext, ResourceRegistry};
//! use hypercast_problem::ProblemJsonMapper;
//! use std::sync::Arc;
//!
//! let renderer = Renderer::builder(Arc::new(ResourceRegistry::new()))
//!     .with_error_mapper(ProblemJsonMapper)
//!     .build();
//! let error = ApiError::new("Resource not found", "not-found", 404)
//!     .with_description("no blog with id 7");
//!
//! let rendered = renderer.render_error(&error, &RequestContext::default()).unwrap();
//! assert_eq!(rendered.content_type, "application/problem+json");
//! let json = rendered.json().unwrap();
//! assert_eq!(json["status"], 404);
//! assert_eq!(json["detail"], "no blog with id 7");
//! ```
//!
//! [RFC 7807]: https://www.rfc-editor.org/rfc/rfc7807

use hypercast::v1::{ErrorMessageMapper, JsonObjectBuilder, PROBLEM_JSON};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProblemJsonMapper;

impl ErrorMessageMapper for ProblemJsonMapper {
    fn media_type(&self) -> &str {
        PROBLEM_JSON
    }

    fn map_description(&self, doc: &mut JsonObjectBuilder, description: &str) {
        doc.field("detail").value(description);
    }

    fn map_status_code(&self, doc: &mut JsonObjectBuilder, status_code: u16) {
        doc.field("status").value(status_code);
    }

    fn map_title(&self, doc: &mut JsonObjectBuilder, title: &str) {
        doc.field("title").value(title);
    }

    fn map_type(&self, doc: &mut JsonObjectBuilder, error_type: &str) {
        doc.field("type").value(error_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypercast::v1::{ApiError, Error, Renderer, RequestContext, ResourceRegistry};
    use serde_json::json;
    use std::sync::Arc;

    fn renderer() -> Renderer {
        Renderer::builder(Arc::new(ResourceRegistry::new()))
            .with_error_mapper(ProblemJsonMapper)
            .build()
    }

    #[test]
    fn test_problem_document() {
        let error = ApiError::new("Bad request", "bad-request", 400).with_description("page 0");
        let rendered = renderer().render_error(&error, &RequestContext::default()).unwrap();
        assert_eq!(
            rendered.json().unwrap(),
            json!({"title": "Bad request", "type": "bad-request", "status": 400, "detail": "page 0"})
        );
    }

    #[test]
    fn test_detail_is_omitted_without_description() {
        let error = ApiError::new("General server error", "server-error", 500);
        let json = renderer()
            .render_error(&error, &RequestContext::default())
            .unwrap()
            .json()
            .unwrap();
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_unknown_accept_falls_back_to_problem_json() {
        let ctx = RequestContext::default().with_accept_header("text/html, application/xml;q=0.9");
        let error = ApiError::new("Resource not found", "not-found", 404);
        let rendered = renderer().render_error(&error, &ctx).unwrap();
        assert_eq!(rendered.content_type, PROBLEM_JSON);
        assert_eq!(rendered.json().unwrap()["status"], 404);
    }

    #[test]
    fn test_developer_errors_hide_internals() {
        let err = Error::MustHaveProblemJsonMapper;
        let json = renderer()
            .render_failure(&err, &RequestContext::default())
            .unwrap()
            .json()
            .unwrap();
        assert_eq!(json["status"], 500);
        assert_eq!(json["type"], "server-error");
        assert!(json.get("detail").is_none());
    }
}
