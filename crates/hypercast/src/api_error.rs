use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

/// Format-independent error record rendered through an error mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub error_type: String,
    pub status_code: u16,
}

impl ApiError {
    pub fn new(title: impl Into<String>, error_type: impl Into<String>, status_code: u16) -> Self {
        Self {
            title: title.into(),
            description: None,
            error_type: error_type.into(),
            status_code,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Client-caused errors keep their message as the description. Server-side
/// failures get a generic record so internals never reach the response.
impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        match err.kind() {
            ErrorKind::Client => {
                ApiError::new("Bad request", "bad-request", 400).with_description(err.to_string())
            }
            ErrorKind::NotFound => ApiError::new("Resource not found", "not-found", 404)
                .with_description(err.to_string()),
            ErrorKind::Developer | ErrorKind::Upstream => {
                ApiError::new("General server error", "server-error", err.status_code())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_conversion_keeps_message() {
        let err = Error::BadRequest("foo should be name:id".into());
        let api = ApiError::from(&err);
        assert_eq!(api.status_code, 400);
        assert_eq!(api.error_type, "bad-request");
        assert_eq!(
            api.description.as_deref(),
            Some("Bad request: foo should be name:id")
        );
    }

    #[test]
    fn test_not_found_conversion() {
        let api = ApiError::from(&Error::NotFound("no resource named nope".into()));
        assert_eq!(api.status_code, 404);
        assert_eq!(api.title, "Resource not found");
    }

    #[test]
    fn test_server_error_conversion_hides_details() {
        let err = Error::MustHaveProblemJsonMapper;
        let api = ApiError::from(&err);
        assert_eq!(api.status_code, 500);
        assert_eq!(api.description, None);

        let err = Error::accessor(std::io::Error::other("db password rejected"));
        let api = ApiError::from(&err);
        assert_eq!(api.status_code, 500);
        assert!(api.description.is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let api = ApiError::new("Gone", "gone", 410);
        let json = serde_json::to_string(&api).unwrap();
        assert_eq!(json, r#"{"title":"Gone","type":"gone","status_code":410}"#);
    }
}
