//! Error surface of the router
//!
//! Two families:
//! - [`RouterError`] is what `render`/`navigate` hand back to the mounting
//!   collaborator. Every variant carries a numeric status and a message so a
//!   fallback view can be shown without inspecting the variant.
//! - [`LinkError`] reports a broken named-route reference (unknown name,
//!   wrong parameters). It is a programmer error and is never produced by
//!   URL resolution.

use serde::{Deserialize, Serialize};

/// Status/message pair set by a `before_load` hook or recorded as pending error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

impl ErrorPayload {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// A bare status code is a payload whose message comes from configuration
impl From<u16> for ErrorPayload {
    fn from(status: u16) -> Self {
        Self {
            status,
            message: String::new(),
        }
    }
}

/// Failure to build a path for a named route
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("cannot find a route by the unique name of \"{0}\"")]
    UnknownRoute(String),

    #[error("route \"{name}\" requires params to be passed: {}", .expected.join(","))]
    MissingParams { name: String, expected: Vec<String> },

    #[error("route \"{name}\" does not declare these params: {}", .unexpected.join(","))]
    UnexpectedParams {
        name: String,
        unexpected: Vec<String>,
    },

    #[error(
        "incorrect amount of params passed to route \"{name}\": expecting {}, passed {}",
        .expected.join(","),
        .supplied.join(",")
    )]
    ParamCountMismatch {
        name: String,
        expected: Vec<String>,
        supplied: Vec<String>,
    },
}

/// Error thrown at the render boundary
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The current URL matches no flat route
    #[error("{message}")]
    NotFound { message: String },

    /// A `before_load` hook asked for the render to fail
    #[error("{message}")]
    Hook { status: u16, message: String },

    /// `navigate` was called with a broken named-route reference
    #[error(transparent)]
    InvalidLink(#[from] LinkError),

    /// A hook or component loader failed
    #[error("{message}")]
    Unexpected {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RouterError {
    /// Numeric status for the error view
    pub fn status(&self) -> u16 {
        match self {
            RouterError::NotFound { .. } => 404,
            RouterError::Hook { status, .. } => *status,
            RouterError::InvalidLink(_) => 400,
            RouterError::Unexpected { .. } => 500,
        }
    }

    pub fn message(&self) -> String {
        match self {
            RouterError::NotFound { message }
            | RouterError::Hook { message, .. }
            | RouterError::Unexpected { message, .. } => message.clone(),
            RouterError::InvalidLink(err) => err.to_string(),
        }
    }

    /// Payload form, as recorded in the observable router status
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.status(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_variant() {
        let not_found = RouterError::NotFound {
            message: "gone".into(),
        };
        assert_eq!(not_found.status(), 404);
        assert_eq!(not_found.to_string(), "gone");

        let hook = RouterError::Hook {
            status: 403,
            message: "nope".into(),
        };
        assert_eq!(hook.payload(), ErrorPayload::new(403, "nope"));

        let link: RouterError = LinkError::UnknownRoute("Missing".into()).into();
        assert_eq!(link.status(), 400);
        assert!(link.message().contains("\"Missing\""));
    }

    #[test]
    fn test_unexpected_keeps_source() {
        let err = RouterError::Unexpected {
            message: "Internal Error".into(),
            source: anyhow::anyhow!("loader exploded").into(),
        };
        assert_eq!(err.status(), 500);
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("loader exploded"));
    }

    #[test]
    fn test_link_error_messages() {
        let err = LinkError::ParamCountMismatch {
            name: "Org".into(),
            expected: vec!["orgId".into(), "teamId".into()],
            supplied: vec!["orgId".into()],
        };
        assert_eq!(
            err.to_string(),
            "incorrect amount of params passed to route \"Org\": expecting orgId,teamId, passed orgId"
        );
    }

    #[test]
    fn test_payload_from_status() {
        let payload: ErrorPayload = 401.into();
        assert_eq!(payload.status, 401);
        assert!(payload.message.is_empty());
    }
}
