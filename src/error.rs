//! Registry error types with HTTP status code mapping.
//!
//! [`RegistryError`] is the central error type for the registry. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Amount, DomainName};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "message": "domain already registered: com",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Registry error enum with HTTP status code mapping.
///
/// The four registry rejections are caller-input errors: they are
/// reported synchronously and leave all state, including escrow,
/// unchanged.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status               |
/// |-----------|-----------------------|---------------------------|
/// | 1000–1999 | Validation            | 400 Bad Request           |
/// | 2000–2999 | Ownership / Not Found | 403 / 404 / 409           |
/// | 3000–3999 | Server                | 500 / 503                 |
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The name already has a controller.
    #[error("domain already registered: {0}")]
    AlreadyRegistered(DomainName),

    /// Payment is below the configured minimum deposit.
    #[error("insufficient deposit: required {required}, provided {provided}")]
    InsufficientDeposit {
        /// Minimum accepted deposit.
        required: Amount,
        /// Amount attached to the call.
        provided: Amount,
    },

    /// The name has no controller.
    #[error("domain not registered: {0}")]
    NotRegistered(DomainName),

    /// The caller is not the controller of the name.
    #[error("caller is not the controller of {0}")]
    NotController(DomainName),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// A collaborator needed for the request is not configured.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InsufficientDeposit { .. } => 1002,
            Self::NotRegistered(_) => 2001,
            Self::AlreadyRegistered(_) => 2002,
            Self::NotController(_) => 2003,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Unavailable(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InsufficientDeposit { .. } => StatusCode::BAD_REQUEST,
            Self::NotRegistered(_) => StatusCode::NOT_FOUND,
            Self::AlreadyRegistered(_) => StatusCode::CONFLICT,
            Self::NotController(_) => StatusCode::FORBIDDEN,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns `true` for rejections caused by caller input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::PersistenceError(_) | Self::Internal(_) | Self::Unavailable(_)
        )
    }
}

impl From<JsonRejection> for RegistryError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if !self.is_client_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let details = match &self {
            Self::InsufficientDeposit { required, .. } => Some(format!("min_deposit={required}")),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn com() -> DomainName {
        let Ok(n) = DomainName::new("com") else {
            panic!("valid name");
        };
        n
    }

    #[test]
    fn registry_rejections_map_to_client_statuses() {
        assert_eq!(
            RegistryError::AlreadyRegistered(com()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RegistryError::NotRegistered(com()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RegistryError::NotController(com()).status_code(),
            StatusCode::FORBIDDEN
        );
        let insufficient = RegistryError::InsufficientDeposit {
            required: Amount::new(100),
            provided: Amount::new(99),
        };
        assert_eq!(insufficient.status_code(), StatusCode::BAD_REQUEST);
        assert!(insufficient.is_client_error());
        assert!(!RegistryError::Internal("x".to_string()).is_client_error());
    }

    #[test]
    fn error_codes_are_distinct() {
        let codes = [
            RegistryError::InvalidRequest(String::new()).error_code(),
            RegistryError::InsufficientDeposit {
                required: Amount::ZERO,
                provided: Amount::ZERO,
            }
            .error_code(),
            RegistryError::NotRegistered(com()).error_code(),
            RegistryError::AlreadyRegistered(com()).error_code(),
            RegistryError::NotController(com()).error_code(),
            RegistryError::Internal(String::new()).error_code(),
            RegistryError::PersistenceError(String::new()).error_code(),
            RegistryError::Unavailable(String::new()).error_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn message_names_the_domain() {
        let msg = RegistryError::AlreadyRegistered(com()).to_string();
        assert_eq!(msg, "domain already registered: com");
    }
}
