//! Operator-only access for administrative realtime endpoints.
//!
//! The manual broadcast trigger lets anyone holding the operator token push
//! arbitrary events to every connected app, so it sits behind a shared
//! bearer token:
//!
//! ```text
//! Authorization: Bearer <GOSOTRAL__REALTIME__OPERATOR_TOKEN>
//! ```
//!
//! Without a configured token the gated routes answer 403.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

use crate::adapters::http::dto::ApiError;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Holds the expected operator token, if any.
#[derive(Clone)]
pub struct OperatorGate {
    token: Option<Secret<String>>,
}

impl OperatorGate {
    pub fn new(token: Option<Secret<String>>) -> Self {
        Self { token }
    }

    /// A gate that rejects every request.
    pub fn disabled() -> Self {
        Self { token: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Check a presented bearer token in constant time.
    pub fn check(&self, presented: Option<&str>) -> Result<(), OperatorRejection> {
        let expected = self.token.as_ref().ok_or(OperatorRejection::NotConfigured)?;
        let presented = presented.ok_or(OperatorRejection::MissingToken)?;

        let matches: bool = presented
            .as_bytes()
            .ct_eq(expected.expose_secret().as_bytes())
            .into();
        if matches {
            Ok(())
        } else {
            Err(OperatorRejection::InvalidToken)
        }
    }
}

/// Why an operator request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorRejection {
    /// No operator token is configured on this server.
    NotConfigured,
    /// The request carried no bearer token.
    MissingToken,
    /// The bearer token did not match.
    InvalidToken,
}

impl From<OperatorRejection> for DomainError {
    fn from(rejection: OperatorRejection) -> Self {
        match rejection {
            OperatorRejection::NotConfigured => {
                DomainError::new(ErrorCode::Forbidden, "Operator access is not configured")
            }
            OperatorRejection::MissingToken => {
                DomainError::new(ErrorCode::Unauthorized, "Operator token required")
            }
            OperatorRejection::InvalidToken => {
                DomainError::new(ErrorCode::Unauthorized, "Invalid operator token")
            }
        }
    }
}

impl IntoResponse for OperatorRejection {
    fn into_response(self) -> Response {
        ApiError::from(DomainError::from(self)).into_response()
    }
}

/// Middleware rejecting requests without the operator bearer token.
pub async fn require_operator(
    State(gate): State<OperatorGate>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match gate.check(token) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            tracing::warn!(reason = ?rejection, "Rejected operator request");
            rejection.into_response()
        }
    }
}
