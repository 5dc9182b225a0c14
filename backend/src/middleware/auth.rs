//! Authentication middleware
//!
//! Validates the bearer token and injects the caller's ledger address.
//! Role capabilities are deliberately NOT carried here; every mutating
//! operation checks the role registry live so revokes take effect at once.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ErrorDetail, ErrorResponse};
use crate::AppState;
use shared::types::Address;

/// Authenticated caller identity extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthIdentity {
    pub address: Address,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let claims = match state.auth.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            return unauthorized_response(&e.to_string());
        }
    };

    let address = match Address::parse(&claims.sub) {
        Ok(address) => address,
        Err(_) => return unauthorized_response("Invalid address in token"),
    };

    request.extensions_mut().insert(AuthIdentity { address });

    next.run(request).await
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for the authenticated caller
/// Use this in handlers to get the current identity
#[derive(Clone, Debug)]
pub struct Caller(pub Address);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthIdentity>()
            .map(|identity| Caller(identity.address.clone()))
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message: "Authentication required".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
