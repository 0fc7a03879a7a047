//! Request identity.
//!
//! Viewer identity is established by the authentication provider in front
//! of this service and forwarded as plain headers, which are trusted as-is.
//! The admin API is guarded separately by a bearer token.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use homelab_shared::constants::{VIEWER_ID_HEADER, VIEWER_NAME_HEADER};
use homelab_shared::ViewerId;

use crate::config::ServerConfig;
use crate::error::ServerError;

/// The signed-in user making a request.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: ViewerId,
    pub display_name: Option<String>,
}

/// Read the viewer headers. A missing or blank id means anonymous.
pub fn viewer_from_headers(headers: &HeaderMap) -> Option<Viewer> {
    let id = headers
        .get(VIEWER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| ViewerId::new(v).ok())?;

    let display_name = headers
        .get(VIEWER_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Some(Viewer { id, display_name })
}

/// Extractor for routes that work with or without a viewer.
pub struct MaybeViewer(pub Option<Viewer>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeViewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeViewer(viewer_from_headers(&parts.headers)))
    }
}

/// Extractor for routes that need a viewer; rejects with `401` otherwise.
pub struct RequireViewer(pub Viewer);

#[async_trait]
impl<S> FromRequestParts<S> for RequireViewer
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        viewer_from_headers(&parts.headers)
            .map(RequireViewer)
            .ok_or(ServerError::Unauthorized)
    }
}

pub fn verify_admin_token(headers: &HeaderMap, config: &ServerConfig) -> Result<(), ServerError> {
    let Some(ref expected) = config.admin_token else {
        return Err(ServerError::Forbidden(
            "Admin API is disabled (no ADMIN_TOKEN configured)".into(),
        ));
    };

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);

    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    if token_bytes.len() != expected_bytes.len()
        || token_bytes.ct_eq(expected_bytes).unwrap_u8() != 1
    {
        return Err(ServerError::Forbidden("Invalid admin token".into()));
    }

    Ok(())
}
