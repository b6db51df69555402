//! Request extractors that turn a bearer token into the acting user and tenant.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::security::jwt::{extract_bearer_token, Claims};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".into()))?;

        let claims = app_state.jwt.validate_access_token(token).map_err(|e| {
            debug!("Rejected session token: {}", e);
            ApiError::Unauthorized("Invalid or expired session".into())
        })?;

        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::Unauthorized("Invalid session subject".into()))?;
        let organization_id = claims
            .organization_id()
            .map_err(|_| ApiError::Unauthorized("Invalid session organization".into()))?;

        Ok(AuthenticatedUser {
            user_id,
            organization_id,
            claims,
        })
    }
}

/// Never rejects; handlers decide what an anonymous caller may do.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl OptionalAuth {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|u| u.user_id)
    }

    pub fn organization_id(&self) -> Uuid {
        self.0
            .as_ref()
            .map(|u| u.organization_id)
            .unwrap_or_else(Uuid::nil)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthenticatedUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalAuth(Some(user))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
