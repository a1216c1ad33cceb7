use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{claims::Claims, jwt::IdpKeys, services::is_valid_email};
use crate::{error::AppError, users::repo_types::NewUser};

/// Verified caller identity.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
}

impl Principal {
    fn from_claims(claims: Claims, keys: &IdpKeys) -> Result<Self, AppError> {
        let email = claims
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| is_valid_email(e))
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token carries no valid email");
                AppError::Unauthorized("token carries no valid email".into())
            })?;
        let username = claims
            .preferred_username
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| email.clone());

        Ok(Self {
            id: claims.sub,
            is_admin: claims.has_role(&keys.admin_role),
            username,
            email,
            first_name: claims.given_name,
            last_name: claims.family_name,
        })
    }

    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

fn verified_claims<S>(parts: &Parts, state: &S) -> Result<(Claims, IdpKeys), AppError>
where
    IdpKeys: FromRef<S>,
{
    let keys = IdpKeys::from_ref(state);
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;

    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or_else(|| AppError::Unauthorized("invalid auth scheme".into()))?;

    match keys.verify(token) {
        Ok(claims) => Ok((claims, keys)),
        Err(e) => {
            warn!(error = %e, "invalid or expired token");
            Err(AppError::Unauthorized("invalid or expired token".into()))
        }
    }
}

/// Caller holding the user role (admins pass too).
pub struct AuthUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    IdpKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (claims, keys) = verified_claims(parts, state)?;
        if !claims.has_role(&keys.user_role) && !claims.has_role(&keys.admin_role) {
            warn!(user_id = %claims.sub, "missing user role");
            return Err(AppError::Forbidden("user role required".into()));
        }
        Ok(AuthUser(Principal::from_claims(claims, &keys)?))
    }
}

/// Caller holding the admin role.
pub struct AdminUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    IdpKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (claims, keys) = verified_claims(parts, state)?;
        if !claims.has_role(&keys.admin_role) {
            warn!(user_id = %claims.sub, "missing admin role");
            return Err(AppError::Forbidden("admin role required".into()));
        }
        Ok(AdminUser(Principal::from_claims(claims, &keys)?))
    }
}
