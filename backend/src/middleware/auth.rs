//! Authentication middleware
//!
//! Bearer-token authentication and role checks for the admin API

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shared::AdminRole;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::AuthService;
use crate::AppState;

/// Authenticated admin extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub admin_id: Uuid,
    pub name: String,
    pub mobile: String,
    pub role: AdminRole,
}

impl AuthUser {
    /// Name recorded as `created_by` / `approved_by` / `updated_by`
    pub fn actor(&self) -> &str {
        &self.name
    }

    pub fn has_role(&self, required: AdminRole) -> bool {
        self.role.satisfies(required)
    }
}

/// Authentication middleware that validates JWT tokens
///
/// Rejects the request with 401 when the header is missing or the token is
/// invalid; otherwise stores the [`AuthUser`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        AppError::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    let claims = AuthService::decode_token(bearer.token(), &state.config.jwt.secret)?;
    let admin_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

    let user = AuthUser {
        admin_id,
        name: claims.name,
        mobile: claims.mobile,
        role: claims.role,
    };
    tracing::debug!(admin = %user.name, mobile = %user.mobile, role = user.role.as_str(), "Authenticated request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extractor for authenticated user
/// Use this in handlers to get the current admin
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

impl CurrentUser {
    /// Role guard for use in handlers
    pub fn require(&self, role: AdminRole) -> Result<(), AppError> {
        if self.0.has_role(role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action requires the {} role",
                role.as_str()
            )))
        }
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
