//! Authentication service for admin login and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use shared::{Admin, AdminRole};
use sqlx::PgPool;
use validator::Validate;

use crate::config::{BootstrapAdmin, Config};
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Login credentials
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(custom = "crate::validation::mobile")]
    pub mobile: String,
    #[validate(custom = "crate::validation::password")]
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Admin ID
    pub name: String,
    pub mobile: String,
    pub role: AdminRole,
    pub exp: i64,
    pub iat: i64,
}

/// Response after successful login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: Admin,
}

/// Admin row including the password hash
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    admin: Admin,
    password_hash: String,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Authenticate an admin with mobile number and password
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, name, mobile, role, created_by, created_at, updated_at, password_hash
            FROM admins
            WHERE mobile = $1
            "#,
        )
        .bind(&input.mobile)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(&row.admin)?;
        tracing::info!(admin = %row.admin.name, role = %row.admin.role.as_str(), "Admin logged in");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user: row.admin,
        })
    }

    /// Sign an access token for `admin`
    pub fn issue_token(&self, admin: &Admin) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id.to_string(),
            name: admin.name.clone(),
            mobile: admin.mobile.clone(),
            role: admin.role,
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Validate an access token and return its claims
    pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
    }

    /// Hash a password before it is stored
    pub fn hash_password(password: &str) -> AppResult<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Create the configured superadmin when the system has none yet
    ///
    /// Returns whether an account was created.
    pub async fn ensure_superadmin(&self, bootstrap: &BootstrapAdmin) -> AppResult<bool> {
        shared::validate_mobile(&bootstrap.mobile)
            .map_err(|m| AppError::validation("bootstrap.mobile", m))?;
        shared::validate_password(&bootstrap.password)
            .map_err(|m| AppError::validation("bootstrap.password", m))?;

        let existing = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM admins WHERE role = 'superadmin')",
        )
        .fetch_one(&self.db)
        .await?;
        if existing {
            return Ok(false);
        }

        let password_hash = Self::hash_password(&bootstrap.password)?;
        sqlx::query(
            r#"
            INSERT INTO admins (name, mobile, password_hash, role, created_by)
            VALUES ($1, $2, $3, 'superadmin', 'system')
            "#,
        )
        .bind(&bootstrap.name)
        .bind(&bootstrap.mobile)
        .bind(&password_hash)
        .execute(&self.db)
        .await?;

        tracing::info!(mobile = %bootstrap.mobile, "Created bootstrap superadmin");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn service() -> AuthService {
        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        AuthService::new(db, &config)
    }

    fn admin(role: AdminRole) -> Admin {
        let now = Utc::now();
        Admin {
            id: Uuid::new_v4(),
            name: "admin1".to_string(),
            mobile: "9876543210".to_string(),
            role,
            created_by: "system".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_token_round_trip_keeps_role() {
        let service = service();
        let admin = admin(AdminRole::SuperAdmin);
        let token = service.issue_token(&admin).unwrap();

        let claims = AuthService::decode_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, admin.id.to_string());
        assert_eq!(claims.role, AdminRole::SuperAdmin);
        assert_eq!(claims.name, "admin1");
    }

    #[tokio::test]
    async fn test_wrong_secret_is_invalid_token() {
        let token = service().issue_token(&admin(AdminRole::Admin)).unwrap();
        assert!(matches!(
            AuthService::decode_token(&token, "other-secret"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            name: "admin1".to_string(),
            mobile: "9876543210".to_string(),
            role: AdminRole::Admin,
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            AuthService::decode_token(&token, "test-secret"),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_hash_password_verifies() {
        let hashed = AuthService::hash_password("secret").unwrap();
        assert_ne!(hashed, "secret");
        assert!(verify("secret", &hashed).unwrap());
    }
}
