//! src/services/auth_service.rs
//!
//! The access-control layer: bearer-credential verification, the role
//! store (email → role records), and the authorization gate every
//! mutating handler calls before touching a repository.

use crate::models::role::{Role, RoleRecord};
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("a role record for `{0}` already exists")]
    DuplicateEmail(String),
    #[error("role record `{0}` not found")]
    RoleNotFound(Uuid),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Operations a role can be granted. Every mutating endpoint names the
/// capability it requires instead of hardcoding a role comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    ManageUsers,
    ManagePosts,
    ManageServices,
    ManageProjects,
    ManageTestimonials,
    ModerateInbox,
}

/// Explicit capability matrix.
///
/// Every content-mutating operation requires at minimum the admin role,
/// so only `admin` carries grants today. Widening a weaker tier is a
/// one-line change here rather than a hunt through the handlers.
fn grants(role: Role) -> &'static [Capability] {
    use Capability::*;
    match role {
        Role::Admin => &[
            ManageUsers,
            ManagePosts,
            ManageServices,
            ManageProjects,
            ManageTestimonials,
            ModerateInbox,
        ],
        Role::ContentManager => &[],
        Role::Editor => &[],
        Role::Viewer => &[],
    }
}

/// Whether `role` holds `capability` under the matrix.
pub fn permits(role: Role, capability: Capability) -> bool {
    grants(role).contains(&capability)
}

/// Claims carried by a bearer token issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    exp: i64,
    iat: i64,
}

/// Identity resolved from a verified credential. Says nothing about roles.
#[derive(Clone, Debug)]
pub struct VerifiedIdentity {
    pub subject_id: String,
    pub email: String,
}

/// Identity that passed the authorization gate for some capability.
#[derive(Clone, Debug)]
pub struct AuthorizedIdentity {
    pub subject_id: String,
    pub email: String,
    pub role: Role,
}

/// Verifies opaque bearer credentials against the shared HS256 secret.
///
/// Pure verification: no store access, no retries. A failed verification
/// is terminal for the request.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Resolve a credential to `{subject_id, email}`. Missing, malformed
    /// and expired tokens all fail the same way.
    pub fn verify(&self, token: &str) -> AuthResult<VerifiedIdentity> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AuthError::Unauthorized("invalid credential".into()))?;
        Ok(VerifiedIdentity {
            subject_id: data.claims.sub,
            email: data.claims.email,
        })
    }

    /// Mint a token for `subject`/`email` valid for `ttl_minutes`.
    pub fn issue(
        &self,
        subject: &str,
        email: &str,
        ttl_minutes: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }
}

/// AuthService couples the verifier with the role store and exposes the
/// gate (`authorize`) plus the role CRUD used by the admin user screens.
#[derive(Clone)]
pub struct AuthService {
    /// Shared SQLite connection pool used for role lookups.
    pub db: Arc<SqlitePool>,

    verifier: TokenVerifier,
}

impl AuthService {
    pub fn new(db: Arc<SqlitePool>, verifier: TokenVerifier) -> Self {
        Self { db, verifier }
    }

    /// Pull the bearer token out of the Authorization header and verify it.
    /// No role lookup — this is the "any authenticated caller" check the
    /// media endpoints use.
    pub fn verify_bearer(&self, headers: &HeaderMap) -> AuthResult<VerifiedIdentity> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AuthError::Unauthorized("missing bearer credential".into()))?;
        self.verifier.verify(token)
    }

    /// The authorization gate. Must run before every mutating repository
    /// call; public read paths bypass it entirely.
    ///
    /// 1. verify the credential (401 on failure)
    /// 2. look up the role record by resolved email (403 when absent)
    /// 3. evaluate the capability matrix (403 when not granted)
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        capability: Capability,
    ) -> AuthResult<AuthorizedIdentity> {
        let identity = self.verify_bearer(headers)?;

        let record = self
            .find_by_email(&identity.email)
            .await?
            .ok_or_else(|| AuthError::Forbidden("no role record for caller".into()))?;

        if !permits(record.role, capability) {
            return Err(AuthError::Forbidden("insufficient permissions".into()));
        }

        Ok(AuthorizedIdentity {
            subject_id: identity.subject_id,
            email: identity.email,
            role: record.role,
        })
    }

    /// Point lookup used by the gate. Case-sensitive exactly as stored —
    /// emails are not normalized on write, so they are not normalized here.
    pub async fn find_by_email(&self, email: &str) -> AuthResult<Option<RoleRecord>> {
        let record = sqlx::query_as::<_, RoleRecord>(
            "SELECT id, email, role, created_at, created_by
             FROM users WHERE email = ? LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&*self.db)
        .await?;
        Ok(record)
    }

    /// Create a role record. Duplicates are rejected by a pre-insert
    /// lookup rather than a uniqueness constraint.
    pub async fn create_role(
        &self,
        email: &str,
        role: Role,
        created_by: Option<&str>,
    ) -> AuthResult<Uuid> {
        if self.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail(email.to_string()));
        }

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, email, role, created_at, created_by)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(email)
        .bind(role)
        .bind(Utc::now())
        .bind(created_by)
        .execute(&*self.db)
        .await?;

        Ok(id)
    }

    /// All role records, newest first.
    pub async fn list_roles(&self) -> AuthResult<Vec<RoleRecord>> {
        let records = sqlx::query_as::<_, RoleRecord>(
            "SELECT id, email, role, created_at, created_by
             FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(records)
    }

    pub async fn update_role(&self, id: Uuid, role: Role) -> AuthResult<()> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::RoleNotFound(id));
        }
        Ok(())
    }

    /// Hard delete. A second delete of the same id fails with `RoleNotFound`.
    pub async fn delete_role(&self, id: Uuid) -> AuthResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::RoleNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;
    use axum::http::HeaderValue;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new("test-secret")
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn verify_round_trips_subject_and_email() {
        let v = verifier();
        let token = v.issue("uid-1", "a@b.test", 15).unwrap();
        let identity = v.verify(&token).unwrap();
        assert_eq!(identity.subject_id, "uid-1");
        assert_eq!(identity.email, "a@b.test");
    }

    #[test]
    fn verify_rejects_garbage_and_wrong_secret() {
        let v = verifier();
        assert!(matches!(
            v.verify("not-a-token"),
            Err(AuthError::Unauthorized(_))
        ));

        let other = TokenVerifier::new("other-secret");
        let token = other.issue("uid-1", "a@b.test", 15).unwrap();
        assert!(matches!(
            v.verify(&token),
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[test]
    fn verify_rejects_expired_tokens() {
        let v = verifier();
        let token = v.issue("uid-1", "a@b.test", -5).unwrap();
        assert!(matches!(
            v.verify(&token),
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[test]
    fn matrix_grants_mutations_to_admin_only() {
        use Capability::*;
        for cap in [
            ManageUsers,
            ManagePosts,
            ManageServices,
            ManageProjects,
            ManageTestimonials,
            ModerateInbox,
        ] {
            assert!(permits(Role::Admin, cap));
            assert!(!permits(Role::ContentManager, cap));
            assert!(!permits(Role::Editor, cap));
            assert!(!permits(Role::Viewer, cap));
        }
    }

    #[tokio::test]
    async fn role_crud_and_duplicate_email() {
        let (db, _dir) = test_pool().await;
        let auth = AuthService::new(db, verifier());

        let id = auth
            .create_role("ed@example.test", Role::Editor, Some("uid-admin"))
            .await
            .unwrap();

        let found = auth.find_by_email("ed@example.test").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.role, Role::Editor);
        assert_eq!(found.created_by.as_deref(), Some("uid-admin"));

        // Lookup is case-sensitive as stored.
        assert!(auth.find_by_email("ED@example.test").await.unwrap().is_none());

        let err = auth
            .create_role("ed@example.test", Role::Viewer, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail(_)));

        auth.update_role(id, Role::Admin).await.unwrap();
        let listed = auth.list_roles().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].role, Role::Admin);

        auth.delete_role(id).await.unwrap();
        let second = auth.delete_role(id).await.unwrap_err();
        assert!(matches!(second, AuthError::RoleNotFound(_)));
    }

    #[tokio::test]
    async fn authorize_walks_the_three_steps() {
        let (db, _dir) = test_pool().await;
        let auth = AuthService::new(db, verifier());

        // No credential at all.
        let err = auth
            .authorize(&HeaderMap::new(), Capability::ManageServices)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));

        // Valid credential, no role record.
        let token = verifier().issue("uid-1", "ghost@example.test", 15).unwrap();
        let err = auth
            .authorize(&bearer_headers(&token), Capability::ManageServices)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));

        // Valid credential, role without the capability.
        auth.create_role("viewer@example.test", Role::Viewer, None)
            .await
            .unwrap();
        let token = verifier().issue("uid-2", "viewer@example.test", 15).unwrap();
        let err = auth
            .authorize(&bearer_headers(&token), Capability::ManageServices)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));

        // Admin passes.
        auth.create_role("admin@example.test", Role::Admin, None)
            .await
            .unwrap();
        let token = verifier().issue("uid-3", "admin@example.test", 15).unwrap();
        let identity = auth
            .authorize(&bearer_headers(&token), Capability::ManageServices)
            .await
            .unwrap();
        assert_eq!(identity.subject_id, "uid-3");
        assert_eq!(identity.role, Role::Admin);
    }
}
