use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::cookie::{time::Duration, SameSite};
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::SecurityConfig;
use crate::database::models::User;

pub mod password;

pub use password::{hash_password, verify_password};

/// Session key holding the logged-in user's id
const USER_ID_KEY: &str = "user_id";

/// The account behind a request, reloaded from the database on every
/// request so deactivation and role changes apply immediately
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub id: i32,
    pub email: String,
    pub prenom: String,
    pub nom: String,
    pub is_admin: bool,
    pub is_approved: bool,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            prenom: user.prenom.clone(),
            nom: user.nom.clone(),
            is_admin: user.is_admin,
            is_approved: user.is_approved,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Cookie-backed sessions stored in Postgres (`tower_sessions.session`)
pub fn session_layer(pool: PgPool, security: &SecurityConfig) -> SessionManagerLayer<PostgresStore> {
    let expiry_hours = i64::try_from(security.session_expiry_hours).unwrap_or(i64::MAX / 3600);

    SessionManagerLayer::new(PostgresStore::new(pool))
        .with_name(security.session_cookie_name.clone())
        .with_http_only(true)
        .with_secure(security.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::hours(expiry_hours)))
}

/// Bind `user_id` to a fresh session id
pub async fn open_session(session: &Session, user_id: i32) -> Result<(), AuthError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

pub async fn session_user_id(session: &Session) -> Result<Option<i32>, AuthError> {
    Ok(session.get::<i32>(USER_ID_KEY).await?)
}

/// Delete the stored session and expire the cookie
pub async fn close_session(session: &Session) -> Result<(), AuthError> {
    session.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn user(is_admin: bool) -> User {
        let now = chrono::Utc::now();
        User {
            id: 42,
            email: "marie.curie@example.org".to_string(),
            password_hash: String::new(),
            prenom: "Marie".to_string(),
            nom: "Curie".to_string(),
            annee_diplome: Some(1903),
            section_id: None,
            section_nom: None,
            telephone: None,
            adresse: None,
            ville: None,
            code_postal: None,
            pays: None,
            linkedin: None,
            github: None,
            site_web: None,
            biographie: None,
            statut_emploi: None,
            is_admin,
            is_approved: true,
            is_active: true,
            opt_out_contact: false,
            opt_out_directory: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn session_user_copies_flags() {
        let session_user = SessionUser::from(&user(true));
        assert_eq!(session_user.id, 42);
        assert!(session_user.is_admin);
        assert!(session_user.is_approved);
    }

    #[tokio::test]
    async fn open_then_close_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert_eq!(session_user_id(&session).await.unwrap(), None);

        open_session(&session, 42).await.unwrap();
        assert_eq!(session_user_id(&session).await.unwrap(), Some(42));

        close_session(&session).await.unwrap();
        assert_eq!(session_user_id(&session).await.unwrap(), None);
    }
}
