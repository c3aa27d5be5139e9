//! Signup, login, logout and session checks
//!
//! Form rules run here before anything reaches the account service; remote
//! failures come back as their plain message.

use std::sync::Arc;
use thiserror::Error;

use crate::backend::{AccountService, BackendError, Session, User};

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors surfaced by the auth forms
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Password must be at least 8 characters")]
    PasswordTooShort,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Auth flows over an account service
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountService>,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountService>) -> Self {
        Self { accounts }
    }

    /// Create an account, then log it in
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(Session, User), AuthError> {
        if [name, email, password].iter().any(|f| f.trim().is_empty()) {
            return Err(AuthError::MissingFields);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        let user = self
            .accounts
            .create_account(email.trim(), password, name.trim())
            .await?;
        let session = self.accounts.create_session(email.trim(), password).await?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok((session, user))
    }

    /// Start a fresh session
    ///
    /// A previous session is ended first; failures doing so are ignored.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        previous_token: Option<&str>,
    ) -> Result<(Session, User), AuthError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthError::MissingFields);
        }

        if let Some(token) = previous_token {
            if let Err(e) = self.accounts.delete_session(token).await {
                tracing::debug!(error = %e, "Ignoring failure to end previous session");
            }
        }

        let session = self.accounts.create_session(email.trim(), password).await?;
        let user = self.accounts.current_user(&session.token).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok((session, user))
    }

    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.accounts.delete_session(token).await?;
        Ok(())
    }

    /// User behind `token`; any failure means "not logged in"
    pub async fn current_user(&self, token: &str) -> Option<User> {
        match self.accounts.current_user(token).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "Session check failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;

    fn service() -> AuthService {
        AuthService::new(Arc::new(LocalBackend::in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_signup_validation_messages() {
        let auth = service();

        let err = auth.signup("", "a@b.co", "password123").await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");

        let err = auth.signup("Ada", "a@b.co", "short").await.unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 8 characters");
    }

    #[tokio::test]
    async fn test_signup_creates_session() {
        let auth = service();
        let (session, user) = auth.signup("Ada", "ada@example.com", "password123").await.unwrap();

        assert_eq!(session.user_id, user.id);
        assert_eq!(auth.current_user(&session.token).await, Some(user));
    }

    #[tokio::test]
    async fn test_login_replaces_previous_session() {
        let auth = service();
        let (first, _) = auth.signup("Ada", "ada@example.com", "password123").await.unwrap();

        let (second, user) = auth
            .login("ada@example.com", "password123", Some(&first.token))
            .await
            .unwrap();

        assert_eq!(user.name, "Ada");
        assert!(auth.current_user(&first.token).await.is_none());
        assert!(auth.current_user(&second.token).await.is_some());

        // a stale previous token does not block login
        auth.login("ada@example.com", "password123", Some("stale"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_login_errors() {
        let auth = service();
        auth.signup("Ada", "ada@example.com", "password123").await.unwrap();

        let err = auth.login("", "password123", None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));

        let err = auth.login("ada@example.com", "nope-nope", None).await.unwrap_err();
        assert!(matches!(err, AuthError::Backend(BackendError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let auth = service();
        let (session, _) = auth.signup("Ada", "ada@example.com", "password123").await.unwrap();

        auth.logout(&session.token).await.unwrap();
        assert!(auth.current_user(&session.token).await.is_none());
    }
}
