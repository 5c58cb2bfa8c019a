//! UseCase: connection authentication.
//!
//! Verifies the bearer credential and resolves the user's display name via
//! the external user directory. Any failure here is terminal for the
//! session: the handler emits one error event and closes the connection.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::domain::{UserDirectory, UserId};

use super::error::AuthenticateError;

/// Identity established for one session after a successful handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub user_name: String,
}

pub struct AuthenticateUseCase {
    verifier: TokenVerifier,
    users: Arc<dyn UserDirectory>,
}

impl AuthenticateUseCase {
    pub fn new(verifier: TokenVerifier, users: Arc<dyn UserDirectory>) -> Self {
        Self { verifier, users }
    }

    /// Verify `token` and resolve the sender's display name.
    pub async fn execute(&self, token: &str) -> Result<AuthenticatedUser, AuthenticateError> {
        let user_id = self.verifier.verify(token)?;

        let user_name = match self.users.display_name(&user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                tracing::warn!(
                    "Token verified but user '{}' not found in directory",
                    user_id.as_str()
                );
                return Err(AuthenticateError::UnknownUser);
            }
            Err(e) => {
                tracing::warn!("User directory lookup failed for '{}': {}", user_id.as_str(), e);
                return Err(AuthenticateError::DirectoryUnavailable);
            }
        };

        Ok(AuthenticatedUser { user_id, user_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{issue_token, TokenError};
    use crate::domain::{LookupError, MockUserDirectory};
    use seminar_shared::time::FixedClock;

    const SECRET: &str = "test-secret";
    const NOW_SECS: u64 = 1_700_000_000;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(SECRET, Arc::new(FixedClock::new((NOW_SECS * 1000) as i64)))
    }

    fn token_for(user: &str) -> String {
        issue_token(user, SECRET, NOW_SECS + 600)
    }

    #[tokio::test]
    async fn test_execute_resolves_user_id_and_display_name() {
        // given:
        let mut users = MockUserDirectory::new();
        users
            .expect_display_name()
            .returning(|_| Ok(Some("Ada".to_string())));
        let usecase = AuthenticateUseCase::new(verifier(), Arc::new(users));

        // when:
        let result = usecase.execute(&token_for("u-ada")).await;

        // then:
        let user = result.unwrap();
        assert_eq!(user.user_id.as_str(), "u-ada");
        assert_eq!(user.user_name, "Ada");
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_token_without_directory_lookup() {
        // given:
        let mut users = MockUserDirectory::new();
        users.expect_display_name().never();
        let usecase = AuthenticateUseCase::new(verifier(), Arc::new(users));

        // when:
        let result = usecase.execute("v1.garbage.token").await;

        // then:
        assert_eq!(
            result,
            Err(AuthenticateError::InvalidToken(TokenError::Malformed))
        );
    }

    #[tokio::test]
    async fn test_execute_rejects_expired_token() {
        // given:
        let users = MockUserDirectory::new();
        let usecase = AuthenticateUseCase::new(verifier(), Arc::new(users));
        let expired = issue_token("u-ada", SECRET, NOW_SECS - 1);

        // when:
        let result = usecase.execute(&expired).await;

        // then:
        assert_eq!(
            result,
            Err(AuthenticateError::InvalidToken(TokenError::Expired))
        );
    }

    #[tokio::test]
    async fn test_execute_fails_when_user_record_is_missing() {
        // given:
        let mut users = MockUserDirectory::new();
        users.expect_display_name().returning(|_| Ok(None));
        let usecase = AuthenticateUseCase::new(verifier(), Arc::new(users));

        // when:
        let result = usecase.execute(&token_for("u-ghost")).await;

        // then:
        assert_eq!(result, Err(AuthenticateError::UnknownUser));
    }

    #[tokio::test]
    async fn test_execute_fails_when_directory_is_unavailable() {
        // given:
        let mut users = MockUserDirectory::new();
        users
            .expect_display_name()
            .returning(|_| Err(LookupError::Unavailable("store down".to_string())));
        let usecase = AuthenticateUseCase::new(verifier(), Arc::new(users));

        // when:
        let result = usecase.execute(&token_for("u-ada")).await;

        // then:
        assert_eq!(result, Err(AuthenticateError::DirectoryUnavailable));
    }
}
