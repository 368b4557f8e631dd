//! User Service - credential checks on top of the user repository

use crate::auth::{Authority, verify_password};
use crate::domain::{DomainError, User, UserRepository};

/// A user whose password has been verified, with the authorities it was granted
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub authorities: Vec<Authority>,
}

/// Check a primary email / plaintext password pair.
///
/// Returns `Ok(None)` for an unknown email or a wrong password; the two cases
/// are not distinguished.
pub async fn authenticate(
    repo: &dyn UserRepository,
    email: &str,
    password: &str,
) -> Result<Option<AuthenticatedUser>, DomainError> {
    let (id, hash) = match repo.find_password_hash(email).await? {
        Some(found) => found,
        None => {
            tracing::warn!("Login attempt for unknown email: {}", email);
            return Ok(None);
        }
    };

    if !verify_password(password, &hash)? {
        tracing::warn!("Password verification failed for user {}", id);
        return Ok(None);
    }

    let user = repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
    let authorities = user.authorities();
    tracing::info!("User {} authenticated", id);

    Ok(Some(AuthenticatedUser { user, authorities }))
}
