//! Password hashing and role-to-authority mapping

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Prefix the security layer expects on every granted role.
pub const ROLE_PREFIX: &str = "ROLE_";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password must not be empty")]
    Empty,
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hash a plaintext password with argon2id and a fresh random salt.
///
/// The result is a PHC string (`$argon2id$v=19$...`) carrying its own salt and
/// parameters, so two calls with the same input never produce the same value.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// A permission token such as `ROLE_ADMIN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn for_role(role_name: &str) -> Self {
        Self(format!("{}{}", ROLE_PREFIX, role_name.trim().to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One authority per distinct role name, in first-seen order. Recomputed on
/// every call.
pub fn authorities<'a, I>(role_names: I) -> Vec<Authority>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    role_names
        .into_iter()
        .map(Authority::for_role)
        .filter(|a| seen.insert(a.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_is_prefixed_and_uppercased() {
        assert_eq!(Authority::for_role("admin").as_str(), "ROLE_ADMIN");
        assert_eq!(Authority::for_role("Data").to_string(), "ROLE_DATA");
    }

    #[test]
    fn one_authority_per_role() {
        let granted = authorities(["user", "seller", "admin"]);
        assert_eq!(granted.len(), 3);
        assert!(granted.contains(&Authority::for_role("SELLER")));
    }

    #[test]
    fn names_differing_in_case_grant_one_authority() {
        let granted = authorities(["admin", "user", "ADMIN"]);
        assert_eq!(
            granted,
            vec![Authority::for_role("admin"), Authority::for_role("user")]
        );
    }

    #[test]
    fn no_roles_no_authorities() {
        assert!(authorities(std::iter::empty()).is_empty());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(hash_password(""), Err(PasswordError::Empty)));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("secret", "not-a-phc-string"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}
