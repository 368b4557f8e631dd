use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::auth::{self, PasswordError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Argon2 PHC string. Accepted on input, never written back out.
    #[serde(skip_serializing)]
    pub password: String,
    /// Login name of the user, always lowercase.
    #[sea_orm(unique)]
    pub primary_email: String,
    pub name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_email::Entity")]
    UserEmails,
    #[sea_orm(has_many = "super::user_roles::Entity")]
    UserRoles,
    #[sea_orm(has_many = "super::item::Entity")]
    Items,
}

impl Related<super::user_email::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserEmails.def()
    }
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_roles::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_roles::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The primary email doubles as the username.
    pub fn username(&self) -> &str {
        &self.primary_email
    }
}

impl ActiveModel {
    /// Hash `plain` and store the hash. The plaintext is never kept.
    pub fn set_password(&mut self, plain: &str) -> Result<(), PasswordError> {
        self.password = Set(auth::hash_password(plain)?);
        Ok(())
    }

    /// Store an already-hashed password verbatim.
    ///
    /// Only for rehydrating hashes read back from storage; passing plaintext
    /// here would persist it unhashed.
    pub fn set_password_no_encrypt(&mut self, hash: String) {
        self.password = Set(hash);
    }

    pub fn set_primary_email(&mut self, email: &str) {
        self.primary_email = Set(normalize_email(email));
    }
}

/// Lowercase and trim an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
