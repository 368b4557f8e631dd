//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use super::DomainError;
use crate::auth::{self, Authority};

// Present-but-null becomes `Some(None)`; `#[serde(default)]` covers absence.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Market data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: i32,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Product category data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Role data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Secondary email address of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEmail {
    pub id: i32,
    pub user_id: i32,
    pub useremail: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Seller as embedded in an item. Carries no items of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i32,
    pub primary_email: String,
    pub name: Option<String>,
}

/// Item as listed on its seller. The seller itself is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserItem {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub market_id: i32,
    pub product_id: i32,
}

/// User with its emails, roles and items loaded.
///
/// There is no password field: hashes never leave the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub primary_email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub emails: Vec<UserEmail>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub items: Vec<UserItem>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn username(&self) -> &str {
        &self.primary_email
    }

    /// `ROLE_<NAME>` for every role held by the user, derived on each call.
    pub fn authorities(&self) -> Vec<Authority> {
        auth::authorities(self.roles.iter().map(|r| r.name.as_str()))
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            primary_email: user.primary_email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Input for creating a user. `password` is plaintext and gets hashed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub primary_email: String,
    pub password: String,
    pub name: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub role_ids: Vec<i32>,
}

/// Input for updating a user. Absent fields are left untouched; present
/// collections replace the stored ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub primary_email: Option<String>,
    pub password: Option<String>,
    /// `null` clears the name; an absent field keeps it.
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    pub emails: Option<Vec<String>>,
    pub role_ids: Option<Vec<i32>>,
}

/// Repository trait for User entity
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find all users with their emails, roles and items
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;

    /// Find a user by primary email, ignoring case
    async fn find_by_primary_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Id and stored password hash for a primary email, ignoring case
    async fn find_password_hash(
        &self,
        email: &str,
    ) -> Result<Option<(i32, String)>, DomainError>;

    /// Authorities granted to a user through its roles
    async fn find_authorities(&self, id: i32) -> Result<Vec<Authority>, DomainError>;

    /// Create a new user, its secondary emails and role links
    async fn create(&self, input: CreateUserInput) -> Result<User, DomainError>;

    /// Update a user
    async fn update(&self, id: i32, input: UpdateUserInput) -> Result<User, DomainError>;

    /// Delete a user together with its emails, role links and items
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Item data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub user: UserSummary,
    pub market: Market,
    pub product: Product,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating an item
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemInput {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub user_id: i32,
    pub market_id: i32,
    pub product_id: i32,
}

/// Input for updating an item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemInput {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub user_id: Option<i32>,
    pub market_id: Option<i32>,
    pub product_id: Option<i32>,
}

/// Repository trait for Item entity
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Find all items with seller, market and product
    async fn find_all(&self) -> Result<Vec<Item>, DomainError>;

    /// Find an item by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Item>, DomainError>;

    /// Items sold by a user
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Item>, DomainError>;

    async fn find_by_market(&self, market_id: i32) -> Result<Vec<Item>, DomainError>;

    async fn find_by_product(&self, product_id: i32) -> Result<Vec<Item>, DomainError>;

    /// Create a new item
    async fn create(&self, input: CreateItemInput) -> Result<Item, DomainError>;

    /// Update an item
    async fn update(&self, id: i32, input: UpdateItemInput) -> Result<Item, DomainError>;

    /// Delete an item
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Market entity
#[async_trait]
pub trait MarketRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Market>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Market>, DomainError>;

    async fn create(&self, name: String) -> Result<Market, DomainError>;

    async fn update(&self, id: i32, name: String) -> Result<Market, DomainError>;

    /// Refused while items still reference the market
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Product entity
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Product>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, DomainError>;

    async fn create(&self, name: String) -> Result<Product, DomainError>;

    async fn update(&self, id: i32, name: String) -> Result<Product, DomainError>;

    /// Refused while items still reference the product
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Role entity
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Role>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, DomainError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, DomainError>;

    async fn create(&self, name: String) -> Result<Role, DomainError>;

    async fn update(&self, id: i32, name: String) -> Result<Role, DomainError>;

    /// Delete a role and every user link to it
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for UserEmail entity
#[async_trait]
pub trait UserEmailRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<UserEmail>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<UserEmail>, DomainError>;

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<UserEmail>, DomainError>;

    async fn create(&self, user_id: i32, useremail: String) -> Result<UserEmail, DomainError>;

    async fn update(&self, id: i32, useremail: String) -> Result<UserEmail, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
