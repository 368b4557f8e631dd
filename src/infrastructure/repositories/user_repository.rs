//! SeaORM implementation of UserRepository
//!
//! A user owns its secondary emails, role links and items. Writes that touch
//! those collections run in a single transaction: deleting a user removes
//! all three, and replacing a collection on update deletes the rows that are
//! no longer part of it.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::auth::{self, Authority};
use crate::domain::validation::{require_email, require_name};
use crate::domain::{
    CreateUserInput, DomainError, Role, UpdateUserInput, User, UserEmail, UserItem,
    UserRepository,
};
use crate::models::user::{self, ActiveModel, Column, Entity as UserEntity, normalize_email};
use crate::models::{item, role, user_email, user_roles};

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_email_free(&self, email: &str, except: Option<i32>) -> Result<(), DomainError> {
        let taken = UserEntity::find()
            .filter(Column::PrimaryEmail.eq(email))
            .one(&self.db)
            .await?;

        match taken {
            Some(existing) if Some(existing.id) != except => {
                tracing::warn!("Primary email already registered: {}", email);
                Err(DomainError::Conflict(format!(
                    "primary email '{}' is already registered",
                    email
                )))
            }
            _ => Ok(()),
        }
    }

    async fn reload(&self, id: i32) -> Result<User, DomainError> {
        self.find_by_id(id).await?.ok_or(DomainError::NotFound)
    }
}

fn clean_name(name: Option<String>) -> Result<Option<String>, DomainError> {
    name.map(|n| require_name("user name", &n)).transpose()
}

fn checked_emails(emails: &[String]) -> Result<(), DomainError> {
    emails.iter().try_for_each(|e| require_email(e))
}

async fn insert_emails(
    txn: &DatabaseTransaction,
    user_id: i32,
    emails: &[String],
    now: &str,
) -> Result<(), DomainError> {
    for email in emails {
        let row = user_email::ActiveModel {
            user_id: Set(user_id),
            useremail: Set(normalize_email(email)),
            created_at: Set(now.to_owned()),
            updated_at: Set(now.to_owned()),
            ..Default::default()
        };
        user_email::Entity::insert(row)
            .exec_without_returning(txn)
            .await?;
    }
    Ok(())
}

async fn insert_roles(
    txn: &DatabaseTransaction,
    user_id: i32,
    role_ids: &[i32],
    now: &str,
) -> Result<(), DomainError> {
    let unique: BTreeSet<i32> = role_ids.iter().copied().collect();
    for role_id in unique {
        let link = user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
            created_at: Set(now.to_owned()),
            updated_at: Set(now.to_owned()),
        };
        user_roles::Entity::insert(link)
            .exec_without_returning(txn)
            .await?;
    }
    Ok(())
}

/// Load emails, roles and items for a batch of users.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    users: Vec<user::Model>,
) -> Result<Vec<User>, DomainError> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();

    let mut emails: HashMap<i32, Vec<UserEmail>> = HashMap::new();
    for e in user_email::Entity::find()
        .filter(user_email::Column::UserId.is_in(ids.clone()))
        .order_by_asc(user_email::Column::Id)
        .all(db)
        .await?
    {
        emails.entry(e.user_id).or_default().push(UserEmail::from(e));
    }

    let mut roles: HashMap<i32, Vec<Role>> = HashMap::new();
    for (link, role) in user_roles::Entity::find()
        .filter(user_roles::Column::UserId.is_in(ids.clone()))
        .order_by_asc(user_roles::Column::RoleId)
        .find_also_related(role::Entity)
        .all(db)
        .await?
    {
        if let Some(role) = role {
            roles.entry(link.user_id).or_default().push(Role::from(role));
        }
    }

    let mut items: HashMap<i32, Vec<UserItem>> = HashMap::new();
    for i in item::Entity::find()
        .filter(item::Column::UserId.is_in(ids))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await?
    {
        items.entry(i.user_id).or_default().push(UserItem {
            id: i.id,
            name: i.name,
            description: i.description,
            price: i.price,
            market_id: i.market_id,
            product_id: i.product_id,
        });
    }

    Ok(users
        .into_iter()
        .map(|u| User {
            emails: emails.remove(&u.id).unwrap_or_default(),
            roles: roles.remove(&u.id).unwrap_or_default(),
            items: items.remove(&u.id).unwrap_or_default(),
            id: u.id,
            primary_email: u.primary_email,
            name: u.name,
            created_at: u.created_at,
            updated_at: u.updated_at,
        })
        .collect())
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let users = UserEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        hydrate(&self.db, users).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        let user = match UserEntity::find_by_id(id).one(&self.db).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        Ok(hydrate(&self.db, vec![user]).await?.pop())
    }

    async fn find_by_primary_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let normalized = normalize_email(email);
        tracing::debug!("Looking up user by primary email: {}", normalized);

        let user = match UserEntity::find()
            .filter(Column::PrimaryEmail.eq(normalized))
            .one(&self.db)
            .await?
        {
            Some(user) => user,
            None => return Ok(None),
        };

        Ok(hydrate(&self.db, vec![user]).await?.pop())
    }

    async fn find_password_hash(
        &self,
        email: &str,
    ) -> Result<Option<(i32, String)>, DomainError> {
        let found = UserEntity::find()
            .filter(Column::PrimaryEmail.eq(normalize_email(email)))
            .one(&self.db)
            .await?;

        Ok(found.map(|u| (u.id, u.password)))
    }

    async fn find_authorities(&self, id: i32) -> Result<Vec<Authority>, DomainError> {
        if UserEntity::find_by_id(id).one(&self.db).await?.is_none() {
            return Err(DomainError::NotFound);
        }

        let roles = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(id))
            .find_also_related(role::Entity)
            .all(&self.db)
            .await?;

        Ok(auth::authorities(
            roles
                .iter()
                .filter_map(|(_, role)| role.as_ref())
                .map(|r| r.name.as_str()),
        ))
    }

    async fn create(&self, input: CreateUserInput) -> Result<User, DomainError> {
        require_email(&input.primary_email)?;
        checked_emails(&input.emails)?;

        let now = chrono::Utc::now().to_rfc3339();
        let mut active = ActiveModel {
            name: Set(clean_name(input.name)?),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        active.set_primary_email(&input.primary_email);
        active.set_password(&input.password)?;

        let email = normalize_email(&input.primary_email);
        self.ensure_email_free(&email, None).await?;

        let txn = self.db.begin().await?;
        let created = active.insert(&txn).await?;
        insert_emails(&txn, created.id, &input.emails, &now).await?;
        insert_roles(&txn, created.id, &input.role_ids, &now).await?;
        txn.commit().await?;

        tracing::info!("Created user {} ({})", created.id, created.primary_email);
        self.reload(created.id).await
    }

    async fn update(&self, id: i32, input: UpdateUserInput) -> Result<User, DomainError> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();

        if let Some(email) = input.primary_email {
            require_email(&email)?;
            self.ensure_email_free(&normalize_email(&email), Some(id))
                .await?;
            active.set_primary_email(&email);
        }
        if let Some(password) = input.password {
            active.set_password(&password)?;
        }
        if let Some(name) = input.name {
            active.name = Set(clean_name(name)?);
        }
        if let Some(emails) = &input.emails {
            checked_emails(emails)?;
        }

        let now = chrono::Utc::now().to_rfc3339();
        active.updated_at = Set(now.clone());

        let txn = self.db.begin().await?;
        active.update(&txn).await?;

        if let Some(emails) = input.emails {
            user_email::Entity::delete_many()
                .filter(user_email::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
            insert_emails(&txn, id, &emails, &now).await?;
        }
        if let Some(role_ids) = input.role_ids {
            user_roles::Entity::delete_many()
                .filter(user_roles::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
            insert_roles(&txn, id, &role_ids, &now).await?;
        }

        txn.commit().await?;

        tracing::info!("Updated user {}", id);
        self.reload(id).await
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let items = item::Entity::delete_many()
            .filter(item::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        let emails = user_email::Entity::delete_many()
            .filter(user_email::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        let roles = user_roles::Entity::delete_many()
            .filter(user_roles::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = UserEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DomainError::NotFound);
        }

        txn.commit().await?;
        tracing::info!(
            "Deleted user {} with {} items, {} emails, {} role links",
            id,
            items.rows_affected,
            emails.rows_affected,
            roles.rows_affected
        );
        Ok(())
    }
}
