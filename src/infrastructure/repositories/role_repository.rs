//! SeaORM implementation of RoleRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::validation::require_name;
use crate::domain::{DomainError, Role, RoleRepository};
use crate::models::role::{self, ActiveModel, Entity as RoleEntity};
use crate::models::user_roles;

pub struct SeaOrmRoleRepository {
    db: DatabaseConnection,
}

impl SeaOrmRoleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // Names differing only in case would grant the same authority.
    async fn ensure_name_free(&self, name: &str, except: Option<i32>) -> Result<(), DomainError> {
        let taken = RoleEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(role::Column::Name))).eq(name.to_lowercase()),
            )
            .one(&self.db)
            .await?;

        match taken {
            Some(existing) if Some(existing.id) != except => {
                tracing::warn!("Role name already in use: {}", name);
                Err(DomainError::Conflict(format!("role '{}' already exists", name)))
            }
            _ => Ok(()),
        }
    }
}

impl From<role::Model> for Role {
    fn from(r: role::Model) -> Self {
        Self {
            id: r.id,
            name: r.name,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[async_trait]
impl RoleRepository for SeaOrmRoleRepository {
    async fn find_all(&self) -> Result<Vec<Role>, DomainError> {
        let roles = RoleEntity::find()
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await?;

        Ok(roles.into_iter().map(Role::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, DomainError> {
        Ok(RoleEntity::find_by_id(id).one(&self.db).await?.map(Role::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, DomainError> {
        let role = RoleEntity::find()
            .filter(role::Column::Name.eq(name.trim()))
            .one(&self.db)
            .await?;

        Ok(role.map(Role::from))
    }

    async fn create(&self, name: String) -> Result<Role, DomainError> {
        let name = require_name("role name", &name)?;
        self.ensure_name_free(&name, None).await?;

        let now = chrono::Utc::now().to_rfc3339();
        let role = ActiveModel {
            name: Set(name),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = role.insert(&self.db).await?;
        tracing::info!("Created role {} ({})", result.id, result.name);

        Ok(result.into())
    }

    async fn update(&self, id: i32, name: String) -> Result<Role, DomainError> {
        let existing = RoleEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let name = require_name("role name", &name)?;
        self.ensure_name_free(&name, Some(id)).await?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(name);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(active.update(&self.db).await?.into())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        user_roles::Entity::delete_many()
            .filter(user_roles::Column::RoleId.eq(id))
            .exec(&txn)
            .await?;

        let result = RoleEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DomainError::NotFound);
        }

        txn.commit().await?;
        tracing::info!("Deleted role {}", id);
        Ok(())
    }
}
