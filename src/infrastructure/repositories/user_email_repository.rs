//! SeaORM implementation of UserEmailRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::validation::require_email;
use crate::domain::{DomainError, UserEmail, UserEmailRepository};
use crate::models::user::normalize_email;
use crate::models::user_email::{self, ActiveModel, Column, Entity as UserEmailEntity};

pub struct SeaOrmUserEmailRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserEmailRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<user_email::Model> for UserEmail {
    fn from(e: user_email::Model) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            useremail: e.useremail,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[async_trait]
impl UserEmailRepository for SeaOrmUserEmailRepository {
    async fn find_all(&self) -> Result<Vec<UserEmail>, DomainError> {
        let emails = UserEmailEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(emails.into_iter().map(UserEmail::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserEmail>, DomainError> {
        Ok(UserEmailEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(UserEmail::from))
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<UserEmail>, DomainError> {
        let emails = UserEmailEntity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(emails.into_iter().map(UserEmail::from).collect())
    }

    async fn create(&self, user_id: i32, useremail: String) -> Result<UserEmail, DomainError> {
        require_email(&useremail)?;
        let now = chrono::Utc::now().to_rfc3339();

        let email = ActiveModel {
            user_id: Set(user_id),
            useremail: Set(normalize_email(&useremail)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = email.insert(&self.db).await?;
        tracing::debug!("Added email {} to user {}", result.id, user_id);

        Ok(result.into())
    }

    async fn update(&self, id: i32, useremail: String) -> Result<UserEmail, DomainError> {
        require_email(&useremail)?;

        let existing = UserEmailEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.useremail = Set(normalize_email(&useremail));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(active.update(&self.db).await?.into())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = UserEmailEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
