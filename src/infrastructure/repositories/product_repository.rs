//! SeaORM implementation of ProductRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::validation::require_name;
use crate::domain::{DomainError, Product, ProductRepository};
use crate::models::product::{self, ActiveModel, Entity as ProductEntity};

pub struct SeaOrmProductRepository {
    db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<product::Model> for Product {
    fn from(p: product::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>, DomainError> {
        let products = ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        Ok(products.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, DomainError> {
        Ok(ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Product::from))
    }

    async fn create(&self, name: String) -> Result<Product, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let product = ActiveModel {
            name: Set(require_name("product name", &name)?),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = product.insert(&self.db).await?;
        tracing::info!("Created product {} ({})", result.id, result.name);

        Ok(result.into())
    }

    async fn update(&self, id: i32, name: String) -> Result<Product, DomainError> {
        let existing = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(require_name("product name", &name)?);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(active.update(&self.db).await?.into())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = ProductEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted product {}", id);
        Ok(())
    }
}
