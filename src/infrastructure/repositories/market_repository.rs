//! SeaORM implementation of MarketRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::validation::require_name;
use crate::domain::{DomainError, Market, MarketRepository};
use crate::models::market::{self, ActiveModel, Entity as MarketEntity};

/// SeaORM-based implementation of MarketRepository
pub struct SeaOrmMarketRepository {
    db: DatabaseConnection,
}

impl SeaOrmMarketRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<market::Model> for Market {
    fn from(m: market::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[async_trait]
impl MarketRepository for SeaOrmMarketRepository {
    async fn find_all(&self) -> Result<Vec<Market>, DomainError> {
        let markets = MarketEntity::find()
            .order_by_asc(market::Column::Id)
            .all(&self.db)
            .await?;

        Ok(markets.into_iter().map(Market::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Market>, DomainError> {
        let market = MarketEntity::find_by_id(id).one(&self.db).await?;
        Ok(market.map(Market::from))
    }

    async fn create(&self, name: String) -> Result<Market, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let market = ActiveModel {
            name: Set(require_name("market name", &name)?),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = market.insert(&self.db).await?;
        tracing::info!("Created market {} ({})", result.id, result.name);

        Ok(result.into())
    }

    async fn update(&self, id: i32, name: String) -> Result<Market, DomainError> {
        let existing = MarketEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(require_name("market name", &name)?);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(result.into())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = MarketEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted market {}", id);
        Ok(())
    }
}
