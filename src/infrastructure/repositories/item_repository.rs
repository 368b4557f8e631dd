//! SeaORM implementation of ItemRepository

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Select, Set,
};

use crate::domain::validation::{require_name, require_price};
use crate::domain::{
    CreateItemInput, DomainError, Item, ItemRepository, Market, Product, UpdateItemInput,
    UserSummary,
};
use crate::models::item::{self, ActiveModel, Column, Entity as ItemEntity};
use crate::models::{market, product, user};

/// SeaORM-based implementation of ItemRepository
pub struct SeaOrmItemRepository {
    db: DatabaseConnection,
}

impl SeaOrmItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_where(&self, query: Select<ItemEntity>) -> Result<Vec<Item>, DomainError> {
        let items = query.order_by_asc(Column::Id).all(&self.db).await?;
        hydrate(&self.db, items).await
    }

    async fn reload(&self, id: i32) -> Result<Item, DomainError> {
        self.find_by_id(id).await?.ok_or(DomainError::NotFound)
    }
}

impl From<user::Model> for UserSummary {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            primary_email: u.primary_email,
            name: u.name,
        }
    }
}

/// Attach seller, market and product to each item with one query per table.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    items: Vec<item::Model>,
) -> Result<Vec<Item>, DomainError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids: BTreeSet<i32> = items.iter().map(|i| i.user_id).collect();
    let market_ids: BTreeSet<i32> = items.iter().map(|i| i.market_id).collect();
    let product_ids: BTreeSet<i32> = items.iter().map(|i| i.product_id).collect();

    let users: HashMap<i32, UserSummary> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();

    let markets: HashMap<i32, Market> = market::Entity::find()
        .filter(market::Column::Id.is_in(market_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, Market::from(m)))
        .collect();

    let products: HashMap<i32, Product> = product::Entity::find()
        .filter(product::Column::Id.is_in(product_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, Product::from(p)))
        .collect();

    items
        .into_iter()
        .map(|i| {
            let dangling = |what: &str, target: i32| {
                DomainError::Internal(format!("item {} references missing {} {}", i.id, what, target))
            };

            let user = users
                .get(&i.user_id)
                .cloned()
                .ok_or_else(|| dangling("user", i.user_id))?;
            let market = markets
                .get(&i.market_id)
                .cloned()
                .ok_or_else(|| dangling("market", i.market_id))?;
            let product = products
                .get(&i.product_id)
                .cloned()
                .ok_or_else(|| dangling("product", i.product_id))?;

            Ok(Item {
                id: i.id,
                name: i.name,
                description: i.description,
                price: i.price,
                user,
                market,
                product,
                created_at: i.created_at,
                updated_at: i.updated_at,
            })
        })
        .collect()
}

#[async_trait]
impl ItemRepository for SeaOrmItemRepository {
    async fn find_all(&self) -> Result<Vec<Item>, DomainError> {
        self.find_where(ItemEntity::find()).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Item>, DomainError> {
        let item = match ItemEntity::find_by_id(id).one(&self.db).await? {
            Some(item) => item,
            None => return Ok(None),
        };

        Ok(hydrate(&self.db, vec![item]).await?.pop())
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Item>, DomainError> {
        self.find_where(ItemEntity::find().filter(Column::UserId.eq(user_id)))
            .await
    }

    async fn find_by_market(&self, market_id: i32) -> Result<Vec<Item>, DomainError> {
        self.find_where(ItemEntity::find().filter(Column::MarketId.eq(market_id)))
            .await
    }

    async fn find_by_product(&self, product_id: i32) -> Result<Vec<Item>, DomainError> {
        self.find_where(ItemEntity::find().filter(Column::ProductId.eq(product_id)))
            .await
    }

    async fn create(&self, input: CreateItemInput) -> Result<Item, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_item = ActiveModel {
            name: Set(require_name("item name", &input.name)?),
            description: Set(input.description),
            price: Set(require_price(input.price)?),
            user_id: Set(input.user_id),
            market_id: Set(input.market_id),
            product_id: Set(input.product_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_item.insert(&self.db).await.map_err(|e| {
            tracing::warn!(
                "Refused item for user {}, market {}, product {}: {}",
                input.user_id,
                input.market_id,
                input.product_id,
                e
            );
            DomainError::from(e)
        })?;
        tracing::info!("Created item {} for user {}", result.id, result.user_id);

        self.reload(result.id).await
    }

    async fn update(&self, id: i32, input: UpdateItemInput) -> Result<Item, DomainError> {
        let existing = ItemEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();

        if let Some(name) = input.name {
            active.name = Set(require_name("item name", &name)?);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(price) = input.price {
            active.price = Set(require_price(price)?);
        }
        if let Some(user_id) = input.user_id {
            active.user_id = Set(user_id);
        }
        if let Some(market_id) = input.market_id {
            active.market_id = Set(market_id);
        }
        if let Some(product_id) = input.product_id {
            active.product_id = Set(product_id);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        self.reload(result.id).await
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = ItemEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted item {}", id);
        Ok(())
    }
}
