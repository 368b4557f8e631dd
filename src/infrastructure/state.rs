//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    ItemRepository, MarketRepository, ProductRepository, RoleRepository, UserEmailRepository,
    UserRepository,
};
use crate::infrastructure::{
    SeaOrmItemRepository, SeaOrmMarketRepository, SeaOrmProductRepository, SeaOrmRoleRepository,
    SeaOrmUserEmailRepository, SeaOrmUserRepository,
};

/// Repositories shared across the application
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub user_repo: Arc<dyn UserRepository>,
    pub user_email_repo: Arc<dyn UserEmailRepository>,
    pub role_repo: Arc<dyn RoleRepository>,
    pub item_repo: Arc<dyn ItemRepository>,
    pub market_repo: Arc<dyn MarketRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(SeaOrmUserRepository::new(db.clone())),
            user_email_repo: Arc::new(SeaOrmUserEmailRepository::new(db.clone())),
            role_repo: Arc::new(SeaOrmRoleRepository::new(db.clone())),
            item_repo: Arc::new(SeaOrmItemRepository::new(db.clone())),
            market_repo: Arc::new(SeaOrmMarketRepository::new(db.clone())),
            product_repo: Arc::new(SeaOrmProductRepository::new(db.clone())),
            db,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
