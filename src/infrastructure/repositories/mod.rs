//! Repository implementations using SeaORM

pub mod item_repository;
pub mod market_repository;
pub mod product_repository;
pub mod role_repository;
pub mod user_email_repository;
pub mod user_repository;

pub use item_repository::SeaOrmItemRepository;
pub use market_repository::SeaOrmMarketRepository;
pub use product_repository::SeaOrmProductRepository;
pub use role_repository::SeaOrmRoleRepository;
pub use user_email_repository::SeaOrmUserEmailRepository;
pub use user_repository::SeaOrmUserRepository;
