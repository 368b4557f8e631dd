use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketplace::models::{item, market, product, role, user, user_email};
use marketplace::{config, db};

async fn report(db: &DatabaseConnection) -> Result<(), DbErr> {
    tracing::info!("users: {}", user::Entity::find().count(db).await?);
    tracing::info!("user_emails: {}", user_email::Entity::find().count(db).await?);
    tracing::info!("roles: {}", role::Entity::find().count(db).await?);
    tracing::info!("markets: {}", market::Entity::find().count(db).await?);
    tracing::info!("products: {}", product::Entity::find().count(db).await?);
    tracing::info!("items: {}", item::Entity::find().count(db).await?);
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketplace=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();
    tracing::info!(
        "Profile '{}', database {}",
        config.profile,
        config.database_url
    );

    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = report(&db).await {
        tracing::error!("Failed to read table sizes: {}", e);
        std::process::exit(1);
    }
}
