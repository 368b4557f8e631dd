use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, Schema,
    Statement,
};

use crate::models::{item, market, product, role, user, user_email, user_roles};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    if db.get_database_backend() == DatabaseBackend::Sqlite {
        db.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA foreign_keys = ON".to_owned(),
        ))
        .await?;
    }

    create_schema(&db).await?;

    Ok(db)
}

/// Create every missing table from the entity definitions, foreign keys included.
///
/// Referenced tables come first so the statements also run on backends that
/// check FK targets at creation time.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        table(&schema, user::Entity),
        table(&schema, role::Entity),
        table(&schema, market::Entity),
        table(&schema, product::Entity),
        table(&schema, user_email::Entity),
        table(&schema, user_roles::Entity),
        table(&schema, item::Entity),
    ];

    let count = statements.len();
    for stmt in statements {
        db.execute(backend.build(&stmt)).await?;
    }

    tracing::info!("Schema ready ({} tables)", count);

    Ok(())
}

fn table<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    stmt
}
