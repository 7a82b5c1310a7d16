//! Database connection and schema setup.
//!
//! `SQLite` via `SeaORM`; tables are generated from the entity definitions
//! with `Schema::create_table_from_entity`, so the schema always matches the
//! Rust structs without hand-written SQL. Table creation is idempotent.

use crate::entities::{CombatState, Player};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::TableCreateStatement};

/// Connects to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the player and combat-state tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut player_table: TableCreateStatement = schema.create_table_from_entity(Player);
    let mut combat_state_table: TableCreateStatement = schema.create_table_from_entity(CombatState);

    db.execute(builder.build(player_table.if_not_exists()))
        .await?;
    db.execute(builder.build(combat_state_table.if_not_exists()))
        .await?;

    Ok(())
}
