//! Player entity - one row per Discord user the bot has seen.
//!
//! Holds the economy fields (gold, experience, level) and the equipped
//! loadout as a JSON document. Rows are created lazily the first time a user
//! runs a command that needs them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Player database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
    /// Discord user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Gold balance, seeded from the configured default on creation
    pub gold: i64,
    /// Lifetime experience
    pub experience: i64,
    /// Level derived from experience, denormalized for queries
    pub level: i64,
    /// Equipped loadout outside of combat, as a JSON document
    pub loadout: Json,
}

/// Players have no relations to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
