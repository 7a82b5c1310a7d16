//! Combat state entity - at most one row per user.
//!
//! The adventure state itself is a JSON document; the primary key on
//! `user_id` is what enforces the at-most-one-active-adventure invariant at
//! the storage level, and `version` carries the optimistic-concurrency
//! counter for compare-and-swap writes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Combat state database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "combat_states")]
pub struct Model {
    /// Discord user ID owning this state
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// The serialized `AdventureState` document
    pub state: Json,
    /// Optimistic-concurrency version, incremented on every turn write
    pub version: i64,
    /// Last write time
    pub updated_at: DateTimeUtc,
}

/// Combat states have no relations to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
