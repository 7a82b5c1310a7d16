//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod combat_state;
pub mod player;

// Re-export specific types to avoid conflicts
pub use combat_state::{
    Column as CombatStateColumn, Entity as CombatState, Model as CombatStateModel,
};
pub use player::{Column as PlayerColumn, Entity as Player, Model as PlayerModel};
