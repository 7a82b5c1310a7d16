//! Shared test utilities for `Wayfarer`.
//!
//! This module provides common helper functions for setting up test databases
//! and building test fixtures with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    catalog::Catalog,
    core::{
        items::{AttackItem, PriceRange, WeaponKind},
        state::{AdventureState, EnemyWeaponInit, Loadout},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all store integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The builtin catalog's starter weapon, as a standalone fixture.
#[must_use]
pub fn wooden_sword() -> AttackItem {
    AttackItem {
        name: "Wooden Sword".to_string(),
        kind: WeaponKind::Sword,
        damage: 7,
        health: 150,
        price: Some(PriceRange { min: 5, max: 15 }),
    }
}

/// A minimal valid loadout - one weapon, no armor.
#[must_use]
pub fn starter_loadout() -> Loadout {
    Loadout {
        attack: vec![wooden_sword()],
        ..Loadout::default()
    }
}

/// A fresh level-0 combat state for "Through the woods".
#[must_use]
pub fn sample_state() -> AdventureState {
    let catalog = Catalog::builtin();
    let adventure = catalog.adventure_by_name("Through the woods").unwrap();
    AdventureState::begin(adventure, &starter_loadout(), 0, EnemyWeaponInit::default()).unwrap()
}
