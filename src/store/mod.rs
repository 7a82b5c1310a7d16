//! Persistence adapter boundary consumed by the combat engine.
//!
//! The engine does not implement storage; it requires the guarantees below
//! from whatever document store backs it. [`database::SeaOrmStore`] is the
//! production implementation; [`memory::MemoryStore`] backs the engine tests.

/// SeaORM-backed store
pub mod database;
/// In-memory store for tests and local experiments
pub mod memory;

pub use database::SeaOrmStore;
pub use memory::MemoryStore;

use crate::{
    core::state::{AdventureState, Loadout},
    errors::Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Experience required per level.
pub const XP_PER_LEVEL: i64 = 100;

/// A user's economy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Gold balance
    pub gold: i64,
    /// Lifetime experience
    pub experience: i64,
    /// Level, derived from experience
    pub level: u32,
}

impl PlayerProfile {
    /// Derives the level for an experience total.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn level_for(experience: i64) -> u32 {
        if experience <= 0 {
            0
        } else {
            (experience / XP_PER_LEVEL) as u32
        }
    }
}

/// A combat state together with its concurrency version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredState {
    /// The persisted adventure state
    pub state: AdventureState,
    /// Version the state was read at; pass back on update
    pub version: i64,
}

/// The contract the adventure engine requires from the document store.
///
/// Every method is individually atomic with respect to concurrent commands
/// from the same user. `update_combat_state` additionally implements
/// compare-and-swap: a write against a stale version fails with
/// [`crate::errors::Error::ConcurrentModification`] and the caller retries by
/// re-reading current state.
#[async_trait]
pub trait CombatStore: Send + Sync {
    /// Loads a user's combat state, if one exists.
    async fn combat_state(&self, user_id: &str) -> Result<Option<StoredState>>;

    /// Creates a user's combat state at version 1. Fails with
    /// `ConcurrentModification` if a state already exists - starting never
    /// overwrites existing progress.
    async fn insert_combat_state(&self, user_id: &str, state: &AdventureState) -> Result<i64>;

    /// Replaces (not merges) a user's combat state, guarded by the version
    /// it was read at. Returns the new version.
    async fn update_combat_state(
        &self,
        user_id: &str,
        state: &AdventureState,
        expected_version: i64,
    ) -> Result<i64>;

    /// Removes a user's combat state, guarded by the version it was read
    /// at. Fails with `ConcurrentModification` when the state has changed
    /// or is already gone, so of two racing terminal transitions only one
    /// clears, restores gear, and grants rewards.
    async fn clear_combat_state(&self, user_id: &str, expected_version: i64) -> Result<()>;

    /// Reads a user's loadout without modifying it.
    async fn loadout(&self, user_id: &str) -> Result<Loadout>;

    /// Replaces a user's loadout.
    async fn set_loadout(&self, user_id: &str, loadout: &Loadout) -> Result<()>;

    /// Atomically clears every equip slot and returns what was equipped.
    /// No interleaving command can observe a half-applied transfer.
    async fn take_loadout(&self, user_id: &str) -> Result<Loadout>;

    /// Merges items back into a user's loadout: attack items are appended,
    /// armor fills empty slots, potion/shield are set if absent.
    async fn restore_loadout(&self, user_id: &str, loadout: &Loadout) -> Result<()>;

    /// Reads a user's economy snapshot, creating the row with defaults on
    /// first contact.
    async fn profile(&self, user_id: &str) -> Result<PlayerProfile>;

    /// Atomically deducts gold, failing with `RequirementsNotMet` when the
    /// balance is insufficient.
    async fn spend_gold(&self, user_id: &str, amount: i64) -> Result<()>;

    /// Atomically adds gold and experience, recomputing the level. Returns
    /// the updated profile.
    async fn grant_rewards(&self, user_id: &str, gold: i64, experience: i64)
    -> Result<PlayerProfile>;
}

/// Shared merge semantics for [`CombatStore::restore_loadout`].
pub(crate) fn merge_loadout(current: &mut Loadout, incoming: &Loadout) {
    current.attack.extend(incoming.attack.iter().cloned());
    for item in [
        &incoming.armor.helmet,
        &incoming.armor.chestplate,
        &incoming.armor.pants,
        &incoming.armor.boots,
    ]
    .into_iter()
    .flatten()
    {
        if current.armor.slot(item.slot).is_none() {
            current.armor.equip(item.clone());
        }
    }
    if current.potion.is_none() {
        current.potion = incoming.potion.clone();
    }
    if current.shield.is_none() {
        current.shield = incoming.shield.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{starter_loadout, wooden_sword};

    #[test]
    fn level_derivation() {
        assert_eq!(PlayerProfile::level_for(0), 0);
        assert_eq!(PlayerProfile::level_for(99), 0);
        assert_eq!(PlayerProfile::level_for(100), 1);
        assert_eq!(PlayerProfile::level_for(250), 2);
        assert_eq!(PlayerProfile::level_for(-5), 0);
    }

    #[test]
    fn merge_appends_attack_and_fills_empty_slots() {
        let mut current = Loadout::default();
        merge_loadout(&mut current, &starter_loadout());
        assert_eq!(current.attack.len(), 1);

        // Merging again appends another copy of the weapon.
        merge_loadout(&mut current, &starter_loadout());
        assert_eq!(current.attack.len(), 2);
        assert_eq!(current.attack[1], wooden_sword());
    }
}
