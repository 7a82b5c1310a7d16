//! In-memory implementation of [`CombatStore`].
//!
//! Backs the engine unit tests; state lives in a mutex-guarded map with the
//! same atomicity and compare-and-swap guarantees the SeaORM store provides.

use crate::{
    core::state::{AdventureState, Loadout},
    errors::{Error, Result},
    store::{CombatStore, PlayerProfile, StoredState, merge_loadout},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Default)]
struct PlayerRecord {
    gold: i64,
    experience: i64,
    loadout: Loadout,
}

#[derive(Debug, Default)]
struct Inner {
    players: HashMap<String, PlayerRecord>,
    states: HashMap<String, (AdventureState, i64)>,
}

/// A [`CombatStore`] that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    default_gold: i64,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store seeding new players with `default_gold`.
    #[must_use]
    pub fn new(default_gold: i64) -> Self {
        Self {
            default_gold,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| Error::Internal {
            message: "memory store mutex poisoned".to_string(),
        })
    }

    fn ensure_player<'a>(&self, inner: &'a mut Inner, user_id: &str) -> &'a mut PlayerRecord {
        inner
            .players
            .entry(user_id.to_string())
            .or_insert_with(|| PlayerRecord {
                gold: self.default_gold,
                experience: 0,
                loadout: Loadout::default(),
            })
    }
}

#[async_trait]
impl CombatStore for MemoryStore {
    async fn combat_state(&self, user_id: &str) -> Result<Option<StoredState>> {
        let inner = self.lock()?;
        Ok(inner.states.get(user_id).map(|(state, version)| StoredState {
            state: state.clone(),
            version: *version,
        }))
    }

    async fn insert_combat_state(&self, user_id: &str, state: &AdventureState) -> Result<i64> {
        let mut inner = self.lock()?;
        if inner.states.contains_key(user_id) {
            return Err(Error::ConcurrentModification);
        }
        inner
            .states
            .insert(user_id.to_string(), (state.clone(), 1));
        Ok(1)
    }

    async fn update_combat_state(
        &self,
        user_id: &str,
        state: &AdventureState,
        expected_version: i64,
    ) -> Result<i64> {
        let mut inner = self.lock()?;
        match inner.states.get_mut(user_id) {
            Some((stored, version)) if *version == expected_version => {
                *stored = state.clone();
                *version += 1;
                Ok(*version)
            }
            _ => Err(Error::ConcurrentModification),
        }
    }

    async fn clear_combat_state(&self, user_id: &str, expected_version: i64) -> Result<()> {
        let mut inner = self.lock()?;
        match inner.states.get(user_id) {
            Some((_, version)) if *version == expected_version => {
                inner.states.remove(user_id);
                Ok(())
            }
            _ => Err(Error::ConcurrentModification),
        }
    }

    async fn loadout(&self, user_id: &str) -> Result<Loadout> {
        let mut inner = self.lock()?;
        Ok(self.ensure_player(&mut inner, user_id).loadout.clone())
    }

    async fn set_loadout(&self, user_id: &str, loadout: &Loadout) -> Result<()> {
        let mut inner = self.lock()?;
        self.ensure_player(&mut inner, user_id).loadout = loadout.clone();
        Ok(())
    }

    async fn take_loadout(&self, user_id: &str) -> Result<Loadout> {
        let mut inner = self.lock()?;
        let record = self.ensure_player(&mut inner, user_id);
        Ok(std::mem::take(&mut record.loadout))
    }

    async fn restore_loadout(&self, user_id: &str, loadout: &Loadout) -> Result<()> {
        let mut inner = self.lock()?;
        let record = self.ensure_player(&mut inner, user_id);
        merge_loadout(&mut record.loadout, loadout);
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<PlayerProfile> {
        let mut inner = self.lock()?;
        let record = self.ensure_player(&mut inner, user_id);
        Ok(PlayerProfile {
            gold: record.gold,
            experience: record.experience,
            level: PlayerProfile::level_for(record.experience),
        })
    }

    async fn spend_gold(&self, user_id: &str, amount: i64) -> Result<()> {
        let mut inner = self.lock()?;
        let record = self.ensure_player(&mut inner, user_id);
        if record.gold < amount {
            return Err(Error::RequirementsNotMet {
                reason: format!("requires {amount} gold, you have {}", record.gold),
            });
        }
        record.gold -= amount;
        Ok(())
    }

    async fn grant_rewards(
        &self,
        user_id: &str,
        gold: i64,
        experience: i64,
    ) -> Result<PlayerProfile> {
        let mut inner = self.lock()?;
        let record = self.ensure_player(&mut inner, user_id);
        record.gold += gold;
        record.experience += experience;
        Ok(PlayerProfile {
            gold: record.gold,
            experience: record.experience,
            level: PlayerProfile::level_for(record.experience),
        })
    }
}
