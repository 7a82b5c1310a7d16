//! SeaORM implementation of [`CombatStore`] backed by SQLite.
//!
//! Combat state and loadouts are stored as JSON documents. The at-most-one
//! combat state per user invariant is enforced by the primary key on
//! `user_id`; compare-and-swap writes go through `update_many` filtered on
//! the version column, checking `rows_affected` to detect a stale write.

use crate::{
    core::state::{AdventureState, Loadout},
    entities::{CombatState, CombatStateColumn, Player, PlayerColumn, combat_state, player},
    errors::{Error, Result},
    store::{CombatStore, PlayerProfile, StoredState, merge_loadout},
};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait, sea_query::Expr,
};

/// The production [`CombatStore`].
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    default_gold: i64,
}

impl SeaOrmStore {
    /// Wraps an open connection. New player rows are seeded with
    /// `default_gold`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, default_gold: i64) -> Self {
        Self { db, default_gold }
    }

    /// Finds the player row, creating it with defaults on first contact.
    async fn ensure_player<C>(&self, db: &C, user_id: &str) -> Result<player::Model>
    where
        C: ConnectionTrait,
    {
        if let Some(model) = Player::find_by_id(user_id).one(db).await? {
            return Ok(model);
        }

        tracing::debug!(user_id, "creating player row with defaults");
        let model = player::ActiveModel {
            user_id: Set(user_id.to_string()),
            gold: Set(self.default_gold),
            experience: Set(0),
            level: Set(0),
            loadout: Set(serde_json::to_value(Loadout::default())?),
        };
        model.insert(db).await.map_err(Into::into)
    }
}

fn profile_of(model: &player::Model) -> PlayerProfile {
    PlayerProfile {
        gold: model.gold,
        experience: model.experience,
        level: PlayerProfile::level_for(model.experience),
    }
}

#[async_trait]
impl CombatStore for SeaOrmStore {
    async fn combat_state(&self, user_id: &str) -> Result<Option<StoredState>> {
        let Some(row) = CombatState::find_by_id(user_id).one(&self.db).await? else {
            return Ok(None);
        };
        let state: AdventureState = serde_json::from_value(row.state)?;
        Ok(Some(StoredState {
            state,
            version: row.version,
        }))
    }

    async fn insert_combat_state(&self, user_id: &str, state: &AdventureState) -> Result<i64> {
        let model = combat_state::ActiveModel {
            user_id: Set(user_id.to_string()),
            state: Set(serde_json::to_value(state)?),
            version: Set(1),
            updated_at: Set(chrono::Utc::now()),
        };
        // The primary key rejects a second row for the same user; map the
        // unique violation to the concurrency error the engine retries on.
        match model.insert(&self.db).await {
            Ok(_) => Ok(1),
            Err(err) if matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
                Err(Error::ConcurrentModification)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update_combat_state(
        &self,
        user_id: &str,
        state: &AdventureState,
        expected_version: i64,
    ) -> Result<i64> {
        let result = CombatState::update_many()
            .col_expr(CombatStateColumn::State, Expr::value(serde_json::to_value(state)?))
            .col_expr(
                CombatStateColumn::Version,
                Expr::col(CombatStateColumn::Version).add(1),
            )
            .col_expr(CombatStateColumn::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(CombatStateColumn::UserId.eq(user_id))
            .filter(CombatStateColumn::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::ConcurrentModification);
        }
        Ok(expected_version + 1)
    }

    async fn clear_combat_state(&self, user_id: &str, expected_version: i64) -> Result<()> {
        let result = CombatState::delete_many()
            .filter(CombatStateColumn::UserId.eq(user_id))
            .filter(CombatStateColumn::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::ConcurrentModification);
        }
        Ok(())
    }

    async fn loadout(&self, user_id: &str) -> Result<Loadout> {
        let model = self.ensure_player(&self.db, user_id).await?;
        serde_json::from_value(model.loadout).map_err(Into::into)
    }

    async fn set_loadout(&self, user_id: &str, loadout: &Loadout) -> Result<()> {
        let model = self.ensure_player(&self.db, user_id).await?;
        let mut active: player::ActiveModel = model.into();
        active.loadout = Set(serde_json::to_value(loadout)?);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn take_loadout(&self, user_id: &str) -> Result<Loadout> {
        let txn = self.db.begin().await?;

        let model = self.ensure_player(&txn, user_id).await?;
        let taken: Loadout = serde_json::from_value(model.loadout.clone())?;

        let mut active: player::ActiveModel = model.into();
        active.loadout = Set(serde_json::to_value(Loadout::default())?);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(taken)
    }

    async fn restore_loadout(&self, user_id: &str, loadout: &Loadout) -> Result<()> {
        let txn = self.db.begin().await?;

        let model = self.ensure_player(&txn, user_id).await?;
        let mut current: Loadout = serde_json::from_value(model.loadout.clone())?;
        merge_loadout(&mut current, loadout);

        let mut active: player::ActiveModel = model.into();
        active.loadout = Set(serde_json::to_value(current)?);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<PlayerProfile> {
        let model = self.ensure_player(&self.db, user_id).await?;
        Ok(profile_of(&model))
    }

    async fn spend_gold(&self, user_id: &str, amount: i64) -> Result<()> {
        let txn = self.db.begin().await?;

        let model = self.ensure_player(&txn, user_id).await?;
        if model.gold < amount {
            return Err(Error::RequirementsNotMet {
                reason: format!("requires {amount} gold, you have {}", model.gold),
            });
        }

        Player::update_many()
            .col_expr(
                PlayerColumn::Gold,
                Expr::col(PlayerColumn::Gold).sub(amount),
            )
            .filter(PlayerColumn::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn grant_rewards(
        &self,
        user_id: &str,
        gold: i64,
        experience: i64,
    ) -> Result<PlayerProfile> {
        let txn = self.db.begin().await?;

        let model = self.ensure_player(&txn, user_id).await?;
        let new_gold = model.gold + gold;
        let new_experience = model.experience + experience;
        let new_level = i64::from(PlayerProfile::level_for(new_experience));

        let mut active: player::ActiveModel = model.into();
        active.gold = Set(new_gold);
        active.experience = Set(new_experience);
        active.level = Set(new_level);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(profile_of(&updated))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{sample_state, setup_test_db, starter_loadout};

    async fn test_store() -> Result<SeaOrmStore> {
        let db = setup_test_db().await?;
        Ok(SeaOrmStore::new(db, 10))
    }

    #[tokio::test]
    async fn profile_created_on_first_contact() -> Result<()> {
        let store = test_store().await?;

        let profile = store.profile("user1").await?;
        assert_eq!(profile.gold, 10);
        assert_eq!(profile.experience, 0);
        assert_eq!(profile.level, 0);

        // Second read hits the existing row.
        let again = store.profile("user1").await?;
        assert_eq!(again, profile);
        Ok(())
    }

    #[tokio::test]
    async fn combat_state_roundtrip() -> Result<()> {
        let store = test_store().await?;
        let state = sample_state();

        assert!(store.combat_state("user1").await?.is_none());
        store.insert_combat_state("user1", &state).await?;

        let stored = store.combat_state("user1").await?.unwrap();
        assert_eq!(stored.state, state);
        assert_eq!(stored.version, 1);

        store.clear_combat_state("user1", 1).await?;
        assert!(store.combat_state("user1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn stale_clear_is_rejected() -> Result<()> {
        let store = test_store().await?;
        let mut state = sample_state();
        store.insert_combat_state("user1", &state).await?;

        state.turns_taken = 1;
        store.update_combat_state("user1", &state, 1).await?;

        // A clear against the pre-update version loses; the state survives.
        let stale = store.clear_combat_state("user1", 1).await;
        assert!(matches!(stale, Err(Error::ConcurrentModification)));
        assert!(store.combat_state("user1").await?.is_some());

        store.clear_combat_state("user1", 2).await?;
        let gone = store.clear_combat_state("user1", 2).await;
        assert!(matches!(gone, Err(Error::ConcurrentModification)));
        Ok(())
    }

    #[tokio::test]
    async fn second_insert_is_rejected() -> Result<()> {
        let store = test_store().await?;
        let state = sample_state();

        store.insert_combat_state("user1", &state).await?;
        let result = store.insert_combat_state("user1", &state).await;
        assert!(matches!(result, Err(Error::ConcurrentModification)));
        Ok(())
    }

    #[tokio::test]
    async fn update_is_compare_and_swap() -> Result<()> {
        let store = test_store().await?;
        let mut state = sample_state();
        store.insert_combat_state("user1", &state).await?;

        state.turns_taken = 1;
        let v2 = store.update_combat_state("user1", &state, 1).await?;
        assert_eq!(v2, 2);

        let stale = store.update_combat_state("user1", &state, 1).await;
        assert!(matches!(stale, Err(Error::ConcurrentModification)));

        let stored = store.combat_state("user1").await?.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.state.turns_taken, 1);
        Ok(())
    }

    #[tokio::test]
    async fn take_and_restore_loadout() -> Result<()> {
        let store = test_store().await?;
        store.set_loadout("user1", &starter_loadout()).await?;

        let taken = store.take_loadout("user1").await?;
        assert!(taken.has_attack_item());
        assert!(store.loadout("user1").await?.is_empty());

        store.restore_loadout("user1", &taken).await?;
        let restored = store.loadout("user1").await?;
        assert_eq!(restored.attack, taken.attack);
        Ok(())
    }

    #[tokio::test]
    async fn spend_gold_insufficient_balance() -> Result<()> {
        let store = test_store().await?;

        let result = store.spend_gold("user1", 25).await;
        assert!(matches!(result, Err(Error::RequirementsNotMet { .. })));
        // Balance unchanged.
        assert_eq!(store.profile("user1").await?.gold, 10);

        store.spend_gold("user1", 4).await?;
        assert_eq!(store.profile("user1").await?.gold, 6);
        Ok(())
    }

    #[tokio::test]
    async fn rewards_update_level() -> Result<()> {
        let store = test_store().await?;

        let profile = store.grant_rewards("user1", 7, 130).await?;
        assert_eq!(profile.gold, 17);
        assert_eq!(profile.experience, 130);
        assert_eq!(profile.level, 1);

        // Level is denormalized onto the row too.
        let row = Player::find_by_id("user1")
            .one(&store.db)
            .await?
            .unwrap();
        assert_eq!(row.level, 1);
        Ok(())
    }
}
