//! Pure turn resolution for adventure combat.
//!
//! Every function here is a plain function of the current state, the action
//! and a random source; persistence and Discord concerns live elsewhere.
//! Randomness is injected so tests can seed it.

use crate::{
    catalog::Adventure,
    core::{
        items::{ArmorSlot, Item, WeaponInstance},
        scaling::scale_int,
        state::AdventureState,
    },
};
use rand::Rng;

/// Probability that a defend action avoids incoming damage this turn.
pub const DEFENSE_CHANCE: f64 = 0.65;

/// Durability removed from the player's weapon per swing.
pub const WEAPON_WEAR_PER_SWING: i64 = 1;

/// What happened during one combat turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Damage the player dealt to the enemy
    pub damage_dealt: i64,
    /// Damage the enemy dealt back (absorbed by armor first)
    pub damage_taken: i64,
    /// Name of the weapon the player swung, if any
    pub weapon_used: Option<String>,
    /// For defend turns, whether the defense roll succeeded
    pub defended: Option<bool>,
    /// The current enemy dropped to zero health this turn
    pub enemy_defeated: bool,
    /// Every equipped attack item is broken; the player can no longer fight
    pub player_defeated: bool,
}

/// Rewards granted at the end of an adventure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardGrant {
    /// Gold granted
    pub gold: i64,
    /// Experience granted
    pub experience: i64,
    /// Loot - gear of droppable enemies defeated along the way
    pub loot: Vec<Item>,
}

/// Uniform draw compared against [`DEFENSE_CHANCE`].
pub fn defend_roll<R: Rng>(rng: &mut R) -> bool {
    rng.random::<f64>() < DEFENSE_CHANCE
}

/// Resolves one attack turn: the player swings their first usable weapon,
/// then the enemy (if still standing) strikes back.
///
/// Only `current_health` fields and the turn counter change; item identities
/// and the adventure name are never touched.
pub fn attack_turn<R: Rng>(state: &mut AdventureState, _rng: &mut R) -> TurnReport {
    let mut report = TurnReport::default();

    let Some(weapon) = state
        .equipped
        .attack
        .iter_mut()
        .find(|w| w.is_usable())
    else {
        report.player_defeated = true;
        return report;
    };

    report.weapon_used = Some(weapon.item.name.clone());
    report.damage_dealt = weapon.item.damage;
    weapon.current_health = (weapon.current_health - WEAPON_WEAR_PER_SWING).max(0);

    state.current_enemy.current_health =
        (state.current_enemy.current_health - report.damage_dealt).max(0);

    if state.current_enemy.is_alive() {
        report.damage_taken = enemy_strike(state);
        report.player_defeated = !state.can_fight();
    } else {
        report.enemy_defeated = true;
    }

    state.turns_taken += 1;
    report
}

/// Resolves one defend turn: a Bernoulli trial with [`DEFENSE_CHANCE`]
/// success probability decides whether the enemy's strike lands.
pub fn defend_turn<R: Rng>(state: &mut AdventureState, rng: &mut R) -> TurnReport {
    let mut report = TurnReport::default();

    let defended = defend_roll(rng);
    report.defended = Some(defended);
    if defended {
        // Wear still accrues on the enemy side; a blocked strike was swung.
        wear_enemy_weapon(state);
    } else {
        report.damage_taken = enemy_strike(state);
        report.player_defeated = !state.can_fight();
    }

    state.turns_taken += 1;
    report
}

/// Draws gold and experience from the adventure's reward envelope, scaled by
/// level, and collects loot from droppable enemies.
pub fn roll_rewards<R: Rng>(adventure: &Adventure, level: u32, rng: &mut R) -> RewardGrant {
    let rewards = &adventure.rewards;
    let gold = roll_range(rng, rewards.min_gold, rewards.max_gold, level);
    let experience = roll_range(rng, rewards.min_experience, rewards.max_experience, level);

    let loot = adventure
        .enemies
        .iter()
        .filter(|e| e.droppable)
        .flat_map(|e| {
            std::iter::once(Item::Attack(e.weapon.clone()))
                .chain(e.armor.clone().map(Item::Armor))
        })
        .collect();

    RewardGrant {
        gold,
        experience,
        loot,
    }
}

fn roll_range<R: Rng>(rng: &mut R, min: i64, max: i64, level: u32) -> i64 {
    let min = scale_int(min, level);
    let max = scale_int(max, level).max(min);
    rng.random_range(min..=max)
}

/// The enemy swings its weapon. Damage is absorbed by armor slots in order
/// before spilling into the player's attack items. Returns the incoming
/// damage.
fn enemy_strike(state: &mut AdventureState) -> i64 {
    let incoming = state.current_enemy.weapon.item.damage;
    wear_enemy_weapon(state);

    let mut remaining = incoming;
    for slot in ArmorSlot::ALL {
        if remaining == 0 {
            break;
        }
        if let Some(piece) = state.equipped.armor.slot_mut(slot) {
            let absorbed = remaining.min(piece.current_health);
            piece.current_health -= absorbed;
            remaining -= absorbed;
        }
    }

    for weapon in &mut state.equipped.attack {
        if remaining == 0 {
            break;
        }
        if weapon.is_usable() {
            let absorbed = remaining.min(weapon.current_health);
            weapon.current_health -= absorbed;
            remaining -= absorbed;
        }
    }
    // Any leftover damage has nowhere to land; the player's gear is gone.

    incoming
}

fn wear_enemy_weapon(state: &mut AdventureState) {
    let weapon = &mut state.current_enemy.weapon;
    weapon.current_health = (weapon.current_health - WEAPON_WEAR_PER_SWING).max(0);
}

/// First usable weapon in a snapshot, for display.
#[must_use]
pub fn active_weapon(state: &AdventureState) -> Option<&WeaponInstance> {
    state.equipped.attack.iter().find(|w| w.is_usable())
}
