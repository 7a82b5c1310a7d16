//! The persisted per-user `AdventureState` and the loadout it is snapshotted
//! from.
//!
//! At most one `AdventureState` exists per user at any time; it is created
//! when the user confirms an adventure start, mutated by each combat turn
//! (health fields only - item identities and the adventure name never change
//! after creation), and destroyed on victory, defeat or surrender.

use crate::{
    catalog::{Adventure, Enemy},
    core::{
        items::{ArmorInstance, ArmorItem, ArmorSlot, AttackItem, PotionItem, ShieldItem, WeaponInstance},
        scaling::scale_int,
    },
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};

/// Armor templates equipped outside of combat, one per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorLoadout {
    /// Head slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helmet: Option<ArmorItem>,
    /// Torso slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chestplate: Option<ArmorItem>,
    /// Leg slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pants: Option<ArmorItem>,
    /// Feet slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boots: Option<ArmorItem>,
}

impl ArmorLoadout {
    /// The piece occupying `slot`, if any.
    #[must_use]
    pub const fn slot(&self, slot: ArmorSlot) -> Option<&ArmorItem> {
        match slot {
            ArmorSlot::Helmet => self.helmet.as_ref(),
            ArmorSlot::Chestplate => self.chestplate.as_ref(),
            ArmorSlot::Pants => self.pants.as_ref(),
            ArmorSlot::Boots => self.boots.as_ref(),
        }
    }

    /// Equips `item` into its slot, replacing any previous piece.
    pub fn equip(&mut self, item: ArmorItem) {
        match item.slot {
            ArmorSlot::Helmet => self.helmet = Some(item),
            ArmorSlot::Chestplate => self.chestplate = Some(item),
            ArmorSlot::Pants => self.pants = Some(item),
            ArmorSlot::Boots => self.boots = Some(item),
        }
    }
}

/// The set of items a user has equipped outside of any active adventure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    /// Equipped attack items
    #[serde(default)]
    pub attack: Vec<AttackItem>,
    /// Equipped armor, per slot
    #[serde(default)]
    pub armor: ArmorLoadout,
    /// Equipped potion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potion: Option<PotionItem>,
    /// Equipped shield
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield: Option<ShieldItem>,
}

impl Loadout {
    /// Whether the user has at least one attack item equipped - the entry
    /// requirement for combat.
    #[must_use]
    pub fn has_attack_item(&self) -> bool {
        !self.attack.is_empty()
    }

    /// Whether nothing at all is equipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attack.is_empty()
            && self.armor == ArmorLoadout::default()
            && self.potion.is_none()
            && self.shield.is_none()
    }
}

/// Armor instances carried into combat, one per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorSnapshot {
    /// Head slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helmet: Option<ArmorInstance>,
    /// Torso slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chestplate: Option<ArmorInstance>,
    /// Leg slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pants: Option<ArmorInstance>,
    /// Feet slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boots: Option<ArmorInstance>,
}

impl ArmorSnapshot {
    fn from_loadout(armor: &ArmorLoadout) -> Self {
        Self {
            helmet: armor.helmet.clone().map(ArmorInstance::fresh),
            chestplate: armor.chestplate.clone().map(ArmorInstance::fresh),
            pants: armor.pants.clone().map(ArmorInstance::fresh),
            boots: armor.boots.clone().map(ArmorInstance::fresh),
        }
    }

    /// Mutable access to the piece occupying `slot`.
    #[must_use]
    pub const fn slot_mut(&mut self, slot: ArmorSlot) -> Option<&mut ArmorInstance> {
        match slot {
            ArmorSlot::Helmet => self.helmet.as_mut(),
            ArmorSlot::Chestplate => self.chestplate.as_mut(),
            ArmorSlot::Pants => self.pants.as_mut(),
            ArmorSlot::Boots => self.boots.as_mut(),
        }
    }

    /// Shared access to the piece occupying `slot`.
    #[must_use]
    pub const fn slot(&self, slot: ArmorSlot) -> Option<&ArmorInstance> {
        match slot {
            ArmorSlot::Helmet => self.helmet.as_ref(),
            ArmorSlot::Chestplate => self.chestplate.as_ref(),
            ArmorSlot::Pants => self.pants.as_ref(),
            ArmorSlot::Boots => self.boots.as_ref(),
        }
    }
}

/// The user's loadout frozen into combat instances at adventure start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedSnapshot {
    /// Attack item instances, each stamped at full durability
    pub attack: Vec<WeaponInstance>,
    /// Armor instances, per slot
    #[serde(default)]
    pub armor: ArmorSnapshot,
}

/// How an enemy's weapon durability is initialized at adventure start.
///
/// The legacy catalog data ships enemy weapons at zero durability, which
/// reads like a bug (the weapon appears already broken); kept configurable
/// pending a balance decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnemyWeaponInit {
    /// `current_health = 0`, matching the legacy catalog data.
    #[default]
    Broken,
    /// `current_health = health`.
    AtMax,
}

/// The live enemy the user is currently fighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Enemy name - identity, never changes after creation
    pub name: String,
    /// Scaled maximum health
    pub health: i64,
    /// Remaining health
    pub current_health: i64,
    /// The enemy's weapon instance (damage pre-scaled)
    pub weapon: WeaponInstance,
    /// Enemy armor slots. Not populated by any current catalog entry.
    #[serde(default)]
    pub armor: ArmorSnapshot,
}

impl EnemySnapshot {
    /// Derives a combat instance from an enemy template, scaled for `level`.
    #[must_use]
    pub fn derive(enemy: &Enemy, level: u32, weapon_init: EnemyWeaponInit) -> Self {
        let health = scale_int(enemy.health, level);
        let mut weapon = enemy.weapon.clone();
        weapon.damage = scale_int(weapon.damage, level);
        let weapon_health = match weapon_init {
            EnemyWeaponInit::Broken => 0,
            EnemyWeaponInit::AtMax => weapon.health,
        };
        Self {
            name: enemy.name.clone(),
            health,
            current_health: health,
            weapon: WeaponInstance {
                item: weapon,
                current_health: weapon_health,
            },
            armor: ArmorSnapshot::default(),
        }
    }

    /// Whether this enemy is still standing.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_health > 0
    }
}

/// One user's in-progress adventure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureState {
    /// Adventure key, used to re-resolve the template. Denormalized; can
    /// dangle if the catalog changes between versions.
    pub adventure: String,
    /// Index of the current enemy within the adventure's encounter sequence.
    #[serde(default)]
    pub enemy_index: usize,
    /// The loadout frozen at start time.
    pub equipped: EquippedSnapshot,
    /// The enemy currently engaged.
    pub current_enemy: EnemySnapshot,
    /// Turns taken so far, for display.
    #[serde(default)]
    pub turns_taken: u32,
}

impl AdventureState {
    /// Creates the state for a freshly accepted adventure.
    ///
    /// The loadout must contain at least one attack item; each snapshotted
    /// item is stamped with `current_health` equal to its template health.
    /// Enemy index 0 is engaged first.
    pub fn begin(
        adventure: &Adventure,
        loadout: &Loadout,
        level: u32,
        weapon_init: EnemyWeaponInit,
    ) -> Result<Self> {
        if !loadout.has_attack_item() {
            return Err(Error::NoWeaponEquipped);
        }
        let first_enemy = adventure.enemies.first().ok_or_else(|| Error::Internal {
            message: format!("Adventure '{}' has no enemies", adventure.name),
        })?;

        Ok(Self {
            adventure: adventure.name.clone(),
            enemy_index: 0,
            equipped: EquippedSnapshot {
                attack: loadout
                    .attack
                    .iter()
                    .cloned()
                    .map(WeaponInstance::fresh)
                    .collect(),
                armor: ArmorSnapshot::from_loadout(&loadout.armor),
            },
            current_enemy: EnemySnapshot::derive(first_enemy, level, weapon_init),
            turns_taken: 0,
        })
    }

    /// Advances to the next enemy in the sequence after a kill. Returns
    /// `false` when the defeated enemy was the last one.
    #[must_use]
    pub fn advance_enemy(
        &mut self,
        adventure: &Adventure,
        level: u32,
        weapon_init: EnemyWeaponInit,
    ) -> bool {
        let next_index = self.enemy_index + 1;
        match adventure.enemies.get(next_index) {
            Some(enemy) => {
                self.enemy_index = next_index;
                self.current_enemy = EnemySnapshot::derive(enemy, level, weapon_init);
                true
            }
            None => false,
        }
    }

    /// Whether the player can still fight - at least one attack item intact.
    #[must_use]
    pub fn can_fight(&self) -> bool {
        self.equipped.attack.iter().any(WeaponInstance::is_usable)
    }

    /// Converts the snapshot back into loadout templates, used when returning
    /// gear to the user after a victory. Durability damage taken during the
    /// adventure is not carried back.
    #[must_use]
    pub fn to_loadout(&self) -> Loadout {
        Loadout {
            attack: self
                .equipped
                .attack
                .iter()
                .map(|w| w.item.clone())
                .collect(),
            armor: ArmorLoadout {
                helmet: self.equipped.armor.helmet.as_ref().map(|a| a.item.clone()),
                chestplate: self
                    .equipped
                    .armor
                    .chestplate
                    .as_ref()
                    .map(|a| a.item.clone()),
                pants: self.equipped.armor.pants.as_ref().map(|a| a.item.clone()),
                boots: self.equipped.armor.boots.as_ref().map(|a| a.item.clone()),
            },
            potion: None,
            shield: None,
        }
    }
}
