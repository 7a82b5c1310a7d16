//! Item templates and their combat instances.
//!
//! Catalog items are immutable templates. Combat never mutates a template;
//! instead it stamps an *instance* copy carrying a mutable `current_health`
//! next to the template's max `health` (durability).

use serde::{Deserialize, Serialize};

/// Weapon sub-type of an attack item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// Standard sword
    Sword,
    /// Axe
    Axe,
    /// Long sword
    LongSword,
    /// Short sword
    ShortSword,
    /// Dagger
    Dagger,
    /// Bow (does not have a limited amount of arrows)
    Bow,
}

impl WeaponKind {
    /// Display label for prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sword => "Sword",
            Self::Axe => "Axe",
            Self::LongSword => "Long Sword",
            Self::ShortSword => "Short Sword",
            Self::Dagger => "Dagger",
            Self::Bow => "Bow",
        }
    }
}

/// Armor slot an armor item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorSlot {
    /// Head slot
    Helmet,
    /// Torso slot
    Chestplate,
    /// Leg slot
    Pants,
    /// Feet slot
    Boots,
}

impl ArmorSlot {
    /// All slots, in the order incoming damage is absorbed.
    pub const ALL: [Self; 4] = [Self::Helmet, Self::Chestplate, Self::Pants, Self::Boots];

    /// Display label for prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Helmet => "Helmet",
            Self::Chestplate => "Chestplate",
            Self::Pants => "Pants",
            Self::Boots => "Boots",
        }
    }
}

/// Store price bounds. The shop price fluctuates inside this range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest possible store price
    pub min: i64,
    /// Highest possible store price
    pub max: i64,
}

/// An attack item template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackItem {
    /// Display name, also the lookup key
    pub name: String,
    /// Weapon sub-type
    pub kind: WeaponKind,
    /// Damage dealt per swing
    pub damage: i64,
    /// Durability - removed whenever the wielder blocks or attacks
    pub health: i64,
    /// Store economics, absent for items that cannot be bought
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceRange>,
}

/// An armor item template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorItem {
    /// Display name, also the lookup key
    pub name: String,
    /// Which slot this piece occupies
    pub slot: ArmorSlot,
    /// Durability
    pub health: i64,
    /// Store economics, absent for items that cannot be bought
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceRange>,
}

/// A potion item template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionItem {
    /// Display name, also the lookup key
    pub name: String,
    /// Health restored when consumed
    pub heal: i64,
    /// Store economics, absent for items that cannot be bought
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceRange>,
}

/// A shield item template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldItem {
    /// Display name, also the lookup key
    pub name: String,
    /// Durability
    pub health: i64,
    /// Store economics, absent for items that cannot be bought
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceRange>,
}

/// Any catalog item, polymorphic over variant kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Item {
    /// Weapon
    Attack(AttackItem),
    /// Potion
    Potion(PotionItem),
    /// Shield
    Shield(ShieldItem),
    /// Armor piece
    Armor(ArmorItem),
}

impl Item {
    /// Display name of the underlying item.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Attack(i) => &i.name,
            Self::Potion(i) => &i.name,
            Self::Shield(i) => &i.name,
            Self::Armor(i) => &i.name,
        }
    }

    /// Store price bounds, if this item is sold.
    #[must_use]
    pub const fn price(&self) -> Option<PriceRange> {
        match self {
            Self::Attack(i) => i.price,
            Self::Potion(i) => i.price,
            Self::Shield(i) => i.price,
            Self::Armor(i) => i.price,
        }
    }
}

/// A live copy of an attack item with remaining durability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponInstance {
    /// The immutable template this instance was stamped from
    pub item: AttackItem,
    /// Remaining durability
    pub current_health: i64,
}

impl WeaponInstance {
    /// Stamps a fresh instance at full durability.
    #[must_use]
    pub fn fresh(item: AttackItem) -> Self {
        let current_health = item.health;
        Self {
            item,
            current_health,
        }
    }

    /// Whether this weapon can still be swung.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.current_health > 0
    }
}

/// A live copy of an armor item with remaining durability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorInstance {
    /// The immutable template this instance was stamped from
    pub item: ArmorItem,
    /// Remaining durability
    pub current_health: i64,
}

impl ArmorInstance {
    /// Stamps a fresh instance at full durability.
    #[must_use]
    pub fn fresh(item: ArmorItem) -> Self {
        let current_health = item.health;
        Self {
            item,
            current_health,
        }
    }

    /// Whether this piece still absorbs damage.
    #[must_use]
    pub const fn is_intact(&self) -> bool {
        self.current_health > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::wooden_sword;

    #[test]
    fn fresh_instance_starts_at_template_health() {
        let instance = WeaponInstance::fresh(wooden_sword());
        assert_eq!(instance.current_health, instance.item.health);
        assert!(instance.is_usable());
    }

    #[test]
    fn item_projections() {
        let item = Item::Attack(wooden_sword());
        assert_eq!(item.name(), "Wooden Sword");
        assert!(item.price().is_some());
    }
}
