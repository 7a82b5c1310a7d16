//! The built-in catalog data set.
//!
//! Used when no catalog file is configured. Numbers here are the source of
//! truth for the starter content; adjust with care since persisted adventure
//! states re-resolve these templates by name.

use super::{AdventureSpec, Catalog, Enemy, Requirements, RewardTable};
use crate::core::items::{
    ArmorItem, ArmorSlot, AttackItem, Item, PotionItem, PriceRange, WeaponKind,
};

fn enemies() -> Vec<Enemy> {
    vec![
        Enemy {
            name: "Mushroom Pawn".to_string(),
            health: 25,
            weapon: AttackItem {
                name: "Shroom Dagger".to_string(),
                kind: WeaponKind::Dagger,
                damage: 6,
                health: 100,
                price: None,
            },
            armor: None,
            droppable: false,
        },
        Enemy {
            name: "Forest King".to_string(),
            health: 45,
            weapon: AttackItem {
                name: "Axe of the Forest".to_string(),
                kind: WeaponKind::Axe,
                damage: 14,
                health: 200,
                price: None,
            },
            armor: None,
            droppable: true,
        },
        Enemy {
            name: "Cave Bat".to_string(),
            health: 18,
            weapon: AttackItem {
                name: "Needle Fang".to_string(),
                kind: WeaponKind::Dagger,
                damage: 4,
                health: 80,
                price: None,
            },
            armor: None,
            droppable: false,
        },
    ]
}

fn items() -> Vec<Item> {
    vec![
        Item::Attack(AttackItem {
            name: "Wooden Sword".to_string(),
            kind: WeaponKind::Sword,
            damage: 7,
            health: 150,
            price: Some(PriceRange { min: 5, max: 15 }),
        }),
        Item::Armor(ArmorItem {
            name: "Leather Cap".to_string(),
            slot: ArmorSlot::Helmet,
            health: 60,
            price: Some(PriceRange { min: 8, max: 20 }),
        }),
        Item::Potion(PotionItem {
            name: "Minor Healing Potion".to_string(),
            heal: 20,
            price: Some(PriceRange { min: 3, max: 9 }),
        }),
    ]
}

fn adventures() -> Vec<AdventureSpec> {
    vec![
        AdventureSpec {
            name: "Through the woods".to_string(),
            description: "A walk among the trees. The mushrooms are restless.".to_string(),
            art: Some("\u{1f332}".to_string()),
            enemies: vec!["Mushroom Pawn".to_string(), "Forest King".to_string()],
            requirements: None,
            rewards: RewardTable {
                min_gold: 0,
                max_gold: 10,
                min_experience: 0,
                max_experience: 10,
                completion_items: Vec::new(),
                consolation_items: Vec::new(),
            },
        },
        AdventureSpec {
            name: "Cave of Whispers".to_string(),
            description: "Something flutters in the dark.".to_string(),
            art: Some("\u{1f987}".to_string()),
            enemies: vec!["Cave Bat".to_string()],
            requirements: Some(Requirements {
                min_experience: Some(20),
                max_experience: None,
                cost: Some(5),
            }),
            rewards: RewardTable {
                min_gold: 2,
                max_gold: 12,
                min_experience: 5,
                max_experience: 15,
                completion_items: Vec::new(),
                consolation_items: Vec::new(),
            },
        },
    ]
}

/// Builds the built-in catalog.
pub(super) fn catalog() -> Catalog {
    let mut builder = Catalog::builder().items(items()).enemies(enemies());
    for spec in adventures() {
        builder = builder.adventure(spec);
    }
    #[allow(clippy::expect_used)] // built-in data is validated by tests
    builder.build().expect("built-in catalog is well-formed")
}
