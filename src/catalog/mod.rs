//! The adventure catalog - immutable registry of adventures, enemies and items.
//!
//! The catalog is constructed exactly once at process start, either from the
//! built-in data set or from a TOML file, and only exposes read methods
//! afterwards. Adventures reference enemies by name in their definition and
//! the builder resolves those references eagerly, so a catalog that builds
//! successfully never contains a dangling enemy reference. (Persisted
//! `AdventureState` rows can still dangle across catalog versions; the engine
//! treats that as session-fatal.)

mod builtin;

use crate::{
    core::items::{ArmorItem, AttackItem, Item},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum entries returned to a Discord autocomplete response.
pub const AUTOCOMPLETE_LIMIT: usize = 25;

/// Adventures shown per page in the bulk list view.
pub const ADVENTURES_PER_PAGE: usize = 5;

/// An enemy template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    /// Display name, also the lookup key
    pub name: String,
    /// Maximum health
    pub health: i64,
    /// The single attack item this enemy wields
    pub weapon: AttackItem,
    /// Optional armor piece
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor: Option<ArmorItem>,
    /// Whether defeating this enemy can yield a lootable copy of its gear
    #[serde(default)]
    pub droppable: bool,
}

/// Eligibility gating for an adventure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Minimum experience required to start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_experience: Option<i64>,
    /// Maximum experience allowed to start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_experience: Option<i64>,
    /// Gold cost deducted when the adventure is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
}

/// Reward envelope for an adventure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTable {
    /// Least gold granted on completion
    pub min_gold: i64,
    /// Most gold granted on completion
    pub max_gold: i64,
    /// Least experience granted on completion
    pub min_experience: i64,
    /// Most experience granted on completion
    pub max_experience: i64,
    /// Item names that may be granted on completion
    #[serde(default)]
    pub completion_items: Vec<String>,
    /// Item names that may be granted on failure, so users aren't left with
    /// nothing
    #[serde(default)]
    pub consolation_items: Vec<String>,
}

/// A playable adventure template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adventure {
    /// Display name, unique key
    pub name: String,
    /// Short description shown in listings
    pub description: String,
    /// Optional display art (an emoji)
    pub art: Option<String>,
    /// Ordered encounter sequence
    pub enemies: Vec<Enemy>,
    /// Optional eligibility gating
    pub requirements: Option<Requirements>,
    /// Reward envelope
    pub rewards: RewardTable,
}

/// An adventure definition as written in catalog data - enemies referenced
/// by name, resolved by the builder.
#[derive(Debug, Clone, Deserialize)]
pub struct AdventureSpec {
    /// Display name, unique key
    pub name: String,
    /// Short description shown in listings
    pub description: String,
    /// Optional display art (an emoji)
    #[serde(default)]
    pub art: Option<String>,
    /// Names of enemies encountered, in order
    pub enemies: Vec<String>,
    /// Optional eligibility gating
    #[serde(default)]
    pub requirements: Option<Requirements>,
    /// Reward envelope
    pub rewards: RewardTable,
}

/// On-disk catalog file layout (`catalog.toml`).
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<Item>,
    enemies: Vec<Enemy>,
    adventures: Vec<AdventureSpec>,
}

/// The immutable catalog. Safely shared across all concurrent requests
/// without synchronization.
#[derive(Debug)]
pub struct Catalog {
    adventures: Vec<Adventure>,
    enemies: Vec<Enemy>,
    items: Vec<Item>,
    // Projections computed once at load time, not persisted.
    droppable_items: Vec<Item>,
    store_items: Vec<Item>,
}

impl Catalog {
    /// Starts an empty catalog builder.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Builds the built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// Loads a catalog from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
            message: format!("Failed to read catalog file: {e}"),
        })?;

        let file: CatalogFile = toml::from_str(&contents).map_err(|e| Error::Config {
            message: format!("Failed to parse catalog file: {e}"),
        })?;

        let mut builder = Self::builder().items(file.items).enemies(file.enemies);
        for spec in file.adventures {
            builder = builder.adventure(spec);
        }
        builder.build()
    }

    /// Finds the first adventure matching `predicate`.
    pub fn find_adventure<F>(&self, predicate: F) -> Option<&Adventure>
    where
        F: Fn(&Adventure) -> bool,
    {
        self.adventures.iter().find(|a| predicate(a))
    }

    /// Resolves an adventure by exact name, as a typed error on miss so
    /// callers must handle "entry no longer exists".
    pub fn adventure_by_name(&self, name: &str) -> Result<&Adventure> {
        self.find_adventure(|a| a.name == name)
            .ok_or_else(|| Error::AdventureNotFound {
                name: name.to_string(),
            })
    }

    /// Finds the first enemy matching `predicate`.
    pub fn find_enemy<F>(&self, predicate: F) -> Option<&Enemy>
    where
        F: Fn(&Enemy) -> bool,
    {
        self.enemies.iter().find(|e| predicate(e))
    }

    /// Resolves an enemy by exact name.
    pub fn enemy_by_name(&self, name: &str) -> Result<&Enemy> {
        self.find_enemy(|e| e.name == name)
            .ok_or_else(|| Error::EnemyNotFound {
                name: name.to_string(),
            })
    }

    /// All adventures, in catalog order.
    #[must_use]
    pub fn adventures(&self) -> &[Adventure] {
        &self.adventures
    }

    /// One page of the adventure list, [`ADVENTURES_PER_PAGE`] entries.
    #[must_use]
    pub fn adventure_page(&self, page: usize) -> &[Adventure] {
        let start = page.saturating_mul(ADVENTURES_PER_PAGE).min(self.adventures.len());
        let end = start.saturating_add(ADVENTURES_PER_PAGE).min(self.adventures.len());
        &self.adventures[start..end]
    }

    /// Number of pages in the adventure list.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.adventures.len().div_ceil(ADVENTURES_PER_PAGE)
    }

    /// All catalog items.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Resolves an item template by exact name.
    #[must_use]
    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name() == name)
    }

    /// Loot pool - gear of enemies flagged droppable.
    #[must_use]
    pub fn droppable_items(&self) -> &[Item] {
        &self.droppable_items
    }

    /// Store pool - any item carrying a price range.
    #[must_use]
    pub fn store_items(&self) -> &[Item] {
        &self.store_items
    }

    /// Case-insensitive substring search over adventure names, capped at
    /// [`AUTOCOMPLETE_LIMIT`]. An empty or unmatched query falls back to the
    /// first 24 entries - an empty autocomplete list degrades UX.
    #[must_use]
    pub fn search_adventures(&self, query: &str) -> Vec<&Adventure> {
        let fallback = || {
            self.adventures
                .iter()
                .take(AUTOCOMPLETE_LIMIT - 1)
                .collect::<Vec<_>>()
        };

        if query.trim().is_empty() {
            return fallback();
        }

        let query_lower = query.to_lowercase();
        let matches: Vec<&Adventure> = self
            .adventures
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&query_lower))
            .take(AUTOCOMPLETE_LIMIT)
            .collect();

        if matches.is_empty() {
            return fallback();
        }

        matches
    }
}

/// Explicit catalog factory. Eliminates the import-order fragility of
/// building registries through module-level mutation.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<Item>,
    enemies: Vec<Enemy>,
    adventures: Vec<AdventureSpec>,
}

impl CatalogBuilder {
    /// Adds standalone catalog items.
    #[must_use]
    pub fn items(mut self, items: Vec<Item>) -> Self {
        self.items.extend(items);
        self
    }

    /// Adds enemy templates.
    #[must_use]
    pub fn enemies(mut self, enemies: Vec<Enemy>) -> Self {
        self.enemies.extend(enemies);
        self
    }

    /// Adds an adventure definition.
    #[must_use]
    pub fn adventure(mut self, spec: AdventureSpec) -> Self {
        self.adventures.push(spec);
        self
    }

    /// Resolves enemy references and computes the derived item pools.
    pub fn build(self) -> Result<Catalog> {
        let Self {
            mut items,
            enemies,
            adventures: specs,
        } = self;

        let mut adventures = Vec::with_capacity(specs.len());
        for spec in specs {
            let mut resolved = Vec::with_capacity(spec.enemies.len());
            for enemy_name in &spec.enemies {
                let enemy = enemies
                    .iter()
                    .find(|e| &e.name == enemy_name)
                    .ok_or_else(|| Error::Config {
                        message: format!(
                            "Adventure '{}' references unknown enemy '{enemy_name}'",
                            spec.name
                        ),
                    })?;
                resolved.push(enemy.clone());
            }
            if resolved.is_empty() {
                return Err(Error::Config {
                    message: format!("Adventure '{}' has no enemies", spec.name),
                });
            }
            adventures.push(Adventure {
                name: spec.name,
                description: spec.description,
                art: spec.art,
                enemies: resolved,
                requirements: spec.requirements,
                rewards: spec.rewards,
            });
        }

        // Gear of droppable enemies joins the global item pool.
        let droppable_items: Vec<Item> = enemies
            .iter()
            .filter(|e| e.droppable)
            .flat_map(|e| {
                std::iter::once(Item::Attack(e.weapon.clone()))
                    .chain(e.armor.clone().map(Item::Armor))
            })
            .collect();
        items.extend(droppable_items.iter().cloned());

        let store_items: Vec<Item> = items.iter().filter(|i| i.price().is_some()).cloned().collect();

        Ok(Catalog {
            adventures,
            enemies,
            items,
            droppable_items,
            store_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_resolves() {
        let catalog = Catalog::builtin();
        let woods = catalog.adventure_by_name("Through the woods").unwrap();
        assert_eq!(woods.enemies[0].name, "Mushroom Pawn");
        assert_eq!(woods.enemies[0].health, 25);
        assert_eq!(woods.enemies[0].weapon.name, "Shroom Dagger");
        assert_eq!(woods.enemies[1].name, "Forest King");
        assert!(woods.enemies[1].droppable);
    }

    #[test]
    fn missing_entries_are_typed_errors() {
        let catalog = Catalog::builtin();
        assert!(matches!(
            catalog.adventure_by_name("Atlantis"),
            Err(Error::AdventureNotFound { .. })
        ));
        assert!(matches!(
            catalog.enemy_by_name("Kraken"),
            Err(Error::EnemyNotFound { .. })
        ));
    }

    #[test]
    fn droppable_projection_contains_forest_king_axe() {
        let catalog = Catalog::builtin();
        assert!(
            catalog
                .droppable_items()
                .iter()
                .any(|i| i.name() == "Axe of the Forest")
        );
        // The Mushroom Pawn is not droppable, so its dagger stays out.
        assert!(
            !catalog
                .droppable_items()
                .iter()
                .any(|i| i.name() == "Shroom Dagger")
        );
    }

    #[test]
    fn store_projection_only_has_priced_items() {
        let catalog = Catalog::builtin();
        assert!(!catalog.store_items().is_empty());
        assert!(catalog.store_items().iter().all(|i| i.price().is_some()));
    }

    #[test]
    fn search_matches_case_insensitively() {
        let catalog = Catalog::builtin();
        let results = catalog.search_adventures("THROUGH");
        assert_eq!(results[0].name, "Through the woods");
    }

    #[test]
    fn search_falls_back_to_leading_entries() {
        let catalog = Catalog::builtin();
        let on_miss = catalog.search_adventures("zzzzzz");
        let on_empty = catalog.search_adventures("   ");
        assert!(!on_miss.is_empty());
        assert_eq!(on_miss.len(), on_empty.len());
        assert!(on_miss.len() <= AUTOCOMPLETE_LIMIT - 1);
    }

    #[test]
    fn unknown_enemy_reference_fails_build() {
        let result = Catalog::builder()
            .adventure(AdventureSpec {
                name: "Broken".to_string(),
                description: "references a ghost".to_string(),
                art: None,
                enemies: vec!["Nobody".to_string()],
                requirements: None,
                rewards: RewardTable::default(),
            })
            .build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn pagination_clamps_out_of_range() {
        let catalog = Catalog::builtin();
        assert!(!catalog.adventure_page(0).is_empty());
        assert!(catalog.adventure_page(99).is_empty());
        assert!(catalog.page_count() >= 1);
    }

    #[test]
    fn parses_catalog_toml() {
        let toml_str = r#"
            [[enemies]]
            name = "Bog Rat"
            health = 12
            droppable = false

            [enemies.weapon]
            name = "Gnawed Bone"
            kind = "dagger"
            damage = 3
            health = 40

            [[adventures]]
            name = "Into the bog"
            description = "Wet. Unpleasant."
            enemies = ["Bog Rat"]

            [adventures.rewards]
            min_gold = 0
            max_gold = 5
            min_experience = 0
            max_experience = 5
        "#;

        let file: CatalogFile = toml::from_str(toml_str).unwrap();
        let catalog = Catalog::builder()
            .items(file.items)
            .enemies(file.enemies)
            .adventure(file.adventures.into_iter().next().unwrap())
            .build()
            .unwrap();
        assert_eq!(
            catalog.adventure_by_name("Into the bog").unwrap().enemies[0].name,
            "Bog Rat"
        );
    }
}
