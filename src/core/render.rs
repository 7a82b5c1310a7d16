//! Presentation-ready projections of combat and catalog data.
//!
//! The engine returns a [`CombatView`] instead of raw state so the bot layer
//! never has to inspect `AdventureState` directly; everything a combat prompt
//! shows is precomputed here.

use crate::{
    catalog::{Adventure, Requirements},
    core::{
        combat,
        items::ArmorSlot,
        state::AdventureState,
    },
};

/// The moves offered to the user on a combat prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnChoice {
    /// Swing the active weapon
    Attack,
    /// Attempt to block this turn's strike
    Defend,
    /// Give up the adventure
    Surrender,
}

impl TurnChoice {
    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attack => "Attack",
            Self::Defend => "Defend",
            Self::Surrender => "Surrender",
        }
    }
}

/// One equipped item's durability line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GearStatus {
    /// Item name
    pub name: String,
    /// Remaining durability
    pub current_health: i64,
    /// Maximum durability
    pub max_health: i64,
}

/// Everything a combat prompt displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatView {
    /// Adventure display name
    pub adventure: String,
    /// Adventure art, if any
    pub art: Option<String>,
    /// Current enemy name
    pub enemy_name: String,
    /// Current enemy remaining health
    pub enemy_health: i64,
    /// Current enemy maximum health
    pub enemy_max_health: i64,
    /// Active weapon name, absent when everything is broken
    pub weapon_name: Option<String>,
    /// Active weapon remaining durability
    pub weapon_health: i64,
    /// Active weapon maximum durability
    pub weapon_max_health: i64,
    /// Every carried item (attack then armor), with current/max durability
    pub gear: Vec<GearStatus>,
    /// Turns taken so far
    pub turns_taken: u32,
    /// The moves currently offered
    pub choices: Vec<TurnChoice>,
}

impl CombatView {
    /// Projects an in-progress adventure into its prompt view. `art` comes
    /// from the adventure template, which the state only references by name.
    #[must_use]
    pub fn from_state(state: &AdventureState, art: Option<String>) -> Self {
        let weapon = combat::active_weapon(state);
        let mut gear: Vec<GearStatus> = state
            .equipped
            .attack
            .iter()
            .map(|w| GearStatus {
                name: w.item.name.clone(),
                current_health: w.current_health,
                max_health: w.item.health,
            })
            .collect();
        for slot in ArmorSlot::ALL {
            if let Some(piece) = state.equipped.armor.slot(slot) {
                gear.push(GearStatus {
                    name: piece.item.name.clone(),
                    current_health: piece.current_health,
                    max_health: piece.item.health,
                });
            }
        }
        Self {
            adventure: state.adventure.clone(),
            art,
            enemy_name: state.current_enemy.name.clone(),
            enemy_health: state.current_enemy.current_health,
            enemy_max_health: state.current_enemy.health,
            weapon_name: weapon.map(|w| w.item.name.clone()),
            weapon_health: weapon.map_or(0, |w| w.current_health),
            weapon_max_health: weapon.map_or(0, |w| w.item.health),
            gear,
            turns_taken: state.turns_taken,
            choices: vec![TurnChoice::Attack, TurnChoice::Defend, TurnChoice::Surrender],
        }
    }

    /// Formats the prompt body shown above the turn buttons.
    #[must_use]
    pub fn to_message(&self) -> String {
        let mut out = String::new();
        if let Some(art) = &self.art {
            out.push_str(art);
            out.push(' ');
        }
        out.push_str(&format!(
            "**{}**\n{}: {}/{} HP\n",
            self.adventure, self.enemy_name, self.enemy_health, self.enemy_max_health
        ));
        match &self.weapon_name {
            Some(name) => out.push_str(&format!(
                "Your {name}: {}/{} durability\n",
                self.weapon_health, self.weapon_max_health
            )),
            None => out.push_str("You have no usable weapon left!\n"),
        }
        out.push_str(&format!("Turn {}", self.turns_taken + 1));
        out
    }
}

/// One line of the paged adventure list.
#[must_use]
pub fn adventure_line(adventure: &Adventure) -> String {
    let art = adventure.art.as_deref().unwrap_or("");
    format!("{art} **{}** - {}", adventure.name, adventure.description)
}

/// The detail card shown by the view command.
#[must_use]
pub fn adventure_card(adventure: &Adventure) -> String {
    let mut out = adventure_line(adventure);
    out.push('\n');
    out.push_str(&format!(
        "Enemies: {}\n",
        adventure
            .enemies
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    out.push_str(&format!(
        "Rewards: {}-{} gold, {}-{} XP",
        adventure.rewards.min_gold,
        adventure.rewards.max_gold,
        adventure.rewards.min_experience,
        adventure.rewards.max_experience
    ));
    if let Some(req) = &adventure.requirements {
        out.push('\n');
        out.push_str(&requirements_line(req));
    }
    out
}

fn requirements_line(req: &Requirements) -> String {
    let mut parts = Vec::new();
    if let Some(min) = req.min_experience {
        parts.push(format!("at least {min} XP"));
    }
    if let Some(max) = req.max_experience {
        parts.push(format!("at most {max} XP"));
    }
    if let Some(cost) = req.cost {
        parts.push(format!("{cost} gold to enter"));
    }
    format!("Requires: {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::Catalog,
        core::state::{AdventureState, EnemyWeaponInit},
        test_utils::starter_loadout,
    };

    #[test]
    fn view_reflects_state() {
        let catalog = Catalog::builtin();
        let adventure = catalog.adventure_by_name("Through the woods").unwrap();
        let state =
            AdventureState::begin(adventure, &starter_loadout(), 0, EnemyWeaponInit::default())
                .unwrap();

        let view = CombatView::from_state(&state, adventure.art.clone());
        assert_eq!(view.enemy_name, "Mushroom Pawn");
        assert_eq!(view.enemy_health, 25);
        assert_eq!(view.weapon_name.as_deref(), Some("Wooden Sword"));
        assert_eq!(view.weapon_health, 150);
        assert_eq!(view.gear.len(), 1);
        assert_eq!(view.gear[0].name, "Wooden Sword");
        assert_eq!(view.gear[0].max_health, 150);
        assert_eq!(view.choices.len(), 3);

        let message = view.to_message();
        assert!(message.contains("Mushroom Pawn: 25/25 HP"));
        assert!(message.contains("Turn 1"));
    }

    #[test]
    fn view_handles_broken_weapons() {
        let catalog = Catalog::builtin();
        let adventure = catalog.adventure_by_name("Through the woods").unwrap();
        let mut state =
            AdventureState::begin(adventure, &starter_loadout(), 0, EnemyWeaponInit::default())
                .unwrap();
        state.equipped.attack[0].current_health = 0;

        let view = CombatView::from_state(&state, None);
        assert!(view.weapon_name.is_none());
        assert!(view.to_message().contains("no usable weapon"));
    }

    #[test]
    fn card_includes_requirements() {
        let catalog = Catalog::builtin();
        let cave = catalog.adventure_by_name("Cave of Whispers").unwrap();
        let card = adventure_card(cave);
        assert!(card.contains("Cave Bat"));
        assert!(card.contains("at least 20 XP"));
        assert!(card.contains("5 gold to enter"));
    }
}
