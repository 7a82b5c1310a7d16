//! Loadout and profile commands.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        catalog::Catalog,
        core::{
            items::{ArmorSlot, Item},
            state::Loadout,
        },
        errors::Result,
        store::CombatStore,
    };

    /// Items handed to a player starting from nothing.
    const STARTER_ITEMS: &[&str] = &["Wooden Sword", "Leather Cap"];

    /// Inspect or refill your equipment.
    #[poise::command(slash_command, subcommands("show", "starter"), subcommand_required)]
    pub async fn loadout(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Show what you have equipped.
    #[poise::command(slash_command)]
    pub async fn show(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let loadout = ctx.data().engine.store().loadout(&user_id).await?;

        if loadout.is_empty() {
            // Gear may be locked inside an active adventure rather than
            // missing outright.
            let in_combat = ctx
                .data()
                .engine
                .store()
                .combat_state(&user_id)
                .await?
                .is_some();
            let hint = if in_combat {
                "Your gear is committed to your adventure in progress."
            } else {
                "You have nothing equipped. Try `/loadout starter`."
            };
            ctx.say(hint).await?;
            return Ok(());
        }

        ctx.say(describe(&loadout)).await?;
        Ok(())
    }

    /// Equip the starter kit (only if you have nothing).
    #[poise::command(slash_command)]
    pub async fn starter(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let store = ctx.data().engine.store();

        let current = store.loadout(&user_id).await?;
        if !current.is_empty() {
            ctx.say("You already have equipment. The starter kit is for empty hands only.")
                .await?;
            return Ok(());
        }
        if store.combat_state(&user_id).await?.is_some() {
            ctx.say("Finish your adventure first - your gear is committed to it.")
                .await?;
            return Ok(());
        }

        let kit = starter_kit(ctx.data().engine.catalog());
        store.set_loadout(&user_id, &kit).await?;
        ctx.say(format!("Starter kit equipped!\n{}", describe(&kit)))
            .await?;
        Ok(())
    }

    /// Show your gold, experience and level.
    #[poise::command(slash_command)]
    pub async fn profile(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let profile = ctx.data().engine.store().profile(&user_id).await?;
        ctx.say(format!(
            "**{}**\nGold: {}\nExperience: {} (level {})",
            ctx.author().name,
            profile.gold,
            profile.experience,
            profile.level
        ))
        .await?;
        Ok(())
    }

    fn starter_kit(catalog: &Catalog) -> Loadout {
        let mut kit = Loadout::default();
        for name in STARTER_ITEMS {
            match catalog.item_by_name(name) {
                Some(Item::Attack(weapon)) => kit.attack.push(weapon.clone()),
                Some(Item::Armor(armor)) => kit.armor.equip(armor.clone()),
                Some(Item::Potion(potion)) => kit.potion = Some(potion.clone()),
                Some(Item::Shield(shield)) => kit.shield = Some(shield.clone()),
                None => tracing::warn!(item = name, "starter item missing from catalog"),
            }
        }
        kit
    }

    fn describe(loadout: &Loadout) -> String {
        let mut lines = Vec::new();
        for weapon in &loadout.attack {
            lines.push(format!(
                "⚔️ {} ({}, {} damage, {} durability)",
                weapon.name,
                weapon.kind.label(),
                weapon.damage,
                weapon.health
            ));
        }
        for slot in ArmorSlot::ALL {
            if let Some(armor) = loadout.armor.slot(slot) {
                lines.push(format!("🛡️ {} ({} durability)", armor.name, armor.health));
            }
        }
        if let Some(potion) = &loadout.potion {
            lines.push(format!("🧪 {} (heals {})", potion.name, potion.heal));
        }
        if loadout.shield.is_some() {
            lines.push("🛡️ Shield".to_string());
        }
        lines.join("\n")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn starter_kit_covers_weapon_and_armor() {
            let kit = starter_kit(&Catalog::builtin());
            assert!(kit.has_attack_item());

            let text = describe(&kit);
            assert!(text.contains("Wooden Sword"));
            assert!(text.contains("Leather Cap"));
        }
    }
}

// Re-export all commands
pub use inner::*;
