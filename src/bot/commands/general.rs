//! General Discord commands - ping and help.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{bot::Context, errors::Result};

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let help_text = "**Wayfarer Help**\n\
        Here is a summary of all available commands.\n\n\
        **Adventure Commands**\n\
        • `/adventure view [name] [page]` - Browse the adventure catalog.\n\
        • `/adventure start <name>` - Start an adventure (confirmation required).\n\
        • `/adventure resume` - Return to your adventure in progress.\n\
        • `/adventure surrender` - Give up your adventure (your gear is forfeit!).\n\n\
        **Equipment Commands**\n\
        • `/loadout show` - Show what you have equipped.\n\
        • `/loadout starter` - Equip the starter kit if you have nothing.\n\
        • `/profile` - Show your gold, experience and level.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        In combat, use the Attack, Defend and Surrender buttons on the fight message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
