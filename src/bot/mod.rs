//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the adventure bot,
//! including all slash commands, the button-driven combat loop, autocomplete
//! handlers, and bot context management. Everything here translates between
//! Discord interactions and engine [`crate::core::engine::Action`]s; no game
//! rules live in this layer.

/// Discord command implementations (adventure, loadout, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::engine::AdventureEngine,
    errors::{Error, ErrorKind},
    store::SeaOrmStore,
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::info;

/// Shared data available to all bot commands.
pub struct BotData {
    /// The adventure engine every command dispatches into
    pub engine: Arc<AdventureEngine<SeaOrmStore>>,
}

impl BotData {
    /// Creates a new `BotData` instance over the given engine.
    #[must_use]
    pub fn new(engine: Arc<AdventureEngine<SeaOrmStore>>) -> Self {
        Self { engine }
    }
}

/// Type alias for the poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            panic!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            // User-correctable failures are conversational; everything else
            // is logged in full and surfaced generically.
            let message = match error.kind() {
                ErrorKind::UserCorrectable | ErrorKind::SessionFatal => error.to_string(),
                ErrorKind::Internal => {
                    tracing::error!("Error in command `{}`: {error:?}", ctx.command().name);
                    "Something went wrong on our side. Please try again.".to_string()
                }
            };
            if let Err(e) = ctx.say(message).await {
                tracing::error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the bot until the gateway connection
/// ends.
pub async fn run_bot(
    token: String,
    engine: Arc<AdventureEngine<SeaOrmStore>>,
) -> Result<(), serenity::Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::adventure(),
                commands::loadout(),
                commands::profile(),
                commands::ping(),
                commands::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(engine))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES | serenity::GatewayIntents::DIRECT_MESSAGES;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await?;
    client.start().await
}

pub use commands::*;
pub use handlers::*;
