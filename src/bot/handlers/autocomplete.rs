//! Autocomplete handlers for Discord slash command parameters.

use crate::{bot::BotData, errors::Error};

/// Provides autocomplete suggestions for adventure names.
///
/// Case-insensitive substring search over the catalog, capped at Discord's
/// 25-entry limit. An empty or unmatched query falls back to the leading
/// catalog entries so the dropdown is never blank.
pub async fn autocomplete_adventure_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    ctx.data()
        .engine
        .catalog()
        .search_adventures(partial)
        .into_iter()
        .map(|adventure| adventure.name.clone())
        .collect()
}
