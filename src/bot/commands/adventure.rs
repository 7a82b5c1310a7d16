//! The `/adventure` command family and the button-driven combat loop.
//!
//! Slash commands only open a session or re-attach to one; every in-combat
//! move arrives as a button press. Button presses are translated into engine
//! actions and the message is edited in place with the resulting view, so a
//! whole fight lives in a single Discord message.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete_adventure_name},
        core::{
            combat::{RewardGrant, TurnReport},
            engine::{Action, Outcome},
            render::{self, CombatView},
        },
        errors::{Error, ErrorKind, Result},
        store::PlayerProfile,
    };
    use poise::serenity_prelude as serenity;
    use poise::CreateReply;
    use std::time::Duration;

    /// How long a prompt waits for a button press before going dormant.
    const PROMPT_TIMEOUT: Duration = Duration::from_secs(120);

    const BTN_ACCEPT: &str = "adventure_accept";
    const BTN_DECLINE: &str = "adventure_decline";
    const BTN_RESUME: &str = "adventure_resume";
    const BTN_ATTACK: &str = "adventure_attack";
    const BTN_DEFEND: &str = "adventure_defend";
    const BTN_SURRENDER: &str = "adventure_surrender";
    const BTN_CONFIRM_SURRENDER: &str = "adventure_confirm_surrender";
    const BTN_DECLINE_SURRENDER: &str = "adventure_decline_surrender";

    /// Go on an adventure.
    #[poise::command(
        slash_command,
        subcommands("view", "start", "resume", "surrender"),
        subcommand_required
    )]
    pub async fn adventure(_ctx: Context<'_>) -> Result<()> {
        // Unreachable with subcommand_required; poise still wants a body.
        Ok(())
    }

    /// Browse the adventure catalog.
    #[poise::command(slash_command)]
    pub async fn view(
        ctx: Context<'_>,
        #[description = "Adventure to inspect"]
        #[autocomplete = "autocomplete_adventure_name"]
        name: Option<String>,
        #[description = "Page of the list to show"] page: Option<usize>,
    ) -> Result<()> {
        let catalog = ctx.data().engine.catalog();
        match name {
            Some(name) => {
                let adventure = catalog.adventure_by_name(&name)?;
                ctx.say(render::adventure_card(adventure)).await?;
            }
            None => {
                let page = page.unwrap_or(1).saturating_sub(1);
                let entries = catalog.adventure_page(page);
                if entries.is_empty() {
                    ctx.say(format!(
                        "No adventures on that page. There {} {} page{}.",
                        if catalog.page_count() == 1 { "is" } else { "are" },
                        catalog.page_count(),
                        if catalog.page_count() == 1 { "" } else { "s" },
                    ))
                    .await?;
                    return Ok(());
                }
                let mut body = entries
                    .iter()
                    .map(render::adventure_line)
                    .collect::<Vec<_>>()
                    .join("\n");
                body.push_str(&format!(
                    "\n\nPage {} of {}",
                    page + 1,
                    catalog.page_count()
                ));
                ctx.say(body).await?;
            }
        }
        Ok(())
    }

    /// Start an adventure.
    #[poise::command(slash_command)]
    pub async fn start(
        ctx: Context<'_>,
        #[description = "Adventure to start"]
        #[autocomplete = "autocomplete_adventure_name"]
        name: String,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let outcome = ctx
            .data()
            .engine
            .handle(&user_id, Action::Start { name })
            .await?;
        match outcome {
            Outcome::StartOffer {
                adventure,
                description,
                art,
                cost,
            } => offer_start(ctx, &adventure, &description, art.as_deref(), cost).await,
            Outcome::ResumeOffer { view } => offer_resume(ctx, &view).await,
            other => unexpected(ctx, &other).await,
        }
    }

    /// Return to your adventure in progress.
    #[poise::command(slash_command)]
    pub async fn resume(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        match ctx.data().engine.handle(&user_id, Action::Resume).await? {
            Outcome::Combat { view, .. } => {
                let reply = ctx.send(combat_reply(&view, None)).await?;
                combat_loop(ctx, &reply).await
            }
            Outcome::NothingToResume => {
                ctx.say("You have no adventure in progress. Try `/adventure start`.")
                    .await?;
                Ok(())
            }
            other => unexpected(ctx, &other).await,
        }
    }

    /// Give up your adventure in progress.
    #[poise::command(slash_command)]
    pub async fn surrender(ctx: Context<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        match ctx.data().engine.handle(&user_id, Action::Surrender).await? {
            Outcome::SurrenderOffer => {
                let reply = ctx.send(surrender_reply()).await?;
                surrender_prompt(ctx, &reply).await?;
                Ok(())
            }
            other => unexpected(ctx, &other).await,
        }
    }

    /// Shows the start confirmation and, on accept, hands off to the combat
    /// loop.
    async fn offer_start(
        ctx: Context<'_>,
        adventure: &str,
        description: &str,
        art: Option<&str>,
        cost: Option<i64>,
    ) -> Result<()> {
        let mut body = format!(
            "{}**{adventure}**\n{description}\n",
            art.map(|a| format!("{a} ")).unwrap_or_default()
        );
        if let Some(cost) = cost {
            body.push_str(&format!("Entry fee: {cost} gold\n"));
        }
        body.push_str("Ready to set out?");

        let reply = ctx
            .send(
                CreateReply::default().content(body).components(vec![
                    serenity::CreateActionRow::Buttons(vec![
                        serenity::CreateButton::new(BTN_ACCEPT)
                            .label("Accept")
                            .style(serenity::ButtonStyle::Success),
                        serenity::CreateButton::new(BTN_DECLINE)
                            .label("Decline")
                            .style(serenity::ButtonStyle::Danger),
                    ]),
                ]),
            )
            .await?;

        let Some(press) = await_press(ctx, &reply, &[BTN_ACCEPT, BTN_DECLINE]).await? else {
            // Prompt expired; drop the pending offer.
            let user_id = ctx.author().id.to_string();
            let _ = ctx.data().engine.handle(&user_id, Action::DeclineStart).await;
            expire(ctx, &reply).await?;
            return Ok(());
        };

        let user_id = ctx.author().id.to_string();
        let action = if press == BTN_ACCEPT {
            Action::AcceptStart
        } else {
            Action::DeclineStart
        };
        match ctx.data().engine.handle(&user_id, action).await {
            Ok(Outcome::Combat { view, report }) => {
                reply.edit(ctx, combat_reply(&view, report.as_ref())).await?;
                combat_loop(ctx, &reply).await
            }
            Ok(Outcome::StartDeclined) => {
                reply
                    .edit(ctx, text_reply("Maybe another time."))
                    .await?;
                Ok(())
            }
            Ok(other) => unexpected(ctx, &other).await,
            Err(err) => fail_prompt(ctx, &reply, err).await,
        }
    }

    /// Shows the "you already have an adventure" prompt.
    async fn offer_resume(ctx: Context<'_>, view: &CombatView) -> Result<()> {
        let body = format!(
            "You already have an adventure in progress:\n{}\n\nResume it?",
            view.to_message()
        );
        let reply = ctx
            .send(
                CreateReply::default().content(body).components(vec![
                    serenity::CreateActionRow::Buttons(vec![
                        serenity::CreateButton::new(BTN_RESUME)
                            .label("Resume")
                            .style(serenity::ButtonStyle::Primary),
                        serenity::CreateButton::new(BTN_DECLINE)
                            .label("Not now")
                            .style(serenity::ButtonStyle::Secondary),
                    ]),
                ]),
            )
            .await?;

        let Some(press) = await_press(ctx, &reply, &[BTN_RESUME, BTN_DECLINE]).await? else {
            expire(ctx, &reply).await?;
            return Ok(());
        };
        if press == BTN_DECLINE {
            reply
                .edit(
                    ctx,
                    text_reply("Your adventure is waiting whenever you are ready."),
                )
                .await?;
            return Ok(());
        }

        let user_id = ctx.author().id.to_string();
        match ctx.data().engine.handle(&user_id, Action::Resume).await? {
            Outcome::Combat { view, .. } => {
                reply.edit(ctx, combat_reply(&view, None)).await?;
                combat_loop(ctx, &reply).await
            }
            other => unexpected(ctx, &other).await,
        }
    }

    /// The combat loop: translate button presses into turns and edit the
    /// message with each result until the session ends or the prompt expires.
    async fn combat_loop(ctx: Context<'_>, reply: &poise::ReplyHandle<'_>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        loop {
            let Some(press) = await_press(
                ctx,
                reply,
                &[BTN_ATTACK, BTN_DEFEND, BTN_SURRENDER],
            )
            .await?
            else {
                reply
                    .edit(
                        ctx,
                        text_reply("The fight stands idle. Use `/adventure resume` to return."),
                    )
                    .await?;
                return Ok(());
            };

            let action = match press.as_str() {
                BTN_ATTACK => Action::Attack,
                BTN_DEFEND => Action::Defend,
                _ => {
                    match ctx.data().engine.handle(&user_id, Action::Surrender).await? {
                        Outcome::SurrenderOffer => {
                            reply.edit(ctx, surrender_reply()).await?;
                            match surrender_prompt(ctx, reply).await? {
                                SurrenderResolution::Surrendered => return Ok(()),
                                SurrenderResolution::BackToCombat(view) => {
                                    reply.edit(ctx, combat_reply(&view, None)).await?;
                                    continue;
                                }
                                SurrenderResolution::Expired => return Ok(()),
                            }
                        }
                        other => return unexpected(ctx, &other).await,
                    }
                }
            };

            match ctx.data().engine.handle(&user_id, action).await {
                Ok(Outcome::Combat { view, report }) => {
                    reply.edit(ctx, combat_reply(&view, report.as_ref())).await?;
                }
                Ok(Outcome::Victory {
                    adventure,
                    rewards,
                    profile,
                }) => {
                    reply
                        .edit(ctx, text_reply(&victory_message(&adventure, &rewards, &profile)))
                        .await?;
                    return Ok(());
                }
                Ok(Outcome::Defeat { adventure }) => {
                    reply
                        .edit(
                            ctx,
                            text_reply(&format!(
                                "💀 Your last weapon broke. **{adventure}** defeated you, and \
                                 the gear you carried is gone."
                            )),
                        )
                        .await?;
                    return Ok(());
                }
                Ok(other) => return unexpected(ctx, &other).await,
                Err(err) => return fail_prompt(ctx, reply, err).await,
            }
        }
    }

    enum SurrenderResolution {
        Surrendered,
        BackToCombat(CombatView),
        Expired,
    }

    /// Handles the surrender confirmation buttons on an existing message.
    async fn surrender_prompt(
        ctx: Context<'_>,
        reply: &poise::ReplyHandle<'_>,
    ) -> Result<SurrenderResolution> {
        let user_id = ctx.author().id.to_string();
        let Some(press) =
            await_press(ctx, reply, &[BTN_CONFIRM_SURRENDER, BTN_DECLINE_SURRENDER]).await?
        else {
            let _ = ctx
                .data()
                .engine
                .handle(&user_id, Action::DeclineSurrender)
                .await;
            expire(ctx, reply).await?;
            return Ok(SurrenderResolution::Expired);
        };

        let action = if press == BTN_CONFIRM_SURRENDER {
            Action::ConfirmSurrender
        } else {
            Action::DeclineSurrender
        };
        match ctx.data().engine.handle(&user_id, action).await? {
            Outcome::Surrendered => {
                reply
                    .edit(
                        ctx,
                        text_reply("🏳️ You surrendered. The gear you carried is gone."),
                    )
                    .await?;
                Ok(SurrenderResolution::Surrendered)
            }
            Outcome::Combat { view, .. } => Ok(SurrenderResolution::BackToCombat(view)),
            Outcome::NothingToResume => {
                reply
                    .edit(ctx, text_reply("There is nothing left to surrender."))
                    .await?;
                Ok(SurrenderResolution::Surrendered)
            }
            other => {
                unexpected(ctx, &other).await?;
                Ok(SurrenderResolution::Surrendered)
            }
        }
    }

    /// Waits for the author to press one of `ids` on `reply`. `None` on
    /// timeout.
    async fn await_press(
        ctx: Context<'_>,
        reply: &poise::ReplyHandle<'_>,
        ids: &[&str],
    ) -> Result<Option<String>> {
        let message_id = reply.message().await?.id;
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();

        let Some(press) = serenity::ComponentInteractionCollector::new(ctx)
            .author_id(ctx.author().id)
            .channel_id(ctx.channel_id())
            .timeout(PROMPT_TIMEOUT)
            .filter(move |press| {
                press.message.id == message_id && ids.contains(&press.data.custom_id)
            })
            .await
        else {
            return Ok(None);
        };

        press
            .create_response(ctx, serenity::CreateInteractionResponse::Acknowledge)
            .await?;
        Ok(Some(press.data.custom_id))
    }

    fn combat_reply(view: &CombatView, report: Option<&TurnReport>) -> CreateReply {
        let mut body = String::new();
        if let Some(report) = report {
            body.push_str(&report_line(report));
            body.push_str("\n\n");
        }
        body.push_str(&view.to_message());

        CreateReply::default()
            .content(body)
            .components(vec![serenity::CreateActionRow::Buttons(vec![
                serenity::CreateButton::new(BTN_ATTACK)
                    .label("Attack")
                    .style(serenity::ButtonStyle::Danger),
                serenity::CreateButton::new(BTN_DEFEND)
                    .label("Defend")
                    .style(serenity::ButtonStyle::Primary),
                serenity::CreateButton::new(BTN_SURRENDER)
                    .label("Surrender")
                    .style(serenity::ButtonStyle::Secondary),
            ])])
    }

    fn surrender_reply() -> CreateReply {
        CreateReply::default()
            .content("Surrendering forfeits the gear you carried into this adventure. Are you sure?")
            .components(vec![serenity::CreateActionRow::Buttons(vec![
                serenity::CreateButton::new(BTN_CONFIRM_SURRENDER)
                    .label("Surrender")
                    .style(serenity::ButtonStyle::Danger),
                serenity::CreateButton::new(BTN_DECLINE_SURRENDER)
                    .label("Keep fighting")
                    .style(serenity::ButtonStyle::Secondary),
            ])])
    }

    fn text_reply(content: &str) -> CreateReply {
        CreateReply::default()
            .content(content.to_string())
            .components(Vec::new())
    }

    fn report_line(report: &TurnReport) -> String {
        match report.defended {
            Some(true) => "🛡️ You blocked the attack!".to_string(),
            Some(false) => format!("🛡️ Your guard slipped - you took {} damage.", report.damage_taken),
            None => {
                let mut line = format!(
                    "⚔️ You dealt {} damage with your {}.",
                    report.damage_dealt,
                    report.weapon_used.as_deref().unwrap_or("bare hands")
                );
                if report.enemy_defeated {
                    line.push_str(" The enemy falls!");
                } else if report.damage_taken > 0 {
                    line.push_str(&format!(" You took {} back.", report.damage_taken));
                }
                line
            }
        }
    }

    fn victory_message(adventure: &str, rewards: &RewardGrant, profile: &PlayerProfile) -> String {
        let mut body = format!(
            "🎉 **{adventure}** complete! You earned {} gold and {} XP.",
            rewards.gold, rewards.experience
        );
        if !rewards.loot.is_empty() {
            body.push_str(&format!(
                "\nLoot: {}",
                rewards
                    .loot
                    .iter()
                    .map(crate::core::items::Item::name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        body.push_str(&format!(
            "\nYou now have {} gold and {} XP (level {}).",
            profile.gold, profile.experience, profile.level
        ));
        body
    }

    /// Disables a prompt that timed out.
    async fn expire(ctx: Context<'_>, reply: &poise::ReplyHandle<'_>) -> Result<()> {
        reply
            .edit(ctx, text_reply("This prompt expired."))
            .await?;
        Ok(())
    }

    /// Surfaces an engine error on an existing prompt message.
    async fn fail_prompt(
        ctx: Context<'_>,
        reply: &poise::ReplyHandle<'_>,
        err: Error,
    ) -> Result<()> {
        match err.kind() {
            ErrorKind::UserCorrectable | ErrorKind::SessionFatal => {
                reply.edit(ctx, text_reply(&err.to_string())).await?;
                Ok(())
            }
            ErrorKind::Internal => Err(err),
        }
    }

    /// An outcome the current prompt has no rendering for; indicates a state
    /// machine hole rather than user error.
    async fn unexpected(ctx: Context<'_>, outcome: &Outcome) -> Result<()> {
        tracing::error!(?outcome, "outcome had no rendering in this context");
        ctx.say("Something went wrong on our side. Please try again.")
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
