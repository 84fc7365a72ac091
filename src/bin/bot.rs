use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::{Activity, Ready};
use serenity::model::id::{ChannelId, GuildId, MessageId};
use serenity::prelude::*;
use std::sync::Arc;

use beanly::commands::{build_registry, Dispatcher};
use beanly::core::Config;
use beanly::message_components::handle_component_interaction;
use beanly::platform::discord::{inbound_message, DiscordPlatform, EmoteCache};
use beanly::platform::{self, ChatPlatform};

struct Handler {
    config: Arc<Config>,
    dispatcher: Arc<Dispatcher>,
    emotes: EmoteCache,
}

impl Handler {
    fn platform(&self, ctx: &Context) -> Arc<dyn ChatPlatform> {
        Arc::new(DiscordPlatform::from_context(ctx, Arc::clone(&self.emotes)))
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        // Each invocation runs on its own task; the outcome is logged by the dispatcher
        self.dispatcher
            .spawn(self.platform(&ctx), inbound_message(&msg));
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        ctx.set_activity(Activity::watching(&self.config.activity))
            .await;
        info!("👀 Watching {}", self.config.activity);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::MessageComponent(component) = interaction {
            if let Err(e) =
                handle_component_interaction(&ctx, &component, self.dispatcher.paginators()).await
            {
                error!(
                    "Error handling component '{}': {e}",
                    component.data.custom_id
                );
            }
        }
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        _channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        let message_id = platform::MessageId(deleted_message_id.0);
        if self.dispatcher.paginators().forget(message_id) {
            debug!("Dropped paginator for deleted message {message_id}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Arc::new(Config::from_env()?);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Beanly...");

    let registry = build_registry()?;
    info!("📚 Registered {} commands", registry.len());

    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&config), Arc::new(registry)));
    let lifecycle = Arc::clone(dispatcher.lifecycle());

    let handler = Handler {
        config: Arc::clone(&config),
        dispatcher,
        emotes: EmoteCache::default(),
    };

    // GUILD_MEMBERS is privileged; user lookups by name rely on the member cache
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    let shard_manager = Arc::clone(&client.shard_manager);

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    tokio::select! {
        result = client.start() => {
            if let Err(why) = result {
                error!("Gateway connection failed: {why:?}");
                return Err(anyhow::anyhow!(
                    "Failed to establish gateway connection: {}",
                    why
                ));
            }
        }
        _ = lifecycle.terminated() => {
            info!("👋 Termination requested, closing remaining shards");
            shard_manager.lock().await.shutdown_all().await;
        }
    }

    Ok(())
}
