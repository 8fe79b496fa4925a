//! Main Telegram bot implementation.

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::utils::command::BotCommands;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, TelegramError};
use crate::handlers::{
    handle_command, handle_message, handle_unknown_command, route, Command, Route,
};
use crate::server;
use crate::state::BotState;

/// The task tracker bot.
pub struct TaskBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<BotState>,
}

impl TaskBot {
    /// Create a bot using the token from the state's configuration.
    pub fn new(state: Arc<BotState>) -> Self {
        let bot = Bot::new(state.config().bot_token.clone());
        Self { bot, state }
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Publish the command list shown in Telegram's command menu.
    pub async fn register_commands(&self) -> Result<()> {
        self.bot
            .set_my_commands(Command::bot_commands())
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(())
    }

    /// Run in webhook mode when a webhook URL is configured, else poll.
    pub async fn run(&self, force_polling: bool) -> Result<()> {
        if let Err(e) = self.register_commands().await {
            warn!(error = %e, "Could not register bot commands");
        }

        match self.state.config().webhook_endpoint() {
            Some(endpoint) if !force_polling => self.start_webhook(&endpoint).await,
            _ => self.start_polling().await,
        }
    }

    /// Start long polling, with the health endpoint served alongside.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        // A webhook left over from an earlier deployment blocks getUpdates
        if let Err(e) = self.bot.delete_webhook().await {
            warn!(error = %e, "Failed to delete webhook");
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let port = self.state.config().port;
        let router = server::health_router(Arc::clone(&self.state));
        let health = tokio::spawn(async move {
            let listener = match server::bind(port).await {
                Ok(listener) => listener,
                Err(e) => {
                    warn!(port, error = %e, "Health server unavailable");
                    return;
                }
            };
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = server::serve(listener, router, shutdown).await {
                warn!(error = %e, "Health server stopped");
            }
        });

        info!("Bot is running! Send /start to begin.");

        self.dispatcher().dispatch().await;

        let _ = shutdown_tx.send(());
        let _ = health.await;

        info!("Bot stopped");
        Ok(())
    }

    /// Register `endpoint` with Telegram and receive updates there.
    pub async fn start_webhook(&self, endpoint: &str) -> Result<()> {
        info!(url = %endpoint, "Starting Telegram bot in webhook mode...");

        let url = Url::parse(endpoint)
            .map_err(|e| TelegramError::WebhookFailed(format!("{}: {}", endpoint, e)))?;
        let port = self.state.config().port;
        let options = webhooks::Options::new(server::bind_address(port), url);

        let (listener, stop_flag, webhook_router) =
            webhooks::axum_to_router(self.bot.clone(), options)
                .await
                .map_err(|e| TelegramError::WebhookFailed(e.to_string()))?;

        let router = webhook_router.merge(server::health_router(Arc::clone(&self.state)));
        let tcp = server::bind(port).await?;
        let http = tokio::spawn(server::serve(tcp, router, stop_flag));

        info!("Webhook registered. Bot is running!");

        self.dispatcher()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;

        match http.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "HTTP server stopped with an error"),
            Err(e) => warn!(error = %e, "HTTP server task failed"),
        }

        info!("Bot stopped");
        Ok(())
    }

    fn dispatcher(&self) -> Dispatcher<Bot, teloxide::RequestError, teloxide::dispatching::DefaultKey> {
        Dispatcher::builder(self.bot.clone(), handler_tree(Arc::clone(&self.state)))
            .default_handler(|upd| async move {
                debug!(update_id = upd.id.0, "Ignoring unsupported update");
            })
            .enable_ctrlc_handler()
            .build()
    }
}

/// Route commands, unknown commands and plain text to their handlers.
fn handler_tree(state: Arc<BotState>) -> UpdateHandler<teloxide::RequestError> {
    let state_for_commands = Arc::clone(&state);
    let state_for_messages = state;

    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                    let state = Arc::clone(&state_for_commands);
                    info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                    async move { handle_command(bot, msg, cmd, state).await }
                }),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| route(msg.text()) == Route::UnknownCommand)
                .endpoint(handle_unknown_command),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| route(msg.text()) == Route::Task)
                .endpoint(move |bot: Bot, msg: Message| {
                    let state = Arc::clone(&state_for_messages);
                    debug!(chat_id = %msg.chat.id, "Task message received");
                    async move { handle_message(bot, msg, state).await }
                }),
        )
}
