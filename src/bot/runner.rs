use crate::bot::handlers;
use crate::bot::request::{Command, PaperRequest};
use crate::config::Settings;
use crate::papers::{HttpTitleResolver, PaperRegistry, TitleResolver, TsvPaperStore};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

/// Run the Telegram bot until interrupted.
pub async fn run_bot(settings: Arc<Settings>) {
    let registry = init_registry(&settings).await;

    let resolver: Arc<dyn TitleResolver> =
        Arc::new(HttpTitleResolver::new(settings.title_fetch_timeout()));
    info!(
        "Title resolver initialized (timeout: {}s).",
        settings.title_fetch_timeout_secs
    );

    let bot = Bot::new(settings.telegram_token.clone());
    register_commands(&bot).await;
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![registry, resolver, settings])
        .default_handler(|upd| async move {
            debug!("Ignoring update {}", upd.id.0);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn init_registry(settings: &Settings) -> Arc<PaperRegistry> {
    let path = settings.papers_path();
    let registry = PaperRegistry::new(TsvPaperStore::new(&path, settings.schema));

    match registry.list().await {
        Ok(records) => info!(
            "Papers registry at {} loaded with {} papers (schema: {}).",
            path.display(),
            records.len(),
            settings.schema
        ),
        Err(e) => error!(
            "Papers registry at {} is unreadable: {}. Commands will fail until it is fixed or cleared.",
            path.display(),
            e
        ),
    }

    Arc::new(registry)
}

async fn register_commands(bot: &Bot) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .filter_map(|msg: Message, me: Me, settings: Arc<Settings>| {
            let text = msg.text().or_else(|| msg.caption())?;
            PaperRequest::classify(text, me.username(), &settings.submission_tag)
        })
        .endpoint(handle_request)
}

async fn handle_request(
    bot: Bot,
    msg: Message,
    request: PaperRequest,
    registry: Arc<PaperRegistry>,
    resolver: Arc<dyn TitleResolver>,
    settings: Arc<Settings>,
) -> Result<(), teloxide::RequestError> {
    let res = match request.clone() {
        PaperRequest::Usage => handlers::usage(bot, msg.clone(), settings).await,
        PaperRequest::Poll => handlers::poll(bot, msg.clone(), registry, settings).await,
        PaperRequest::Info => handlers::info(bot, msg.clone(), registry).await,
        PaperRequest::Clear => handlers::clear(bot, msg.clone(), registry).await,
        PaperRequest::Submit(text) => {
            handlers::submit(bot, msg.clone(), text, registry, resolver, settings).await
        }
    };

    if let Err(e) = res {
        error!(
            chat_id = msg.chat.id.0,
            message_id = msg.id.0,
            request = ?request,
            text = msg.text().unwrap_or_default(),
            "Handler error: {e:#}"
        );
    }
    respond(())
}
