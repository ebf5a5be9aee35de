use std::sync::Arc;

use teloxide::{
    Bot,
    dispatching::{HandlerExt as _, UpdateFilterExt as _},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::{Dispatcher, Requester as _, RequesterExt as _},
    types::{CallbackQuery, Message, ParseMode, Update},
    update_listeners::webhooks,
    utils::command::BotCommands,
};

use super::{
    BotType,
    arg::NecessaryArg,
    compendium::{handle_monster_command, handle_spell_command},
    help::{handle_callback_query, handle_help},
    sheet::{SheetEdit, handle_create_command, handle_edit_command, handle_sheet_command},
    table::{
        handle_end_command, handle_initiative_command, handle_narrate_command,
        handle_next_command, handle_order_command, handle_roll_command,
    },
};
use crate::{compendium::Compendium, config::Config, storage::StorageHelper};

const HEALTH_TEXT: &str = "🤖 RPG Bot está rodando perfeitamente!";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    #[command(description = "Boas-vindas e ajuda")]
    Start,
    #[command(description = "Ajuda interativa")]
    Ajuda,
    #[command(description = "Cria sua ficha: /criarficha <nome>")]
    Criarficha { name: String },
    #[command(description = "Mostra sua ficha")]
    Ficha,
    #[command(description = "Adiciona item ao inventário")]
    Additem { item: String },
    #[command(description = "Define um atributo: /atributo des 14")]
    Atributo { line: String },
    #[command(description = "Rola dados: /rolar 1d20+5")]
    Rolar { notation: String },
    #[command(description = "Consulta magia")]
    Magia { name: String },
    #[command(description = "Consulta monstro")]
    Monstro { name: String },
    #[command(description = "Aplica dano")]
    Dano { amount: String },
    #[command(description = "Recupera PV")]
    Cura { amount: String },
    #[command(description = "Mestre narra eventos")]
    Narrar { text: String },
    #[command(description = "Inicia combate: /iniciativa [Goblin+2 Orc]")]
    Iniciativa { line: String },
    #[command(description = "Passa para o próximo turno")]
    Proximo,
    #[command(description = "Mostra a ordem de iniciativa")]
    Ordem,
    #[command(description = "Encerra o combate")]
    Encerrar,
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

fn health_router() -> axum::Router {
    axum::Router::new().route("/", axum::routing::get(health))
}

pub fn bot(config: &Config) -> anyhow::Result<BotType> {
    let bot = Bot::new(config.telegram().api_key());
    Ok(match config.telegram().api_server() {
        Some(url) => bot.set_api_url(url.parse()?),
        None => bot,
    }
    .parse_mode(ParseMode::MarkdownV2))
}

async fn route_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
    cmd: Command,
) -> anyhow::Result<()> {
    match cmd {
        Command::Start | Command::Ajuda => handle_help(bot, msg.chat.id).await,
        Command::Criarficha { name } => handle_create_command(bot, arg, msg, name).await,
        Command::Ficha => handle_sheet_command(bot, arg, msg).await,
        Command::Additem { item } => {
            handle_edit_command(bot, arg, msg, SheetEdit::AddItem, item).await
        }
        Command::Atributo { line } => {
            handle_edit_command(bot, arg, msg, SheetEdit::Attribute, line).await
        }
        Command::Dano { amount } => {
            handle_edit_command(bot, arg, msg, SheetEdit::Damage, amount).await
        }
        Command::Cura { amount } => {
            handle_edit_command(bot, arg, msg, SheetEdit::Heal, amount).await
        }
        Command::Rolar { notation } => handle_roll_command(bot, msg, notation).await,
        Command::Magia { name } => handle_spell_command(bot, arg, msg, name).await,
        Command::Monstro { name } => handle_monster_command(bot, arg, msg, name).await,
        Command::Narrar { text } => handle_narrate_command(bot, msg, text).await,
        Command::Iniciativa { line } => handle_initiative_command(bot, arg, msg, line).await,
        Command::Proximo => handle_next_command(bot, arg, msg).await,
        Command::Ordem => handle_order_command(bot, arg, msg).await,
        Command::Encerrar => handle_end_command(bot, arg, msg).await,
    }
}

pub async fn bot_run(bot: BotType, config: Config, storage: StorageHelper) -> anyhow::Result<()> {
    let arg = Arc::new(NecessaryArg::new(
        storage,
        Compendium::new(config.compendium().base_url())?,
    ));

    bot.set_my_commands(Command::bot_commands())
        .await
        .inspect_err(|e| log::warn!("Set bot commands error: {e:?}"))
        .ok();

    let handle_command_message = Update::filter_message().filter_command::<Command>().endpoint(
        |msg: Message, bot: BotType, arg: Arc<NecessaryArg>, cmd: Command| async move {
            route_command(bot, arg, msg, cmd).await
        },
    );

    let handle_callback_query = Update::filter_callback_query()
        .filter(|q: CallbackQuery| q.data.is_some())
        .endpoint(|q: CallbackQuery, bot: BotType| async move {
            handle_callback_query(bot, q).await
        });

    let mut dispatcher = Dispatcher::builder(
        bot.clone(),
        dptree::entry()
            .branch(handle_command_message)
            .branch(handle_callback_query),
    )
    .dependencies(dptree::deps![arg])
    .default_handler(|_| async {})
    .enable_ctrlc_handler()
    .build();

    let Some(webhook) = config.webhook() else {
        let health_server = match config.health() {
            Some(listen) => {
                let tcp = tokio::net::TcpListener::bind(listen).await?;
                log::info!("Health check listening on {listen}");
                Some(tokio::spawn(async move {
                    axum::serve(tcp, health_router()).await
                }))
            }
            None => None,
        };

        log::info!("No webhook configured, start long polling");
        dispatcher.dispatch().await;

        if let Some(server) = health_server {
            server.abort();
        }
        return Ok(());
    };

    let options = webhooks::Options::new(webhook.listen(), webhook.url().parse()?);
    let (listener, stop_flag, router) = webhooks::axum_to_router(bot, options).await?;
    let app = health_router().merge(router);

    let tcp = tokio::net::TcpListener::bind(webhook.listen()).await?;
    log::info!(
        "Webhook listening on {}, public url: {}",
        webhook.listen(),
        webhook.url()
    );
    let server = tokio::spawn(async move {
        axum::serve(tcp, app)
            .with_graceful_shutdown(stop_flag)
            .await
    });

    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    server.await??;
    Ok(())
}
