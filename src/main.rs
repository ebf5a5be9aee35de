mod bot;
mod compendium;
mod config;
mod functions;
mod rpg;
mod storage;

use bot::{bot, bot_run};
use clap::{ArgMatches, arg};
use config::Config;
use rpg::{DiceSource, RngDice, evaluate};
use storage::StorageHandle;

async fn async_main(config_file: &str) -> anyhow::Result<()> {
    let config = Config::read(config_file).await?;
    let (storage_thread, storage_helper) =
        StorageHandle::open(config.storage().file().cloned()).await?;

    let bot = bot(&config)?;

    bot_run(bot, config, storage_helper.clone()).await?;

    storage_helper.terminate().await;
    storage_thread.wait().await?;

    Ok(())
}

fn roll(matches: &ArgMatches) -> anyhow::Result<()> {
    let notation = matches
        .get_one::<String>("notation")
        .map(String::as_str)
        .unwrap_or_default();
    let mut dice: Box<dyn DiceSource> = match matches.get_one::<u64>("seed") {
        Some(seed) => Box::new(RngDice::seeded(*seed)),
        None => Box::new(RngDice::thread()),
    };

    let result = evaluate(notation, dice.as_mut())?;
    let rolls = result
        .rolls()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    match result.modifier() {
        0 => println!("{}: [{rolls}] = {}", result.expression(), result.total()),
        m => println!(
            "{}: [{rolls}] {m:+} = {}",
            result.expression(),
            result.total()
        ),
    }
    Ok(())
}

fn enable_log(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose < 3 {
        builder
            .filter_module("tracing", log::LevelFilter::Warn)
            .filter_module("hyper", log::LevelFilter::Warn)
            .filter_module("reqwest", log::LevelFilter::Warn);
    }

    if verbose < 2 {
        builder.filter_module("teloxide", log::LevelFilter::Debug);
    }
    if verbose < 1 {
        builder.filter_module("axum", log::LevelFilter::Warn);
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let matches = clap::command!()
        .args(&[
            arg!([CONFIG] "Configure file to read").default_value("config.toml"),
            arg!(-v --verbose ... "More verbose log output"),
        ])
        .subcommand(
            clap::Command::new("roll")
                .about("Roll dice notation locally, e.g. 2d6+3")
                .args(&[
                    arg!(<notation> "Dice notation"),
                    arg!(--seed <seed> "Seed the dice for a reproducible roll")
                        .value_parser(clap::value_parser!(u64)),
                ]),
        )
        .get_matches();

    enable_log(matches.get_count("verbose"));

    if let Some(("roll", sub)) = matches.subcommand() {
        return roll(sub);
    }

    log::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    let config_file = matches
        .get_one::<String>("CONFIG")
        .cloned()
        .unwrap_or_else(|| "config.toml".to_string());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(&config_file))
}
