mod arg;
mod command;
mod compendium;
mod functions;
mod help;
mod sheet;
mod table;

use std::sync::LazyLock;

use teloxide::{Bot, adaptors::DefaultParseMode};

pub type BotType = DefaultParseMode<Bot>;

static TELEGRAM_ESCAPE_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"([_*\[\]\(\)~`>#\+\-=|\{}\.!\\])").unwrap());

pub use command::{bot, bot_run};
pub use functions::replace_all;
