use teloxide::{
    prelude::Requester as _,
    types::{ChatId, Message},
};

use super::{BotType, TELEGRAM_ESCAPE_RE};

/// Telegram rejects messages above 4096 characters, leave room for markup.
pub(super) const MESSAGE_LIMIT: usize = 3800;

pub fn replace_all(s: &str) -> std::borrow::Cow<'_, str> {
    TELEGRAM_ESCAPE_RE.replace_all(s, "\\$1")
}

pub(super) fn sender_id(msg: &Message) -> Option<u64> {
    msg.from.as_ref().map(|user| user.id.0)
}

/// Split at line boundaries where possible. A chunk never ends in the middle of an escape sequence.
pub(super) fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = vec![];
    let mut current = String::new();

    for line in text.split('\n') {
        let extra = if current.is_empty() { 0 } else { 1 };
        if current.chars().count() + extra + line.chars().count() <= limit {
            if extra == 1 {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        let mut rest = line;
        while rest.chars().count() > limit {
            let mut cut = rest
                .char_indices()
                .nth(limit)
                .map(|(idx, _)| idx)
                .unwrap_or(rest.len());
            let trailing = rest[..cut].chars().rev().take_while(|c| *c == '\\').count();
            if trailing % 2 == 1 && cut > 1 {
                cut -= 1;
            }
            chunks.push(rest[..cut].to_string());
            rest = &rest[cut..];
        }
        current.push_str(rest);
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub(super) async fn send_long(bot: &BotType, chat: ChatId, text: &str) -> anyhow::Result<()> {
    for chunk in split_message(text, MESSAGE_LIMIT) {
        bot.send_message(chat, chunk).await?;
    }
    Ok(())
}
