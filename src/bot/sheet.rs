use std::sync::Arc;

use anyhow::anyhow;
use itertools::Itertools as _;
use teloxide::{prelude::Requester as _, types::Message};

use crate::rpg::{CharacterSheet, SheetChange, sheet::DEFAULT_HP};

use super::{BotType, arg::NecessaryArg, functions::sender_id, replace_all};

const NAME_LIMIT: usize = 64;
pub(super) const NO_SHEET: &str = "❌ Você não tem uma ficha\\. Use /criarficha \\<nome\\>\\.";
const NO_SENDER: &str = "❌ Não consegui identificar quem enviou o comando\\.";

pub(super) fn format_sheet(sheet: &CharacterSheet) -> String {
    let mut lines = vec![
        format!("📜 *Ficha de {}*", replace_all(sheet.name())),
        format!("❤️ PV: {}", sheet.hp()),
    ];
    if !sheet.attributes().is_empty() {
        lines.push(format!(
            "📊 Atributos: {}",
            replace_all(
                &sheet
                    .attributes()
                    .iter()
                    .map(|(name, value)| format!("{name} {value}"))
                    .join(", ")
            )
        ));
    }
    lines.push(format!(
        "🎒 Inventário: {}",
        if sheet.inventory().is_empty() {
            "vazio".into()
        } else {
            replace_all(&sheet.inventory().join(", ")).into_owned()
        }
    ));
    lines.join("\n")
}

fn parse_amount(input: &str) -> Option<u32> {
    input.trim().parse().ok().filter(|amount| *amount > 0)
}

fn parse_attribute(line: &str) -> Option<(String, i32)> {
    let (name, value) = line.split_whitespace().collect_tuple()?;
    Some((name.to_lowercase(), value.parse().ok()?))
}

pub(super) async fn handle_create_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
    name: String,
) -> anyhow::Result<()> {
    let Some(user) = sender_id(&msg) else {
        bot.send_message(msg.chat.id, NO_SENDER).await?;
        return Ok(());
    };
    let name = name.trim();
    if name.is_empty() || name.chars().count() > NAME_LIMIT {
        bot.send_message(msg.chat.id, "❌ Use: /criarficha \\<nome\\>")
            .await?;
        return Ok(());
    }

    let sheet = arg
        .storage()
        .sheet_create(msg.chat.id.0, user, name.to_string())
        .await
        .ok_or_else(|| anyhow!("Create sheet not response"))?;

    bot.send_message(
        msg.chat.id,
        format!(
            "✅ Ficha criada para *{}* com {DEFAULT_HP} PV\\.",
            replace_all(sheet.name())
        ),
    )
    .await?;
    Ok(())
}

pub(super) async fn handle_sheet_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
) -> anyhow::Result<()> {
    let Some(user) = sender_id(&msg) else {
        bot.send_message(msg.chat.id, NO_SENDER).await?;
        return Ok(());
    };

    let sheet = arg
        .storage()
        .sheet_query(msg.chat.id.0, user)
        .await
        .ok_or_else(|| anyhow!("Query sheet not response"))?;

    bot.send_message(
        msg.chat.id,
        match sheet {
            Some(sheet) => format_sheet(&sheet),
            None => NO_SHEET.to_string(),
        },
    )
    .await?;
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SheetEdit {
    AddItem,
    Attribute,
    Damage,
    Heal,
}

impl SheetEdit {
    fn usage(self) -> &'static str {
        match self {
            Self::AddItem => "❌ Use: /additem \\<item\\>",
            Self::Attribute => "❌ Use: /atributo \\<nome\\> \\<valor\\>, ex: /atributo des 14",
            Self::Damage => "❌ Use: /dano \\<valor\\>",
            Self::Heal => "❌ Use: /cura \\<valor\\>",
        }
    }

    fn parse(self, input: &str) -> Option<SheetChange> {
        match self {
            Self::AddItem => Some(input.trim())
                .filter(|item| !item.is_empty())
                .map(|item| SheetChange::AddItem(item.to_string())),
            Self::Attribute => {
                parse_attribute(input).map(|(name, value)| SheetChange::SetAttribute(name, value))
            }
            Self::Damage => parse_amount(input).map(SheetChange::Damage),
            Self::Heal => parse_amount(input).map(SheetChange::Heal),
        }
    }
}

fn format_change(change: &SheetChange, sheet: &CharacterSheet) -> String {
    let name = replace_all(sheet.name());
    match change {
        SheetChange::AddItem(item) => {
            format!("🎒 Item *{}* adicionado ao inventário\\.", replace_all(item))
        }
        SheetChange::SetAttribute(attribute, value) => format!(
            "📊 {name}: {} \\= {}",
            replace_all(attribute),
            replace_all(&value.to_string())
        ),
        SheetChange::Damage(amount) => format!(
            "💔 {name} recebeu {amount} de dano\\. PV atual: {}",
            sheet.hp()
        ),
        SheetChange::Heal(amount) => {
            format!("💚 {name} recuperou {amount} PV\\. PV atual: {}", sheet.hp())
        }
    }
}

pub(super) async fn handle_edit_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
    edit: SheetEdit,
    input: String,
) -> anyhow::Result<()> {
    let Some(user) = sender_id(&msg) else {
        bot.send_message(msg.chat.id, NO_SENDER).await?;
        return Ok(());
    };
    let Some(change) = edit.parse(&input) else {
        bot.send_message(msg.chat.id, edit.usage()).await?;
        return Ok(());
    };

    let sheet = arg
        .storage()
        .sheet_modify(msg.chat.id.0, user, change.clone())
        .await
        .ok_or_else(|| anyhow!("Modify sheet not response"))?;

    bot.send_message(
        msg.chat.id,
        match sheet {
            Some(sheet) => format_change(&change, &sheet),
            None => NO_SHEET.to_string(),
        },
    )
    .await?;
    Ok(())
}
