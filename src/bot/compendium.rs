use std::sync::Arc;

use itertools::Itertools as _;
use teloxide::{prelude::Requester as _, types::Message};

use crate::compendium::{Monster, Spell};

use super::{BotType, arg::NecessaryArg, functions::send_long, replace_all};

fn format_spell(spell: &Spell) -> String {
    let mut lines = vec![format!("✨ *{}*", replace_all(&spell.name))];

    let level = if spell.level == 0 {
        "Truque".to_string()
    } else {
        format!("{}º nível", spell.level)
    };
    lines.push(format!(
        "_{}_",
        replace_all(&match &spell.school {
            Some(school) => format!("{level}, {}", school.name),
            None => level,
        })
    ));

    for (label, value) in [
        ("⏱ Tempo de conjuração", spell.casting_time.as_deref()),
        ("📏 Alcance", spell.range.as_deref()),
        ("⌛ Duração", spell.duration.as_deref()),
    ] {
        if let Some(value) = value {
            lines.push(format!("{label}: {}", replace_all(value)));
        }
    }
    if !spell.components.is_empty() {
        lines.push(format!(
            "🧩 Componentes: {}",
            replace_all(&spell.components.join(", "))
        ));
    }
    if spell.concentration {
        lines.push("🧠 Concentração".into());
    }
    if spell.ritual {
        lines.push("📿 Ritual".into());
    }

    if !spell.desc.is_empty() {
        lines.push(String::new());
        lines.extend(spell.desc.iter().map(|paragraph| replace_all(paragraph).into_owned()));
    }
    if !spell.higher_level.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "*Em níveis superiores:* {}",
            replace_all(&spell.higher_level.join(" "))
        ));
    }
    lines.join("\n")
}

fn format_challenge(rating: f64) -> String {
    match rating {
        r if r == 0.125 => "1/8".into(),
        r if r == 0.25 => "1/4".into(),
        r if r == 0.5 => "1/2".into(),
        r => r.to_string(),
    }
}

fn format_monster(monster: &Monster) -> String {
    let mut lines = vec![format!("👹 *{}*", replace_all(&monster.name))];

    let summary = [
        monster.size.as_deref(),
        monster.kind.as_deref(),
        monster.alignment.as_deref(),
    ]
    .into_iter()
    .flatten()
    .join(", ");
    if !summary.is_empty() {
        lines.push(format!("_{}_", replace_all(&summary)));
    }

    lines.push(String::new());
    lines.push(match &monster.hit_dice {
        Some(dice) => format!(
            "❤️ HP: {} \\({}\\)",
            monster.hit_points,
            replace_all(dice)
        ),
        None => format!("❤️ HP: {}", monster.hit_points),
    });
    if let Some(ac) = monster.armor_class() {
        lines.push(format!("🛡 AC: {ac}"));
    }
    if let Some(rating) = monster.challenge_rating {
        lines.push(format!(
            "☠️ ND: {}",
            replace_all(&format_challenge(rating))
        ));
    }

    let abilities = monster.abilities();
    if !abilities.is_empty() {
        lines.push(format!(
            "📊 {}",
            abilities
                .into_iter()
                .map(|(label, score)| format!("{label} {score}"))
                .join(" \\| ")
        ));
    }
    lines.join("\n")
}

pub(super) async fn handle_spell_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
    name: String,
) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        bot.send_message(msg.chat.id, "❌ Use: /magia \\<nome da magia\\>")
            .await?;
        return Ok(());
    }

    match arg
        .compendium()
        .spell(&name)
        .await
        .inspect_err(|e| log::warn!("Query spell {name:?} error: {e:?}"))
    {
        Ok(Some(spell)) => send_long(&bot, msg.chat.id, &format_spell(&spell)).await?,
        _ => {
            bot.send_message(msg.chat.id, "❌ Magia não encontrada\\.")
                .await?;
        }
    }
    Ok(())
}

pub(super) async fn handle_monster_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
    name: String,
) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        bot.send_message(msg.chat.id, "❌ Use: /monstro \\<nome do monstro\\>")
            .await?;
        return Ok(());
    }

    match arg
        .compendium()
        .monster(&name)
        .await
        .inspect_err(|e| log::warn!("Query monster {name:?} error: {e:?}"))
    {
        Ok(Some(monster)) => send_long(&bot, msg.chat.id, &format_monster(&monster)).await?,
        _ => {
            bot.send_message(msg.chat.id, "❌ Monstro não encontrado\\.")
                .await?;
        }
    }
    Ok(())
}
