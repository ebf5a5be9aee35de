use std::sync::Arc;

use anyhow::anyhow;
use itertools::Itertools as _;
use teloxide::{prelude::Requester as _, types::Message};

use crate::rpg::{
    Contender, DiceExpression, InitiativeOrder, Participant, RngDice, RollResult, TableError, Turn,
};

use super::{
    BotType,
    arg::NecessaryArg,
    functions::{send_long, sender_id},
    replace_all,
};

const MAX_DICE: u32 = 100;
const MAX_FACES: u32 = 1000;

/// Rolls the chat can display. The evaluator itself accepts more.
fn readable_limit(expression: &DiceExpression) -> Option<String> {
    if expression.count() > MAX_DICE {
        Some(format!("❌ No máximo {MAX_DICE} dados por rolagem\\."))
    } else if expression.faces() > MAX_FACES {
        Some(format!("❌ Dados com no máximo {MAX_FACES} faces\\."))
    } else {
        None
    }
}

pub(super) fn table_error_message(error: &TableError) -> &'static str {
    match error {
        TableError::InvalidNotation { .. } => "❌ Notação inválida\\. Ex: `2d6+3`",
        TableError::EmptyRoster => {
            "❌ Ninguém para rolar iniciativa\\. Crie fichas ou informe combatentes, ex: /iniciativa Goblin\\+2 Orc"
        }
        TableError::NoActiveEncounter => "❌ Nenhum combate em andamento\\. Use /iniciativa",
    }
}

fn signed(value: i64) -> String {
    replace_all(&format!("{value:+}")).into_owned()
}

pub(super) fn format_roll(result: &RollResult) -> String {
    let modifier = match result.modifier() {
        0 => String::new(),
        m => format!(" {}", signed(m.into())),
    };
    format!(
        "🎲 Rolagem: `{}`\n👉 \\[{}\\]{modifier}\n✨ Total \\= *{}*",
        result.expression(),
        result.rolls().iter().join(", "),
        replace_all(&result.total().to_string()),
    )
}

/// `Goblin`, `Goblin+2`, `Orc-1`. Names may contain digits (`Goblin2`) or inner dashes (`Meio-Orc`).
fn parse_contender(token: &str) -> Option<Contender> {
    let Some(pos) = token.rfind(['+', '-']) else {
        return Some(Contender::new(token, 0));
    };
    let (name, modifier) = token.split_at(pos);
    let digits = &modifier[1..];
    if digits.is_empty() {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Contender::new(token, 0));
    }
    if name.is_empty() {
        return None;
    }
    Some(Contender::new(name, modifier.parse().ok()?))
}

fn parse_contenders(line: &str) -> Result<Vec<Contender>, String> {
    line.split_whitespace()
        .map(|token| parse_contender(token).ok_or_else(|| token.to_string()))
        .collect()
}

fn roll_detail(participant: &Participant) -> String {
    match participant.modifier() {
        0 => participant.roll().to_string(),
        m => format!("{} = {}{:+}", participant.roll(), participant.draw(), m),
    }
}

pub(super) fn format_order(order: &InitiativeOrder, title: &str) -> String {
    let lines = order
        .participants()
        .iter()
        .enumerate()
        .map(|(idx, participant)| {
            format!(
                "{}{}\\. {} \\({}\\)",
                if idx == order.turn() { "👉 " } else { "" },
                idx + 1,
                replace_all(participant.name()),
                replace_all(&roll_detail(participant)),
            )
        })
        .join("\n");
    format!("⚔️ *{title}* \\(rodada {}\\)\n{lines}", order.round())
}

pub(super) fn format_turn(turn: &Turn) -> String {
    let participant = turn.participant();
    let name = replace_all(participant.name());
    format!(
        "👉 Turno de *{}* \\({}º, rodada {}\\)",
        match participant.owner() {
            Some(user) => format!("[{name}](tg://user?id={user})"),
            None => name.into_owned(),
        },
        turn.position(),
        turn.round()
    )
}

pub(super) async fn handle_roll_command(
    bot: BotType,
    msg: Message,
    notation: String,
) -> anyhow::Result<()> {
    if notation.trim().is_empty() {
        bot.send_message(msg.chat.id, "❌ Use: /rolar \\<notação\\>, ex: /rolar 1d20\\+5")
            .await?;
        return Ok(());
    }

    let expression = match DiceExpression::parse(&notation) {
        Ok(expression) => expression,
        Err(e) => {
            log::debug!("Reject roll: {e}");
            bot.send_message(msg.chat.id, table_error_message(&e)).await?;
            return Ok(());
        }
    };
    if let Some(text) = readable_limit(&expression) {
        bot.send_message(msg.chat.id, text).await?;
        return Ok(());
    }

    let result = {
        let mut dice = RngDice::thread();
        expression.roll(&mut dice)
    };
    log::debug!(
        "{:?} rolled {} = {:?}",
        sender_id(&msg),
        result.expression(),
        result.rolls()
    );
    bot.send_message(msg.chat.id, format_roll(&result)).await?;
    Ok(())
}

pub(super) async fn handle_narrate_command(
    bot: BotType,
    msg: Message,
    text: String,
) -> anyhow::Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bot.send_message(msg.chat.id, "❌ Use: /narrar \\<texto\\>")
            .await?;
        return Ok(());
    }
    send_long(
        &bot,
        msg.chat.id,
        &format!("🎭 *NARRAÇÃO*\n{}", replace_all(text)),
    )
    .await
}

pub(super) async fn handle_initiative_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
    line: String,
) -> anyhow::Result<()> {
    let extra = match parse_contenders(&line) {
        Ok(extra) => extra,
        Err(token) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "❌ Combatente inválido: `{}`\\. Use Nome, Nome\\+2 ou Nome\\-1",
                    token.replace('\\', "\\\\").replace('`', "\\`")
                ),
            )
            .await?;
            return Ok(());
        }
    };

    let ret = arg
        .storage()
        .encounter_start(msg.chat.id.0, extra)
        .await
        .ok_or_else(|| anyhow!("Start encounter not response"))?;

    let text = match ret {
        Ok(order) => format_order(&order, "Iniciativa"),
        Err(e) => table_error_message(&e).to_string(),
    };
    send_long(&bot, msg.chat.id, &text).await
}

pub(super) async fn handle_next_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
) -> anyhow::Result<()> {
    let ret = arg
        .storage()
        .encounter_next(msg.chat.id.0)
        .await
        .ok_or_else(|| anyhow!("Next turn not response"))?;

    bot.send_message(
        msg.chat.id,
        match ret {
            Ok(turn) => format_turn(&turn),
            Err(e) => table_error_message(&e).to_string(),
        },
    )
    .await?;
    Ok(())
}

pub(super) async fn handle_order_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
) -> anyhow::Result<()> {
    let order = arg
        .storage()
        .encounter_query(msg.chat.id.0)
        .await
        .ok_or_else(|| anyhow!("Query encounter not response"))?;

    let text = match order {
        Some(order) => format_order(&order, "Ordem de iniciativa"),
        None => table_error_message(&TableError::NoActiveEncounter).to_string(),
    };
    send_long(&bot, msg.chat.id, &text).await
}

pub(super) async fn handle_end_command(
    bot: BotType,
    arg: Arc<NecessaryArg>,
    msg: Message,
) -> anyhow::Result<()> {
    let ended = arg
        .storage()
        .encounter_end(msg.chat.id.0)
        .await
        .ok_or_else(|| anyhow!("End encounter not response"))?;

    bot.send_message(
        msg.chat.id,
        if ended {
            "🏁 Combate encerrado\\."
        } else {
            table_error_message(&TableError::NoActiveEncounter)
        },
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rpg::dice::fixed::FixedDice;

    fn names(contenders: &[Contender]) -> Vec<(&str, i32)> {
        contenders.iter().map(|c| (c.name(), c.modifier())).collect()
    }

    #[test]
    fn test_parse_contenders() {
        assert!(parse_contenders("").unwrap().is_empty());
        assert_eq!(
            names(&parse_contenders("Goblin+2  Orc-1 Lobo Goblin2 Elfo+0").unwrap()),
            [("Goblin", 2), ("Orc", -1), ("Lobo", 0), ("Goblin2", 0), ("Elfo", 0)]
        );
        assert_eq!(
            names(&parse_contenders("Meio-Orc Meio-Orc-2").unwrap()),
            [("Meio-Orc", 0), ("Meio-Orc", -2)]
        );
        assert_eq!(parse_contenders("Goblin +2"), Err("+2".to_string()));
        assert_eq!(parse_contenders("Goblin+"), Err("Goblin+".to_string()));
        assert_eq!(
            parse_contenders("Orc+99999999999"),
            Err("Orc+99999999999".to_string())
        );
    }

    #[test]
    fn test_format_roll() {
        let result = DiceExpression::parse("2d6+3")
            .unwrap()
            .roll(&mut FixedDice::new([4, 2]));
        assert_eq!(
            format_roll(&result),
            "🎲 Rolagem: `2d6+3`\n👉 \\[4, 2\\] \\+3\n✨ Total \\= *9*"
        );

        let result = DiceExpression::parse("d4-3")
            .unwrap()
            .roll(&mut FixedDice::new([1]));
        assert_eq!(
            format_roll(&result),
            "🎲 Rolagem: `1d4-3`\n👉 \\[1\\] \\-3\n✨ Total \\= *\\-2*"
        );
    }

    #[test]
    fn test_format_order_and_turn() {
        let roster = vec![Contender::new("A", 0), Contender::new("B.", 2)];
        let mut order = InitiativeOrder::start(roster, &mut FixedDice::new([5, 15])).unwrap();
        assert_eq!(
            format_order(&order, "Iniciativa"),
            "⚔️ *Iniciativa* \\(rodada 1\\)\n👉 1\\. B\\. \\(17 \\= 15\\+2\\)\n2\\. A \\(5\\)"
        );

        let turn = order.next_turn();
        assert_eq!(format_turn(&turn), "👉 Turno de *B\\.* \\(1º, rodada 1\\)");
        assert!(format_order(&order, "Ordem").contains("👉 2\\. A"));
    }

    #[test]
    fn test_format_turn_mentions_owner() {
        let roster = vec![Contender::new("Aria_2", 0).owned_by(42)];
        let mut order = InitiativeOrder::start(roster, &mut FixedDice::new([9])).unwrap();
        assert_eq!(
            format_turn(&order.next_turn()),
            "👉 Turno de *[Aria\\_2](tg://user?id=42)* \\(1º, rodada 1\\)"
        );
    }

    #[test]
    fn test_readable_limit() {
        assert!(readable_limit(&DiceExpression::parse("100d1000").unwrap()).is_none());
        assert!(
            readable_limit(&DiceExpression::parse("101d6").unwrap())
                .unwrap()
                .contains("100 dados")
        );
        assert!(
            readable_limit(&DiceExpression::parse("1d1001").unwrap())
                .unwrap()
                .contains("1000 faces")
        );
    }

    #[test]
    fn test_error_messages() {
        assert!(table_error_message(&TableError::EmptyRoster).starts_with("❌"));
        assert!(
            table_error_message(&TableError::NoActiveEncounter).contains("/iniciativa")
        );
    }
}
