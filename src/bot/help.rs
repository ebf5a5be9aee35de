use teloxide::{
    payloads::{EditMessageTextSetters as _, SendMessageSetters as _},
    prelude::Requester as _,
    types::{CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup},
};

use super::{BotType, replace_all};

const MENU_TEXT: &str = "📖 *RPG Bot – Ajuda Interativa*\n\nEscolha uma categoria para ver os comandos:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Category {
    Sheet,
    Inventory,
    Roll,
    Compendium,
    Health,
    Combat,
    Narration,
}

impl Category {
    const ALL: [Self; 7] = [
        Self::Sheet,
        Self::Inventory,
        Self::Roll,
        Self::Compendium,
        Self::Health,
        Self::Combat,
        Self::Narration,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Sheet => "ficha",
            Self::Inventory => "inv",
            Self::Roll => "rolar",
            Self::Compendium => "magia",
            Self::Health => "pv",
            Self::Combat => "combate",
            Self::Narration => "narracao",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    fn button(self) -> &'static str {
        match self {
            Self::Sheet => "📜 Ficha",
            Self::Inventory => "🎒 Inventário",
            Self::Roll => "🎲 Rolagens",
            Self::Compendium => "✨ Magias/Monstros",
            Self::Health => "❤️ PV/Dano/Cura",
            Self::Combat => "⚔️ Combate",
            Self::Narration => "🎭 Narração",
        }
    }

    fn lines(self) -> &'static [&'static str] {
        match self {
            Self::Sheet => &[
                "• /criarficha <nome> → Cria sua ficha",
                "• /ficha → Mostra sua ficha atual",
                "• /atributo <nome> <valor> → Define um atributo (ex: des 14)",
            ],
            Self::Inventory => &["• /additem <item> → Adiciona item ao inventário"],
            Self::Roll => &[
                "• /rolar <notação> → Rola dados (ex: 1d20+5, 2d6-1, d8)",
            ],
            Self::Compendium => &[
                "• /magia <nome> → Consulta magia",
                "• /monstro <nome> → Consulta monstro",
            ],
            Self::Health => &[
                "• /dano <valor> → Aplica dano",
                "• /cura <valor> → Recupera PV",
            ],
            Self::Combat => &[
                "• /iniciativa [Nome+2 Nome-1 ...] → Inicia combate com as fichas do chat e combatentes extras",
                "• /proximo → Passa para o próximo turno",
                "• /ordem → Mostra a ordem de iniciativa",
                "• /encerrar → Encerra o combate",
            ],
            Self::Narration => &["• /narrar <texto> → Mestre narra eventos"],
        }
    }

    fn text(self) -> String {
        format!(
            "*{}*\n{}",
            replace_all(self.button()),
            self.lines().iter().map(|line| replace_all(line)).collect::<Vec<_>>().join("\n")
        )
    }
}

fn menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(Category::ALL.into_iter().map(|category| {
        [InlineKeyboardButton::callback(
            category.button(),
            format!("help {}", category.key()),
        )]
    }))
}

fn back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::callback("🔙 Voltar", "help back")]])
}

pub(super) async fn handle_help(bot: BotType, chat: ChatId) -> anyhow::Result<()> {
    bot.send_message(chat, MENU_TEXT)
        .reply_markup(menu_keyboard())
        .await?;
    Ok(())
}

pub(super) async fn handle_callback_query(bot: BotType, q: CallbackQuery) -> anyhow::Result<()> {
    let Some((first, second)) = q.data.as_ref().and_then(|text| text.split_once(' ')) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    if let ("help", Some(msg)) = (first, q.message.as_ref()) {
        let (text, keyboard) = match Category::from_key(second) {
            Some(category) => (category.text(), back_keyboard()),
            None => (MENU_TEXT.to_string(), menu_keyboard()),
        };
        bot.edit_message_text(msg.chat().id, msg.id(), text)
            .reply_markup(keyboard)
            .await?;
    }

    bot.answer_callback_query(q.id).await?;
    Ok(())
}
