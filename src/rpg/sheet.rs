use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::Contender;

pub const DEFAULT_HP: i64 = 100;
const DEXTERITY_ALIASES: &[&str] = &["des", "destreza", "dex"];

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CharacterSheet {
    name: String,
    hp: i64,
    #[serde(default)]
    attributes: BTreeMap<String, i32>,
    #[serde(default)]
    inventory: Vec<String>,
}

impl CharacterSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hp: DEFAULT_HP,
            attributes: BTreeMap::new(),
            inventory: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hp(&self) -> i64 {
        self.hp
    }

    pub fn attributes(&self) -> &BTreeMap<String, i32> {
        &self.attributes
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    pub fn damage(&mut self, amount: u32) {
        self.hp = (self.hp - i64::from(amount)).max(0);
    }

    pub fn heal(&mut self, amount: u32) {
        self.hp += i64::from(amount);
    }

    pub fn add_item(&mut self, item: impl Into<String>) {
        self.inventory.push(item.into());
    }

    pub fn set_attribute(&mut self, attribute: &str, value: i32) {
        self.attributes.insert(attribute.to_lowercase(), value);
    }

    /// D&D style ability modifier of the dexterity attribute, 0 when the sheet has none.
    pub fn initiative_modifier(&self) -> i32 {
        DEXTERITY_ALIASES
            .iter()
            .find_map(|alias| self.attributes.get(*alias))
            .map(|score| (i64::from(*score) - 10).div_euclid(2))
            .and_then(|modifier| i32::try_from(modifier).ok())
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetChange {
    AddItem(String),
    SetAttribute(String, i32),
    Damage(u32),
    Heal(u32),
}

impl SheetChange {
    pub fn apply(self, sheet: &mut CharacterSheet) {
        match self {
            Self::AddItem(item) => sheet.add_item(item),
            Self::SetAttribute(attribute, value) => sheet.set_attribute(&attribute, value),
            Self::Damage(amount) => sheet.damage(amount),
            Self::Heal(amount) => sheet.heal(amount),
        }
    }
}

/// chat id -> user id -> sheet
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Sheets {
    chats: HashMap<i64, HashMap<u64, CharacterSheet>>,
}

impl Sheets {
    pub fn get(&self, chat: i64, user: u64) -> Option<&CharacterSheet> {
        self.chats.get(&chat)?.get(&user)
    }

    pub fn get_mut(&mut self, chat: i64, user: u64) -> Option<&mut CharacterSheet> {
        self.chats.get_mut(&chat)?.get_mut(&user)
    }

    /// Replaces the user's previous sheet in this chat.
    pub fn insert(&mut self, chat: i64, user: u64, sheet: CharacterSheet) {
        self.chats.entry(chat).or_default().insert(user, sheet);
    }

    /// Every sheet of the chat, ordered by user id so the roster is reproducible.
    pub fn roster(&self, chat: i64) -> Vec<Contender> {
        let Some(sheets) = self.chats.get(&chat) else {
            return vec![];
        };
        let mut users = sheets.iter().collect::<Vec<_>>();
        users.sort_by_key(|(user, _)| **user);
        users
            .into_iter()
            .map(|(user, sheet)| {
                Contender::new(sheet.name(), sheet.initiative_modifier()).owned_by(*user as i64)
            })
            .collect()
    }
}
