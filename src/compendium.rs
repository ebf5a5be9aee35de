use std::sync::LazyLock;

use anyhow::anyhow;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::functions::build_reqwest_client;

pub const DEFAULT_BASE_URL: &str = "https://www.dnd5eapi.co";

static SLUG_SEPARATOR_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[\s_]+").unwrap());

/// `"Magic  Missile"` -> `"magic-missile"`
pub fn slug(name: &str) -> String {
    SLUG_SEPARATOR_RE
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

#[derive(Clone, Debug, Deserialize)]
pub struct NamedReference {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Spell {
    pub name: String,
    #[serde(default)]
    pub level: u8,
    pub school: Option<NamedReference>,
    pub casting_time: Option<String>,
    pub range: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub concentration: bool,
    #[serde(default)]
    pub ritual: bool,
    #[serde(default)]
    pub desc: Vec<String>,
    #[serde(default)]
    pub higher_level: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ArmorClass {
    pub value: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Monster {
    pub name: String,
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub alignment: Option<String>,
    #[serde(default)]
    pub armor_class: Vec<ArmorClass>,
    pub hit_points: i32,
    pub hit_dice: Option<String>,
    pub challenge_rating: Option<f64>,
    pub strength: Option<i32>,
    pub dexterity: Option<i32>,
    pub constitution: Option<i32>,
    pub intelligence: Option<i32>,
    pub wisdom: Option<i32>,
    pub charisma: Option<i32>,
}

impl Monster {
    pub fn armor_class(&self) -> Option<i32> {
        self.armor_class.first().map(|ac| ac.value)
    }

    /// (label, score) pairs of the scores the API returned.
    pub fn abilities(&self) -> Vec<(&'static str, i32)> {
        [
            ("FOR", self.strength),
            ("DES", self.dexterity),
            ("CON", self.constitution),
            ("INT", self.intelligence),
            ("SAB", self.wisdom),
            ("CAR", self.charisma),
        ]
        .into_iter()
        .filter_map(|(label, score)| score.map(|score| (label, score)))
        .collect()
    }
}

#[derive(Clone, Debug)]
pub struct Compendium {
    client: Client,
    base_url: String,
}

impl Compendium {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_reqwest_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, category: &str, name: &str) -> String {
        format!("{}/api/{category}/{}", self.base_url, slug(name))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        category: &str,
        name: &str,
    ) -> anyhow::Result<Option<T>> {
        let url = self.url(category, name);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request {url} error: {e:?}"))?;

        if resp.status() != StatusCode::OK {
            log::debug!("{url} returned {}", resp.status());
            return Ok(None);
        }

        let body = resp.bytes().await?;
        Ok(Some(
            serde_json::from_slice(&body).map_err(|e| anyhow!("Decode {url} error: {e:?}"))?,
        ))
    }

    pub async fn spell(&self, name: &str) -> anyhow::Result<Option<Spell>> {
        self.fetch("spells", name).await
    }

    pub async fn monster(&self, name: &str) -> anyhow::Result<Option<Monster>> {
        self.fetch("monsters", name).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Fireball"), "fireball");
        assert_eq!(slug("  Magic   Missile "), "magic-missile");
        assert_eq!(slug("adult_black dragon"), "adult-black-dragon");
    }

    #[test]
    fn test_url() {
        let compendium = Compendium::new("https://example.com/").unwrap();
        assert_eq!(
            compendium.url("spells", "Acid Arrow"),
            "https://example.com/api/spells/acid-arrow"
        );
    }

    #[test]
    fn test_decode_spell() {
        let spell: Spell = serde_json::from_str(
            r#"{
                "index": "fireball",
                "name": "Fireball",
                "desc": ["A bright streak flashes.", "Each creature takes 8d6."],
                "higher_level": ["+1d6 per slot level above 3rd."],
                "range": "150 feet",
                "components": ["V", "S", "M"],
                "ritual": false,
                "duration": "Instantaneous",
                "concentration": false,
                "casting_time": "1 action",
                "level": 3,
                "school": {"index": "evocation", "name": "Evocation", "url": "/api/magic-schools/evocation"}
            }"#,
        )
        .unwrap();
        assert_eq!(spell.level, 3);
        assert_eq!(spell.desc.len(), 2);
        assert_eq!(spell.school.unwrap().name, "Evocation");
    }

    #[test]
    fn test_decode_monster() {
        let monster: Monster = serde_json::from_str(
            r#"{
                "index": "goblin",
                "name": "Goblin",
                "size": "Small",
                "type": "humanoid",
                "alignment": "neutral evil",
                "armor_class": [{"type": "armor", "value": 15}],
                "hit_points": 7,
                "hit_dice": "2d6",
                "strength": 8,
                "dexterity": 14,
                "challenge_rating": 0.25
            }"#,
        )
        .unwrap();
        assert_eq!(monster.armor_class(), Some(15));
        assert_eq!(monster.hit_points, 7);
        assert_eq!(monster.abilities(), vec![("FOR", 8), ("DES", 14)]);
    }
}
