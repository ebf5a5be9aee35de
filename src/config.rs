use std::{net::SocketAddr, path::PathBuf};

use anyhow::anyhow;
use serde::Deserialize;
use tokio::fs::read_to_string;

use crate::compendium::DEFAULT_BASE_URL;

const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    telegram: Telegram,
    webhook: Option<Webhook>,
    #[serde(default)]
    storage: Storage,
    #[serde(default)]
    compendium: Compendium,
    /// Health check address from `PORT`, served alongside long polling.
    #[serde(skip)]
    health: Option<SocketAddr>,
}

impl Config {
    pub fn telegram(&self) -> &Telegram {
        &self.telegram
    }

    pub fn webhook(&self) -> Option<&Webhook> {
        self.webhook.as_ref()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn compendium(&self) -> &Compendium {
        &self.compendium
    }

    pub fn health(&self) -> Option<SocketAddr> {
        self.health
    }

    /// A missing file is fine as long as the environment provides the token.
    pub async fn read(file: &str) -> anyhow::Result<Self> {
        let content = match read_to_string(file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("{file} not found, using environment only");
                String::new()
            }
            Err(e) => return Err(anyhow!("Read {file} error: {e:?}")),
        };
        Self::parse(&content, |key| std::env::var(key).ok())
    }

    fn parse(content: &str, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.apply_env(env)?;
        if config.telegram.api_key.is_empty() {
            return Err(anyhow!("Telegram api key is missing, set telegram.api-key or BOT_TOKEN"));
        }
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(token) = env("BOT_TOKEN").filter(|s| !s.is_empty()) {
            self.telegram.api_key = token;
        }

        let external = env("RENDER_EXTERNAL_URL").filter(|s| !s.is_empty());
        let port = env("PORT")
            .map(|port| {
                port.parse::<u16>()
                    .map_err(|e| anyhow!("Parse PORT {port:?} error: {e:?}"))
            })
            .transpose()?;

        if let Some(url) = external {
            let url = format!("{}/webhook", url.trim_end_matches('/'));
            match &mut self.webhook {
                Some(webhook) => webhook.url = url,
                None => {
                    self.webhook = Some(Webhook {
                        url,
                        listen: default_listen(),
                    })
                }
            }
        }

        let Some(port) = port else {
            return Ok(());
        };
        let listen = SocketAddr::from(([0, 0, 0, 0], port));
        match &mut self.webhook {
            Some(webhook) => webhook.listen = listen,
            None => self.health = Some(listen),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Telegram {
    #[serde(alias = "server", alias = "api-server")]
    api_server: Option<String>,
    #[serde(default, alias = "key", alias = "api-key", alias = "api")]
    api_key: String,
}

impl Telegram {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_server(&self) -> Option<&String> {
        self.api_server.as_ref()
    }
}

fn default_listen() -> SocketAddr {
    DEFAULT_LISTEN.parse().unwrap()
}

#[derive(Clone, Debug, Deserialize)]
pub struct Webhook {
    /// Public URL Telegram posts updates to.
    url: String,
    #[serde(default = "default_listen")]
    listen: SocketAddr,
}

impl Webhook {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn listen(&self) -> SocketAddr {
        self.listen
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Storage {
    file: Option<PathBuf>,
}

impl Storage {
    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct Compendium {
    #[serde(default = "default_base_url", alias = "base-url")]
    base_url: String,
}

impl Default for Compendium {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Compendium {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let vars = vars.iter().copied().collect::<HashMap<_, _>>();
        move |key| vars.get(key).map(|s| s.to_string())
    }

    #[test]
    fn test_full_file() {
        let config = Config::parse(
            r#"
            [telegram]
            api-key = "123:abc"
            api-server = "http://localhost:8081"

            [webhook]
            url = "https://bot.example.com/webhook"
            listen = "127.0.0.1:8443"

            [storage]
            file = "fichas.json"

            [compendium]
            base-url = "http://localhost:3000"
            "#,
            env(&[]),
        )
        .unwrap();
        assert_eq!(config.telegram().api_key(), "123:abc");
        assert_eq!(
            config.telegram().api_server().map(String::as_str),
            Some("http://localhost:8081")
        );
        let webhook = config.webhook().unwrap();
        assert_eq!(webhook.url(), "https://bot.example.com/webhook");
        assert_eq!(webhook.listen().port(), 8443);
        assert_eq!(
            config.storage().file().and_then(|p| p.to_str()),
            Some("fichas.json")
        );
        assert_eq!(config.compendium().base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("[telegram]\nkey = \"t\"", env(&[])).unwrap();
        assert!(config.webhook().is_none());
        assert!(config.health().is_none());
        assert!(config.storage().file().is_none());
        assert_eq!(config.compendium().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_token() {
        assert!(Config::parse("", env(&[])).is_err());
    }

    #[test]
    fn test_env_only() {
        let config = Config::parse(
            "",
            env(&[
                ("BOT_TOKEN", "from-env"),
                ("RENDER_EXTERNAL_URL", "https://rpg.onrender.com/"),
                ("PORT", "10000"),
            ]),
        )
        .unwrap();
        assert_eq!(config.telegram().api_key(), "from-env");
        let webhook = config.webhook().unwrap();
        assert_eq!(webhook.url(), "https://rpg.onrender.com/webhook");
        assert_eq!(webhook.listen(), "0.0.0.0:10000".parse::<SocketAddr>().unwrap());
        assert!(config.health().is_none());
    }

    #[test]
    fn test_port_without_webhook() {
        let config = Config::parse("", env(&[("BOT_TOKEN", "t"), ("PORT", "10000")])).unwrap();
        assert!(config.webhook().is_none());
        assert_eq!(config.health(), "0.0.0.0:10000".parse::<SocketAddr>().ok());
        assert!(Config::parse("", env(&[("BOT_TOKEN", "t"), ("PORT", "abc")])).is_err());
    }
}
