use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::anyhow;

use crate::rpg::{Encounters, Sheets};

/// Sheets live in memory and are mirrored to an optional JSON file. Encounters are memory only.
#[derive(Debug, Default)]
pub(super) struct Store {
    file: Option<PathBuf>,
    pub(super) sheets: Sheets,
    pub(super) encounters: Encounters,
}

impl Store {
    pub(super) async fn load(file: Option<PathBuf>) -> anyhow::Result<Self> {
        let sheets = match &file {
            Some(path) => Self::read_sheets(path).await?,
            None => Sheets::default(),
        };
        Ok(Self {
            file,
            sheets,
            encounters: Encounters::default(),
        })
    }

    async fn read_sheets(path: &Path) -> anyhow::Result<Sheets> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) if content.trim().is_empty() => Ok(Sheets::default()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| anyhow!("Parse {} error: {e:?}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("{} not exists, start with empty sheets", path.display());
                Ok(Sheets::default())
            }
            Err(e) => Err(anyhow!("Read {} error: {e:?}", path.display())),
        }
    }

    /// Write to a sibling file first, then rename over the target.
    pub(super) async fn flush(&self) -> anyhow::Result<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let body = serde_json::to_vec_pretty(&self.sheets)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| anyhow!("Write {} error: {e:?}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| anyhow!("Rename {} error: {e:?}", tmp.display()))?;
        Ok(())
    }
}
