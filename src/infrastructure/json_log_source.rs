// LogSource backed by exported JSON log dumps
use crate::application::log_source::LogSource;
use crate::domain::log::RawLog;
use anyhow::Context;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads `<dir>/<channel id>.json`, a JSON array of log objects.
pub struct JsonLogSource {
    dir: PathBuf,
}

impl JsonLogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, channel_id: u32) -> PathBuf {
        self.dir.join(format!("{}.json", channel_id))
    }
}

async fn read_dump(path: &Path) -> anyhow::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

#[async_trait]
impl LogSource for JsonLogSource {
    async fn fetch_logs(&self, channel_id: u32) -> anyhow::Result<Vec<RawLog>> {
        let path = self.path_for(channel_id);
        let Some(bytes) = read_dump(&path).await? else {
            tracing::debug!(channel_id, path = %path.display(), "no log dump for channel");
            return Ok(Vec::new());
        };

        let logs: Vec<RawLog> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!(channel_id, count = logs.len(), "loaded channel logs");
        Ok(logs)
    }
}
