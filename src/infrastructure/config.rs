use crate::domain::channel::ChannelConfig;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

const ENV_PREFIX: &str = "CHARTS";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory holding one `<channel id>.json` log dump per channel.
    pub logs_dir: PathBuf,
    /// Seconds between logs assumed when a request does not say; the
    /// channel type's default when unset.
    #[serde(default)]
    pub default_interval: Option<i64>,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelsConfig {
    /// Channel id (as a string key) to channel configuration.
    #[serde(default)]
    pub channels: HashMap<String, ChannelConfig>,
    #[serde(default)]
    pub labels: Vec<LabelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LabelConfig {
    pub key: String,
    pub text: String,
}

impl ChannelsConfig {
    /// Channel configurations keyed by numeric channel id.
    pub fn channels_by_id(&self) -> anyhow::Result<HashMap<u32, ChannelConfig>> {
        self.channels
            .iter()
            .map(|(key, channel)| {
                let id = key
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("invalid channel id {:?}", key))?;
                Ok((id, channel.clone()))
            })
            .collect()
    }

    pub fn label_table(&self) -> HashMap<String, String> {
        self.labels
            .iter()
            .map(|label| (label.key.clone(), label.text.clone()))
            .collect()
    }
}

/// `CHARTS_SERVER__BIND` overrides `server.bind`.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server"))
        .add_source(environment())
        .build()
        .context("loading config/server")?;

    Ok(settings.try_deserialize()?)
}

pub fn load_channels_config() -> anyhow::Result<ChannelsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/channels"))
        .build()
        .context("loading config/channels")?;

    Ok(settings.try_deserialize()?)
}
