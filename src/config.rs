use crate::mail::MailConfig;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,

    /// Production mode: TLS-wrapped, authenticated mail delivery.
    #[serde(default)]
    pub in_production: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    pub mail: MailConfig,
}

fn default_log_dir() -> PathBuf {
    "/var/log/album-release-mailer".into()
}

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }
}
