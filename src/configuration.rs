use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub careers: CareersSettings,
    pub webhook: WebhookSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CareersSettings {
    pub base_url: String,
    pub listings_path: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Upper bound on pages fetched for a single filter combination.
    pub max_pages: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WebhookSettings {
    pub username: String,
    pub avatar_url: Option<String>,
    pub thumbnail_url: String,
}

impl CareersSettings {
    pub fn listings_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.listings_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Built-in defaults, then `configuration/base.yaml` if present, then
/// `APP_`-prefixed environment variables (`APP_CAREERS__TIMEOUT_SECS=10`).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    Config::builder()
        .set_default("careers.base_url", "https://nfcucareers.ttcportals.com")?
        .set_default("careers.listings_path", "/search/jobs")?
        .set_default(
            "careers.user_agent",
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
        )?
        .set_default("careers.timeout_secs", 30_i64)?
        .set_default("careers.max_pages", 100_i64)?
        .set_default("webhook.username", "🌐 NFCU Job Notifier")?
        .set_default(
            "webhook.thumbnail_url",
            "https://nfcucareers.ttcportals.com/system/production/assets/331061/original/social-image.png",
        )?
        .add_source(File::new("configuration/base", FileFormat::Yaml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
