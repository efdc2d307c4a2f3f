use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::{
    configuration::WebhookSettings,
    domain::change::{ChangeEvent, ChangeKind},
};

const GREEN: u32 = 0x00FF00;
const RED: u32 = 0xFF0000;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed")]
    Request(#[from] reqwest::Error),
    #[error("webhook responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Delivers change events somewhere a human will see them.
#[async_trait]
pub trait Notifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError>;
}

#[derive(Serialize, Debug)]
pub struct WebhookMessage {
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    embeds: Vec<Embed>,
}

#[derive(Serialize, Debug)]
struct Embed {
    author: EmbedAuthor,
    title: String,
    url: String,
    description: &'static str,
    color: u32,
    fields: Vec<EmbedField>,
    thumbnail: EmbedThumbnail,
}

#[derive(Serialize, Debug)]
struct EmbedAuthor {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Serialize, Debug)]
struct EmbedField {
    name: &'static str,
    value: String,
    inline: bool,
}

#[derive(Serialize, Debug)]
struct EmbedThumbnail {
    url: String,
}

/// Posts one Discord embed per change to an execute-webhook URL.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Url,
    settings: WebhookSettings,
    listings_url: String,
}

impl DiscordNotifier {
    /// `client` should carry a request timeout, a webhook that never answers
    /// otherwise stalls the run.
    pub fn new(
        client: Client,
        webhook_url: Url,
        settings: WebhookSettings,
        listings_url: String,
    ) -> Self {
        DiscordNotifier {
            client,
            webhook_url,
            settings,
            listings_url,
        }
    }

    pub fn build_message(&self, event: &ChangeEvent) -> WebhookMessage {
        let record = &event.record;
        let (description, color, author_url) = match event.kind {
            ChangeKind::New => ("**NEW POSITION**", GREEN, Some(self.listings_url.clone())),
            ChangeKind::Removed => ("**REMOVED POSITION**", RED, None),
        };

        WebhookMessage {
            username: self.settings.username.clone(),
            avatar_url: self
                .settings
                .avatar_url
                .clone()
                .filter(|url| !url.is_empty()),
            embeds: vec![Embed {
                author: EmbedAuthor {
                    name: self.settings.username.clone(),
                    url: author_url,
                },
                title: record.title().to_string(),
                url: record.link().to_string(),
                description,
                color,
                fields: vec![
                    EmbedField {
                        name: "Location:",
                        value: record.location().to_string(),
                        inline: true,
                    },
                    EmbedField {
                        name: "Date Added:",
                        value: record.date_posted().to_string(),
                        inline: true,
                    },
                ],
                thumbnail: EmbedThumbnail {
                    url: self.settings.thumbnail_url.clone(),
                },
            }],
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        let message = self.build_message(event);

        let res = self
            .client
            .post(self.webhook_url.clone())
            .json(&message)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        log::info!("Sent {:?} notification for {}", event.kind, event.record);
        Ok(())
    }
}
