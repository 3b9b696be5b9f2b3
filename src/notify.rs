use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Delivery seam for change reports. The watcher only sees this trait, so
/// the core engine can be exercised without any transport behind it.
pub trait ChannelSink {
    /// Posts one chunk to the destination. Chunks of a report must be
    /// posted in the order produced.
    fn post(&self, content: &str) -> Result<()>;
}

const DISCORD_API: &str = "https://discord.com/api/v10";

/// Channel kinds that accept plain text messages (guild text, DM, group
/// DM, announcement, and the thread kinds).
const TEXT_CAPABLE_KINDS: &[u8] = &[0, 1, 3, 5, 10, 11, 12];

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// A Discord text channel reached over the REST API with a bot token.
pub struct DiscordChannel {
    token: String,
    channel_id: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl DiscordChannel {
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("mirrorwatch")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            token: token.into(),
            channel_id: channel_id.into(),
            base_url: DISCORD_API.to_string(),
            client,
        })
    }

    /// Points the client at a different API root. Used by tests to stand
    /// in a local mock for the real endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Checks once, at startup, that the configured id names a channel the
    /// bot can post text to.
    pub fn resolve(&self) -> Result<()> {
        let info: ChannelInfo = self
            .client
            .get(self.url(&format!("/channels/{}", self.channel_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .context("fetch channel")?
            .error_for_status()
            .context("fetch channel status")?
            .json()
            .context("parse channel")?;

        if !TEXT_CAPABLE_KINDS.contains(&info.kind) {
            anyhow::bail!(
                "channel {} ({}) is not a text channel (type {})",
                self.channel_id,
                info.name.as_deref().unwrap_or("unnamed"),
                info.kind
            );
        }
        Ok(())
    }
}

impl ChannelSink for DiscordChannel {
    fn post(&self, content: &str) -> Result<()> {
        self.client
            .post(self.url(&format!("/channels/{}/messages", self.channel_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&CreateMessage { content })
            .send()
            .context("post message")?
            .error_for_status()
            .context("post message status")?;
        Ok(())
    }
}
