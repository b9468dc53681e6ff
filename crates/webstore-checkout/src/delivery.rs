//! # Command Delivery
//!
//! Sends in-game commands (ranks, kits, keys) to the Minecraft server's
//! delivery endpoint once an order is paid.
//!
//! This is a single best-effort POST with a bearer token. The response reports
//! executed, failed and queued commands, but no queueing or redelivery is
//! implemented here: callers decide what to do with `failed_commands`.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Values substituted into command templates.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub username: String,
    pub quantity: u32,
    pub order_id: String,
    pub product: String,
}

impl CommandContext {
    fn value(&self, placeholder: &str) -> Option<String> {
        match placeholder {
            "username" => Some(self.username.clone()),
            "quantity" => Some(self.quantity.to_string()),
            "order_id" => Some(self.order_id.clone()),
            "product" => Some(self.product.clone()),
            _ => None,
        }
    }
}

/// Replaces `{username}`, `{quantity}`, `{order_id}` and `{product}` in
/// `template` in a single pass, so substituted values are never rescanned.
/// Unknown placeholders are left as they are.
pub fn render_command(template: &str, ctx: &CommandContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            rest = tail;
            break;
        };

        let name = &tail[1..close];
        if name.contains('{') {
            // `{{name}`: keep the first brace and rescan from the next one.
            out.push('{');
            rest = &tail[1..];
            continue;
        }

        match ctx.value(name) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    out
}

#[derive(Debug, Serialize)]
struct CommandRequest<'a> {
    commands: &'a [String],
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinecraftCommandResponse {
    pub success: bool,
    pub executed_commands: Vec<String>,
    pub failed_commands: Vec<String>,
    pub queued_commands: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("delivery endpoint answered HTTP {0}")]
    Status(u16),
}

#[derive(Clone)]
pub struct MinecraftService {
    client: Client,
    endpoint: String,
    token: String,
}

impl MinecraftService {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    fn request(&self, commands: &[String]) -> RequestBuilder {
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&CommandRequest { commands })
    }

    /// Posts `commands` once.
    #[instrument(skip(self, commands), fields(count = commands.len()))]
    pub async fn send_commands(
        &self,
        commands: &[String],
    ) -> Result<MinecraftCommandResponse, DeliveryError> {
        let response = self.request(commands).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Command delivery rejected");
            return Err(DeliveryError::Status(status.as_u16()));
        }

        let body: MinecraftCommandResponse = response.json().await?;
        if !body.failed_commands.is_empty() {
            warn!(failed = ?body.failed_commands, "Some commands failed");
        }
        info!(
            executed = body.executed_commands.len(),
            queued = body.queued_commands.len(),
            "Commands delivered"
        );
        Ok(body)
    }
}
