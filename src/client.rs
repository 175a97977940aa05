use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

#[derive(Serialize)]
struct ChatRequest {
    message: String,
}

#[derive(Deserialize)]
struct ChatReply {
    reply: String,
}

/// HTTP client for the reply service. Cheap to clone; clones share the
/// underlying connection pool, so spawned request tasks can each take one.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// One round trip: POST the trimmed user text, return the reply text.
    pub async fn send(&self, message: &str) -> Result<String> {
        let url = format!("{}/chat_ai", self.base_url);

        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "chat service returned status {}",
                response.status()
            ));
        }

        let reply: ChatReply = response.json().await?;
        Ok(reply.reply)
    }
}
