use crate::chat_buffer::ConversationTurn;

/// Thin client for the chat-completions API. The rest of the service treats
/// it as an opaque text generator: role-tagged turns in, free-form text out.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            api_key,
            model,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub async fn complete(&self, turns: &[ConversationTurn]) -> Result<String, anyhow::Error> {
        let response = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": turns,
                "max_tokens": 300,
                "temperature": 0.8,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error {}: {}", status, body);
        }

        let completion: serde_json::Value = response.json().await?;
        let text = completion["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("OpenAI response missing message content"))?;

        Ok(text.trim().to_string())
    }
}
