use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::AutobumpError;

use super::provider::LLMProvider;

/// OpenAI-compatible chat completion client. Any endpoint speaking the
/// `/chat/completions` protocol works, including self-hosted gateways.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: &str, endpoint: Option<&str>, model: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.unwrap_or("gpt-4o").to_string(),
            base_url: endpoint
                .filter(|e| !e.is_empty())
                .unwrap_or("https://api.openai.com/v1")
                .to_string(),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, AutobumpError> {
        if self.api_key.is_empty() {
            return Err(AutobumpError::Authentication("AI API key not configured".into()));
        }

        let mut messages = Vec::new();
        if let Some(sys) = system {
            messages.push(json!({"role": "system", "content": sys}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.3,
            "max_tokens": 2000,
        });

        let resp = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AutobumpError::Network(format!("AI request failed: {}", e)))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(AutobumpError::LLMApi("rate limited".into()));
        }
        if status.as_u16() == 401 {
            return Err(AutobumpError::Authentication("Invalid AI API key".into()));
        }

        let data: Value = resp.json().await
            .map_err(|e| AutobumpError::LLMApi(format!("Failed to parse AI response: {}", e)))?;

        if let Some(error) = data.get("error") {
            return Err(AutobumpError::LLMApi(
                error["message"].as_str().unwrap_or("Unknown").to_string(),
            ));
        }

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AutobumpError::LLMApi("No content in AI response".into()))?
            .to_string();

        Ok(content)
    }

    fn provider_name(&self) -> &str { "openai" }
    fn model_name(&self) -> &str { &self.model }
}
