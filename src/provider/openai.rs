use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::errors::WeaverError;
use crate::extract::{extract_first_json_object, extract_html};
use crate::prompt;
use crate::wire::{FormData, ImageRequest, LayoutPlan};

const DEFAULT_BASE: &str = "https://api.openai.com";

/// OpenAI chat-completions for text and vision, images/generations for mockups.
pub struct OpenAIProvider {
    model: String,
    image_model: String,
    base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(model: String, image_model: String, base: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self {
            model,
            image_model,
            base: base.unwrap_or_else(|| DEFAULT_BASE.to_string()),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<String> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY env var is not set"))?;
        let url = self.url(path);
        debug!(%url, "openai: POST");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;
        debug!(%status, bytes = text.len(), "openai: response");

        if !status.is_success() {
            return Err(WeaverError::Provider(format!("OpenAI API error ({}): {}", status, text)).into());
        }
        Ok(text)
    }

    async fn chat(&self, messages: Value, json_mode: bool) -> Result<String> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        let text = self.post("/v1/chat/completions", &body).await?;

        chat_content(&text)
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

/// Text of the first choice; a missing or null `content` reads as empty.
fn chat_content(text: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(text)
        .map_err(|e| anyhow!("Failed to parse OpenAI response: {e}\nRaw: {text}"))?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}

fn parse_layout(content: &str) -> Result<LayoutPlan> {
    if content.trim().is_empty() {
        return Err(WeaverError::Schema("openai: empty layout content".into()).into());
    }
    // Try strict parse first
    if let Ok(plan) = serde_json::from_str::<LayoutPlan>(content) {
        return Ok(plan);
    }
    // Fallback: extract first {...} JSON object from the text, then parse it.
    if let Some(obj) = extract_first_json_object(content) {
        if let Ok(plan) = serde_json::from_str::<LayoutPlan>(&obj) {
            return Ok(plan);
        }
    }
    Err(WeaverError::Schema(format!(
        "model did not return a valid layout object.\n--- content start ---\n{}\n--- content end ---",
        content
    ))
    .into())
}

/// gpt-image models accept a small set of sizes; pick by orientation.
fn size_for_aspect(aspect_ratio: &str) -> &'static str {
    let mut parts = aspect_ratio.split(':').map(|p| p.trim().parse::<u32>().unwrap_or(1));
    let (w, h) = (parts.next().unwrap_or(1), parts.next().unwrap_or(1));
    if w > h {
        "1536x1024"
    } else if h > w {
        "1024x1536"
    } else {
        "1024x1024"
    }
}

fn output_format(mime_type: &str) -> &str {
    mime_type.strip_prefix("image/").unwrap_or("png")
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    async fn derive_layout(&self, form: &FormData) -> Result<LayoutPlan> {
        let messages = json!([{ "role": "user", "content": prompt::layout_prompt(form) }]);
        let content = self.chat(messages, true).await?;
        parse_layout(&content)
    }

    async fn generate_images(&self, prompt: &str, req: &ImageRequest) -> Result<Vec<String>> {
        let body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "n": req.count,
            "size": size_for_aspect(&req.aspect_ratio),
            "output_format": output_format(&req.mime_type),
        });
        let text = self.post("/v1/images/generations", &body).await?;

        #[derive(Deserialize)]
        struct Image {
            b64_json: Option<String>,
        }
        #[derive(Deserialize)]
        struct ImagesResponse {
            #[serde(default)]
            data: Vec<Image>,
        }

        let parsed: ImagesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse OpenAI images response: {e}"))?;
        Ok(parsed.data.into_iter().filter_map(|i| i.b64_json).collect())
    }

    async fn generate_code(&self, form: &FormData, layout: &str, image_b64: &str) -> Result<String> {
        let messages = json!([{
            "role": "user",
            "content": [
                { "type": "text", "text": prompt::code_prompt(form, layout) },
                { "type": "image_url", "image_url": { "url": format!("data:image/png;base64,{image_b64}") } }
            ]
        }]);
        let content = self.chat(messages, false).await?;
        Ok(extract_html(&content))
    }

    async fn refine_code(&self, code: &str, instruction: &str) -> Result<String> {
        let messages = json!([{ "role": "user", "content": prompt::refine_prompt(code, instruction) }]);
        let content = self.chat(messages, false).await?;
        Ok(extract_html(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_orientation() {
        assert_eq!(size_for_aspect("16:9"), "1536x1024");
        assert_eq!(size_for_aspect("9:16"), "1024x1536");
        assert_eq!(size_for_aspect("1:1"), "1024x1024");
    }

    #[test]
    fn format_from_mime() {
        assert_eq!(output_format("image/png"), "png");
        assert_eq!(output_format("image/jpeg"), "jpeg");
        assert_eq!(output_format("weird"), "png");
    }

    #[test]
    fn null_content_passes_through_as_code() {
        let content = chat_content(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(content, "");
        assert_eq!(extract_html(&content), "");
        let content = chat_content(r#"{"choices":[{"message":{"content":"  <p>x</p> "}}]}"#).unwrap();
        assert_eq!(extract_html(&content), "<p>x</p>");
    }

    #[test]
    fn unparseable_envelope_is_an_error() {
        assert!(chat_content("not json").is_err());
    }

    #[test]
    fn layout_rejects_blank_and_recovers_from_prose() {
        assert!(parse_layout("   ").unwrap_err().downcast_ref::<WeaverError>().is_some());
        let plan = parse_layout("Here: {\"layoutDescription\":\"l\",\"imagePrompt\":\"p\"} done").unwrap();
        assert_eq!(plan.image_prompt, "p");
    }
}
