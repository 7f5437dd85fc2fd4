use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::errors::WeaverError;
use crate::extract::extract_html;
use crate::prompt;
use crate::wire::{FormData, ImageRequest, LayoutPlan};
use super::Provider;

const DEFAULT_BASE: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    model: String,
    image_model: String,
    api_base: String,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

fn api_key() -> Result<String> {
    std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .map_err(|_| anyhow!("GEMINI_API_KEY (or API_KEY) env var is not set"))
}

fn layout_schema() -> Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": {
            "type": "OBJECT",
            "properties": {
                "layoutDescription": { "type": "STRING" },
                "imagePrompt": { "type": "STRING" }
            },
            "required": ["layoutDescription", "imagePrompt"]
        }
    })
}

impl GeminiProvider {
    pub fn new(model: String, image_model: String, api_base: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self {
            model,
            image_model,
            api_base: api_base.unwrap_or_else(|| DEFAULT_BASE.to_string()),
            client,
        })
    }

    async fn call<B: Serialize, R: DeserializeOwned>(&self, model: &str, method: &str, body: &B) -> Result<R> {
        let url = format!(
            "{}/v1beta/models/{}:{}",
            self.api_base.trim_end_matches('/'),
            model,
            method
        );
        debug!(%url, "gemini: POST");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key()?)
            .json(body)
            .send()
            .await
            .context("gemini request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("gemini read body failed")?;
        debug!(%status, bytes = text.len(), "gemini: response");

        if !status.is_success() {
            return Err(WeaverError::Provider(format!("Gemini API error ({}): {}", status, text)).into());
        }
        serde_json::from_str(&text).map_err(|e| anyhow!("gemini response parse error: {}", e))
    }

    async fn generate_text(&self, parts: Vec<Part<'_>>, generation_config: Option<Value>) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config,
        };
        let parsed: GenerateResponse = self.call(&self.model, "generateContent", &body).await?;
        Ok(response_text(parsed))
    }
}

/// Concatenated text of the first candidate; empty when the model said nothing.
fn response_text(parsed: GenerateResponse) -> String {
    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default()
}

fn parse_layout(text: &str) -> Result<LayoutPlan> {
    if text.trim().is_empty() {
        return Err(WeaverError::Schema("gemini: empty layout content".into()).into());
    }
    serde_json::from_str(text.trim()).map_err(|e| {
        WeaverError::Schema(format!("layout JSON: {}.\nContent was:\n{}", e, text)).into()
    })
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn derive_layout(&self, form: &FormData) -> Result<LayoutPlan> {
        let prompt = prompt::layout_prompt(form);
        let text = self
            .generate_text(vec![Part::Text { text: &prompt }], Some(layout_schema()))
            .await?;
        parse_layout(&text)
    }

    async fn generate_images(&self, prompt: &str, req: &ImageRequest) -> Result<Vec<String>> {
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": req.count,
                "aspectRatio": req.aspect_ratio,
                "outputOptions": { "mimeType": req.mime_type }
            }
        });
        let parsed: PredictResponse = self.call(&self.image_model, "predict", &body).await?;
        Ok(parsed
            .predictions
            .into_iter()
            .filter_map(|p| p.bytes_base64_encoded)
            .collect())
    }

    async fn generate_code(&self, form: &FormData, layout: &str, image_b64: &str) -> Result<String> {
        let prompt = prompt::code_prompt(form, layout);
        let parts = vec![
            Part::Text { text: &prompt },
            Part::Inline { inline_data: InlineData { mime_type: "image/png", data: image_b64 } },
        ];
        let text = self.generate_text(parts, None).await?;
        Ok(extract_html(&text))
    }

    async fn refine_code(&self, code: &str, instruction: &str) -> Result<String> {
        let prompt = prompt::refine_prompt(code, instruction);
        let text = self.generate_text(vec![Part::Text { text: &prompt }], None).await?;
        Ok(extract_html(&text))
    }
}
