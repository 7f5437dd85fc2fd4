use anyhow::Result;
use async_trait::async_trait;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::wire::{FormData, ImageRequest, LayoutPlan};

pub mod gemini;
pub mod openai;

/// The generative backend, seen as four independent capabilities.
///
/// Implementations report any transport or parse failure as `Err`; they do
/// not enforce the preview image count, the orchestrator does.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn derive_layout(&self, form: &FormData) -> Result<LayoutPlan>;

    /// Ordered raw base64 payloads.
    async fn generate_images(&self, prompt: &str, req: &ImageRequest) -> Result<Vec<String>>;

    /// Returns HTML already passed through [`crate::extract::extract_html`].
    async fn generate_code(&self, form: &FormData, layout: &str, image_b64: &str) -> Result<String>;

    async fn refine_code(&self, code: &str, instruction: &str) -> Result<String>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    let model = cfg.text_model();
    let image_model = cfg.image_model();
    match cfg.provider {
        ProviderKind::Gemini => Ok(Box::new(gemini::GeminiProvider::new(
            model,
            image_model,
            cfg.api_base.clone(),
            cfg.timeout_secs,
        )?)),
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(
            model,
            image_model,
            cfg.api_base.clone(),
            cfg.timeout_secs,
        )?)),
    }
}
