use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "google")]
    Gemini,
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
}

impl ProviderKind {
    pub fn default_text_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.5-pro",
            ProviderKind::OpenAI => "gpt-4.1",
        }
    }

    pub fn default_image_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "imagen-4.0-generate-001",
            ProviderKind::OpenAI => "gpt-image-1",
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(name = "ui_weaver", version, about = "Design and generate a web UI in a few guided steps")]
pub struct Args {
    /// TOML config file; flags below override it
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Text/vision model used for layout, code and refinement
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub image_model: Option<String>,

    /// Override the provider's API base URL
    #[arg(long)]
    pub api_base: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Where the HTML document, preview images and artifacts are written
    #[arg(long)]
    pub out: Option<String>,

    #[arg(long, default_value_t = false)]
    pub save_artifacts: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
