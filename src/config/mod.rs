use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::cli::{Args, ProviderKind};
use crate::errors::WeaverError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub image_model: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: u64,
    pub out_dir: String,
    pub save_artifacts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: None,
            image_model: None,
            api_base: None,
            timeout_secs: 600,
            out_dir: "weaver-out".into(),
            save_artifacts: false,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| WeaverError::Config(e.to_string()).into())
    }

    /// Defaults, then the TOML file (if any), then CLI flags.
    pub fn load(args: &Args) -> Result<Self> {
        let mut cfg = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                Self::from_toml(&text).with_context(|| format!("loading config {path}"))?
            }
            None => Self::default(),
        };
        cfg.apply_args(args);
        Ok(cfg)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.provider {
            self.provider = p;
        }
        if args.model.is_some() {
            self.model = args.model.clone();
        }
        if args.image_model.is_some() {
            self.image_model = args.image_model.clone();
        }
        if args.api_base.is_some() {
            self.api_base = args.api_base.clone();
        }
        if let Some(t) = args.timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(o) = &args.out {
            self.out_dir = o.clone();
        }
        self.save_artifacts |= args.save_artifacts;
    }

    pub fn text_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_text_model().to_string())
    }

    pub fn image_model(&self) -> String {
        self.image_model
            .clone()
            .unwrap_or_else(|| self.provider.default_image_model().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_toml("provider = \"openai\"\ntimeout_secs = 30\n").unwrap();
        assert_eq!(cfg.provider, ProviderKind::OpenAI);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.out_dir, "weaver-out");
        assert_eq!(cfg.text_model(), "gpt-4.1");
        assert_eq!(cfg.image_model(), "gpt-image-1");
    }

    #[test]
    fn bad_file_is_config_error() {
        let err = Config::from_toml("provider = \"nope\"").unwrap_err();
        assert!(err.downcast_ref::<WeaverError>().is_some());
    }

    #[test]
    fn flags_override_file() {
        let mut cfg = Config::from_toml("model = \"from-file\"\nout_dir = \"a\"").unwrap();
        let args = Args {
            model: Some("from-flag".into()),
            save_artifacts: true,
            ..Args::default()
        };
        cfg.apply_args(&args);
        assert_eq!(cfg.text_model(), "from-flag");
        assert_eq!(cfg.out_dir, "a");
        assert!(cfg.save_artifacts);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = Config::from_toml("schema_version = \"2025-10-01\"\nsave_artifacts = true").unwrap();
        assert!(cfg.save_artifacts);
    }

    #[test]
    fn gemini_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.text_model(), "gemini-2.5-pro");
        assert_eq!(cfg.image_model(), "imagen-4.0-generate-001");
    }
}
