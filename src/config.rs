//! Microsoft Translator configuration, assembled from layered sources.
//!
//! Precedence, lowest to highest: built-in defaults < JSON config file <
//! `AZURE_TRANSLATOR_*` environment variables < CLI flags. Empty values in a
//! layer are treated as absent and never shadow a lower layer.
//!
//! The resolved [`ProviderConfig`] is immutable after construction and is
//! handed to the provider at construction time; nothing in the crate mutates
//! configuration once translation has started.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";
pub const DEFAULT_API_VERSION: &str = "3.0";

/// How the provider should treat the submitted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextType {
    #[default]
    Plain,
    Html,
}

impl TextType {
    pub fn as_str(self) -> &'static str {
        match self {
            TextType::Plain => "plain",
            TextType::Html => "html",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "plain" => Some(TextType::Plain),
            "html" => Some(TextType::Html),
            _ => None,
        }
    }
}

/// One layer of partial configuration.
///
/// Mirrors the keys of the JSON config file; also built from the
/// environment and from CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderOverrides {
    pub endpoint: Option<String>,
    pub key: Option<String>,
    pub region: Option<String>,
    pub api_version: Option<String>,
    pub category: Option<String>,
    pub text_type: Option<String>,
}

impl ProviderOverrides {
    /// Load a layer from a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load a layer from `AZURE_TRANSLATOR_*` environment variables.
    pub fn from_env() -> Self {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok()
        }
        ProviderOverrides {
            endpoint: var("AZURE_TRANSLATOR_ENDPOINT"),
            key: var("AZURE_TRANSLATOR_KEY"),
            region: var("AZURE_TRANSLATOR_REGION"),
            api_version: var("AZURE_TRANSLATOR_API_VERSION"),
            category: var("AZURE_TRANSLATOR_CATEGORY"),
            text_type: var("AZURE_TRANSLATOR_TEXT_TYPE"),
        }
    }

    /// Overlay a higher-precedence layer. Non-empty values win.
    pub fn overlay(&mut self, higher: ProviderOverrides) {
        fn pick(slot: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value {
                if !v.trim().is_empty() {
                    *slot = Some(v);
                }
            }
        }
        pick(&mut self.endpoint, higher.endpoint);
        pick(&mut self.key, higher.key);
        pick(&mut self.region, higher.region);
        pick(&mut self.api_version, higher.api_version);
        pick(&mut self.category, higher.category);
        pick(&mut self.text_type, higher.text_type);
    }
}

/// Fully resolved provider configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub key: String,
    pub region: Option<String>,
    pub api_version: String,
    pub category: Option<String>,
    pub text_type: TextType,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
}

impl ProviderConfig {
    /// Resolve the final configuration from all layers.
    ///
    /// A missing subscription key after layering is a fatal configuration
    /// error; callers report it and exit before attempting any translation.
    pub fn resolve(config_file: Option<&Path>, cli: ProviderOverrides) -> Result<Self> {
        let mut layered = ProviderOverrides::default();
        if let Some(path) = config_file {
            layered.overlay(ProviderOverrides::from_file(path)?);
        }
        layered.overlay(ProviderOverrides::from_env());
        layered.overlay(cli);

        let key = layered
            .key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "missing Microsoft Translator key: use --ms-key or AZURE_TRANSLATOR_KEY"
                        .to_string(),
                )
            })?;

        let text_type = match layered.text_type.as_deref() {
            None => TextType::default(),
            Some(raw) => TextType::parse(raw).ok_or_else(|| {
                Error::Config(format!("invalid text type `{raw}` (expected plain or html)"))
            })?,
        };

        Ok(ProviderConfig {
            endpoint: layered
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            key,
            region: layered.region,
            api_version: layered
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            category: layered.category,
            text_type,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        })
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("key", &"***")
            .field("region", &self.region)
            .field("api_version", &self.api_version)
            .field("category", &self.category)
            .field("text_type", &self.text_type)
            .finish()
    }
}
