//! Microsoft Translator (Azure AI Translator) provider
//!
//! Speaks the Translator Text API v3: one POST to `{endpoint}/translate` per
//! chunk, texts in the JSON body, languages and options in the query string.
//!
//! # Authentication
//!
//! The subscription key, optional region, and endpoint come from a resolved
//! [`ProviderConfig`] (CLI flags, config file, or `AZURE_TRANSLATOR_*`
//! environment variables; see [`crate::config`]).
//!
//! # Failure behavior
//!
//! Rate-limit and server-error responses (429/5xx) and transport errors are
//! retried with exponential backoff plus random jitter, bounded by
//! `max_attempts`. A response that parses but carries no translation for an
//! input degrades to echoing that input back; it is never an error.

use crate::config::{ProviderConfig, ProviderOverrides};
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, validate_locale};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Microsoft Translator API v3 provider.
#[derive(Clone)]
pub struct AzureTranslatorProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct RequestText<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct ResponseItem {
    #[serde(default)]
    translations: Vec<ResponseTranslation>,
}

#[derive(Deserialize)]
struct ResponseTranslation {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    transliteration: Option<ResponseTransliteration>,
}

#[derive(Deserialize)]
struct ResponseTransliteration {
    #[serde(default)]
    text: Option<String>,
}

/// Pick the rendering to keep for one input text.
///
/// In transliteration mode the provider-returned transliteration field wins
/// over the translated text when both are present. A missing or empty
/// translation degrades to the original input.
fn pick_rendering(original: &str, item: &ResponseItem, transliterate: bool) -> String {
    let Some(first) = item.translations.first() else {
        return original.to_string();
    };
    if transliterate {
        if let Some(text) = first
            .transliteration
            .as_ref()
            .and_then(|t| t.text.as_deref())
        {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    first
        .text
        .clone()
        .unwrap_or_else(|| original.to_string())
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn jitter(max_ms: u64) -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
}

impl AzureTranslatorProvider {
    /// Maximum number of texts per API request.
    const MAX_BATCH_SIZE: usize = 100;

    /// Maximum characters per string, per Translator request limits.
    const MAX_CHARS_PER_STRING: usize = 50_000;

    /// Create a provider from a resolved configuration.
    pub fn new(config: ProviderConfig) -> MtResult<Self> {
        if config.key.trim().is_empty() {
            return Err(MtError::Config(
                "subscription key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MtError::Network)?;

        Ok(Self { config, client })
    }

    /// Create a provider from `AZURE_TRANSLATOR_*` environment variables only.
    pub fn from_env() -> MtResult<Self> {
        let config = ProviderConfig::resolve(None, ProviderOverrides::default())
            .map_err(|e| MtError::Config(e.to_string()))?;
        Self::new(config)
    }

    fn translate_url(&self) -> String {
        format!("{}/translate", self.config.endpoint.trim_end_matches('/'))
    }

    /// Build the query string for one request.
    ///
    /// `from` is omitted for the `auto` pseudo-locale so the service
    /// autodetects the source language.
    fn build_query(
        &self,
        source_locale: &str,
        target_locale: &str,
        transliterate: bool,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("api-version", self.config.api_version.clone()),
            ("to", target_locale.to_string()),
            ("textType", self.config.text_type.as_str().to_string()),
        ];
        if !source_locale.is_empty() && source_locale != "auto" {
            query.push(("from", source_locale.to_string()));
        }
        if let Some(category) = &self.config.category {
            query.push(("category", category.clone()));
        }
        if transliterate {
            query.push(("toScript", "Latn".to_string()));
        }
        query
    }

    fn chunk_batch(texts: &[String]) -> Vec<&[String]> {
        texts.chunks(Self::MAX_BATCH_SIZE).collect()
    }

    /// Translate a single chunk of texts, with bounded retry.
    async fn translate_chunk(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
        transliterate: bool,
    ) -> MtResult<Vec<String>> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        let url = self.translate_url();
        let query = self.build_query(source_locale, target_locale, transliterate);
        let body: Vec<RequestText> = texts.iter().map(|t| RequestText { text: t }).collect();

        let mut backoff = Duration::from_millis(500);
        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut request = self
                .client
                .post(&url)
                .query(&query)
                .header("Ocp-Apim-Subscription-Key", &self.config.key)
                .json(&body);
            if let Some(region) = &self.config.region {
                request = request.header("Ocp-Apim-Subscription-Region", region);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if is_retryable(status) {
                        if attempt >= self.config.max_attempts {
                            return Err(MtError::Translation(format!(
                                "API unavailable ({status}) after {attempt} attempts"
                            )));
                        }
                        debug!(%status, attempt, "retrying translation request");
                        tokio::time::sleep(backoff + jitter(300)).await;
                        backoff *= 2;
                        continue;
                    }
                    if !status.is_success() {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "unknown error".to_string());
                        return Err(if status.is_client_error() {
                            MtError::Config(format!("API client error ({status}): {error_text}"))
                        } else {
                            MtError::Translation(format!(
                                "API server error ({status}): {error_text}"
                            ))
                        });
                    }

                    let items: Vec<ResponseItem> = response.json().await.map_err(|e| {
                        MtError::Translation(format!("failed to parse API response: {e}"))
                    })?;
                    if items.is_empty() {
                        warn!("provider returned an empty body; passing originals through");
                        return Ok(texts.to_vec());
                    }

                    return Ok(texts
                        .iter()
                        .enumerate()
                        .map(|(i, original)| match items.get(i) {
                            Some(item) => pick_rendering(original, item, transliterate),
                            None => original.clone(),
                        })
                        .collect());
                }
                Err(e) => {
                    if attempt >= self.config.max_attempts {
                        return Err(MtError::Network(e));
                    }
                    debug!(error = %e, attempt, "transport error, retrying");
                    tokio::time::sleep(backoff + jitter(200)).await;
                    backoff *= 2;
                }
            }
        }
    }
}

impl std::fmt::Debug for AzureTranslatorProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureTranslatorProvider")
            .field("endpoint", &self.config.endpoint)
            .field("key", &"***")
            .field("region", &self.config.region)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for AzureTranslatorProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
        transliterate: bool,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        if text.len() > Self::MAX_CHARS_PER_STRING {
            return Err(MtError::Translation(format!(
                "text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let texts = [text.to_string()];
        let results = self
            .translate_chunk(&texts, source_locale, target_locale, transliterate)
            .await?;

        Ok(results.into_iter().next().unwrap_or_else(|| text.to_string()))
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
        transliterate: bool,
    ) -> MtResult<Vec<String>> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }
        for (i, text) in texts.iter().enumerate() {
            if text.len() > Self::MAX_CHARS_PER_STRING {
                return Err(MtError::Translation(format!(
                    "text at index {} exceeds maximum length of {} characters",
                    i,
                    Self::MAX_CHARS_PER_STRING
                )));
            }
        }

        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in Self::chunk_batch(texts) {
            let chunk_results = self
                .translate_chunk(chunk, source_locale, target_locale, transliterate)
                .await?;
            all_results.extend(chunk_results);
        }

        if all_results.len() != texts.len() {
            return Err(MtError::Translation(format!(
                "provider returned {} results for {} inputs",
                all_results.len(),
                texts.len()
            )));
        }

        Ok(all_results)
    }

    fn provider_name(&self) -> &str {
        "Microsoft Translator"
    }
}
