//! Machine translation provider trait
//!
//! This module defines the [`MachineTranslator`] trait for provider
//! abstraction, enabling support for different MT backends (Microsoft
//! Translator, mock, etc.) without coupling the pipeline to any specific
//! implementation.
//!
//! # Example
//!
//! ```ignore
//! use droidlingo::mt::{AzureTranslatorProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AzureTranslatorProvider::from_env()?;
//!
//!     let result = provider.translate("Hello, world!", "en", "fr", false).await?;
//!     println!("{}", result);
//!
//!     let texts = vec!["Hello".to_string(), "Goodbye".to_string()];
//!     let results = provider.translate_batch(&texts, "en", "fr", false).await?;
//!     println!("{:?}", results);
//!
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers.
///
/// Implementations handle the actual translation work, whether through an
/// API (Microsoft Translator) or deterministic logic (mock). All methods are
/// async to support I/O-bound operations like network requests.
///
/// When `transliterate` is set, implementations return a Latin-script
/// rendering of the translation instead of the semantic translation text,
/// where the backend supports it.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text from source to target locale.
    ///
    /// `source_locale` may be `"auto"` to let the provider detect the source
    /// language where supported.
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
        transliterate: bool,
    ) -> MtResult<String>;

    /// Translate multiple strings in a single batch operation.
    ///
    /// Batch translation is more efficient than individual translations for
    /// providers with per-request overhead. Implementations may chunk large
    /// batches internally.
    ///
    /// # Guarantees
    ///
    /// - Output order matches input order
    /// - Output length equals input length
    /// - Each translation is independent
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
        transliterate: bool,
    ) -> MtResult<Vec<String>>;

    /// Name of this provider, for logging and diagnostics.
    fn provider_name(&self) -> &str;
}

/// Validate that a locale code is in acceptable format.
///
/// Checks that the code contains only alphanumeric characters, hyphens, and
/// underscores (following BCP-47 / ISO 639 conventions). The pseudo-code
/// `"auto"` passes validation; providers decide what to do with it.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_locale_valid_codes() {
        assert!(validate_locale("en").is_ok());
        assert!(validate_locale("en-US").is_ok());
        assert!(validate_locale("pt-BR").is_ok());
        assert!(validate_locale("zh-Hans").is_ok());
        assert!(validate_locale("de_DE").is_ok());
        assert!(validate_locale("auto").is_ok());
    }

    #[test]
    fn test_validate_locale_invalid_codes() {
        assert!(validate_locale("").is_err());
        assert!(validate_locale("en@invalid").is_err());
        assert!(validate_locale("fr#bad").is_err());
        assert!(validate_locale("es!error").is_err());
    }

    #[test]
    fn test_validate_locale_error_messages() {
        match validate_locale("en@US") {
            Err(MtError::InvalidLocale(msg)) => {
                assert!(msg.contains("invalid characters"));
            }
            _ => panic!("expected InvalidLocale error"),
        }
    }
}
