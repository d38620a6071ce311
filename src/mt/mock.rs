//! Mock machine translator for testing
//!
//! Deterministic, API-free translator for exercising the pipeline without
//! API keys or network access. Modes simulate the provider behaviors the
//! pipeline has to survive: word reordering, whitespace-eating rewrites that
//! destroy batch delimiters, hard failures.
//!
//! # Example
//!
//! ```ignore
//! use droidlingo::mt::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr", false).await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios.
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append a locale suffix: "hello" → "hello_fr".
    /// Leaves placeholders and delimiters intact.
    Suffix,

    /// Predefined mappings for realistic translations,
    /// keyed by (text, target_locale); unknown pairs fall back to Suffix.
    Mappings(HashMap<(String, String), String>),

    /// Reverse the order of space-separated words, simulating languages
    /// whose word order differs from the source.
    ReverseWords,

    /// Reverse every run of ASCII letters in place ("Hello" → "olleH").
    /// Mangles any letter-bearing delimiter, which makes the batch
    /// integrity check fire.
    ReverseLetters,

    /// Fail every request.
    Error(String),

    /// Return input unchanged.
    NoOp,
}

/// Mock translator that simulates various provider behaviors.
///
/// Counts invocations so tests can assert that short-circuit paths never
/// reach the provider at all.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds).
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

fn reverse_letter_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run: Vec<char> = Vec::new();
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            run.push(c);
        } else {
            out.extend(run.drain(..).rev());
            out.push(c);
        }
    }
    out.extend(run.drain(..).rev());
    out
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a MockTranslator with a simulated per-request delay.
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of provider requests made so far (single or batch).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(
        &self,
        text: &str,
        _source: &str,
        target: &str,
        transliterate: bool,
    ) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => {
                if transliterate {
                    Ok(format!("{}_{}_Latn", text, target))
                } else {
                    Ok(format!("{}_{}", text, target))
                }
            }
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::ReverseWords => {
                let words: Vec<&str> = text.split_whitespace().collect();
                Ok(words.into_iter().rev().collect::<Vec<_>>().join(" "))
            }
            MockMode::ReverseLetters => Ok(reverse_letter_runs(text)),
            MockMode::Error(msg) => Err(MtError::Translation(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
        transliterate: bool,
    ) -> MtResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;
        self.apply_translation(text, source_locale, target_locale, transliterate)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
        transliterate: bool,
    ) -> MtResult<Vec<String>> {
        // One request per batch, like a real provider.
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apply_delay().await;

        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.apply_translation(
                text,
                source_locale,
                target_locale,
                transliterate,
            )?);
        }
        Ok(results)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
