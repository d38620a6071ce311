//! Per-value translation pipeline
//!
//! Drives one resource value through tokenize → segment → translate →
//! reassemble. Only prose segments reach the provider; protected tokens are
//! reinserted verbatim at their original relative positions.
//!
//! The pipeline fails soft: persistent provider failure for a piece of text
//! degrades to the original text with a logged warning. Callers never see an
//! error from [`ValueTranslator::translate_value`]; a partially localized
//! output beats an aborted run.

use crate::mt::segment::{Segment, has_translatable_prose, scan_protected_tokens, segment_value};
use crate::mt::translator::MachineTranslator;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::warn;

/// Delimiter used to pack several text segments into a single provider call.
/// Chosen to be extremely unlikely to occur in translatable prose.
pub const SEGMENT_DELIMITER: &str = "⟐⟐⟐SPLIT⟐⟐⟐";

/// Maximum segments per structured batch request.
const BATCH_SIZE: usize = 25;

static GLUED_LEFT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)(%(?:[0-9]+\$)?[sdif])").expect("glue pattern must compile"));
static GLUED_RIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(%(?:[0-9]+\$)?[sdif])(\w)").expect("glue pattern must compile"));

/// Reinsert a space where translation glued a format specifier to a word.
///
/// Best-effort cosmetic cleanup only; scripts without `\w` word characters
/// never trigger it.
pub fn fix_glued_placeholders(text: &str) -> String {
    let pass = GLUED_LEFT.replace_all(text, "${1} ${2}");
    GLUED_RIGHT.replace_all(&pass, "${1} ${2}").into_owned()
}

/// Stitch translated prose back between the untouched placeholders.
///
/// Substitution is positional over text segments only; placeholder segments
/// never count against the index. If fewer translations arrived than
/// expected the remaining segments pass through untranslated.
pub fn reassemble(segments: &[Segment], translated_texts: &[String]) -> String {
    let mut result = String::new();
    let mut text_index = 0;
    for segment in segments {
        match segment {
            Segment::Text(original) => {
                match translated_texts.get(text_index) {
                    Some(translated) => result.push_str(translated),
                    None => result.push_str(original),
                }
                text_index += 1;
            }
            Segment::Placeholder(token) => result.push_str(token),
        }
    }
    result
}

/// Translates individual resource values for one language pair.
///
/// The provider is injected at construction time, so the whole pipeline runs
/// against a stub in tests.
pub struct ValueTranslator {
    provider: Arc<dyn MachineTranslator>,
    source_locale: String,
    target_locale: String,
    transliterate: bool,
    batch_mode: bool,
}

impl ValueTranslator {
    pub fn new(
        provider: Arc<dyn MachineTranslator>,
        source_locale: impl Into<String>,
        target_locale: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            source_locale: source_locale.into(),
            target_locale: target_locale.into(),
            transliterate: false,
            batch_mode: false,
        }
    }

    /// Request script transliteration instead of semantic translation.
    pub fn with_transliterate(mut self, on: bool) -> Self {
        self.transliterate = on;
        self
    }

    /// Send segments as a structured multi-text request instead of joining
    /// them with [`SEGMENT_DELIMITER`]. Preferred when the provider supports
    /// multi-text calls; immune to delimiter mangling.
    pub fn with_batch_mode(mut self, on: bool) -> Self {
        self.batch_mode = on;
        self
    }

    /// Translate one resource value, preserving protected tokens.
    ///
    /// Values with no prose at all (empty, whitespace, or nothing but
    /// protected tokens) are returned unchanged without any provider call.
    pub async fn translate_value(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let tokens = scan_protected_tokens(text);
        if tokens.is_empty() {
            return self.translate_one(text).await;
        }

        let segments = segment_value(text, &tokens);
        if !has_translatable_prose(&segments) {
            return text.to_string();
        }

        let text_segments: Vec<String> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text(t) => Some(t.clone()),
                Segment::Placeholder(_) => None,
            })
            .collect();

        let translated = if text_segments.len() == 1 {
            vec![self.translate_one(&text_segments[0]).await]
        } else if self.batch_mode {
            self.translate_structured(&text_segments).await
        } else {
            self.translate_delimited(&text_segments).await
        };

        fix_glued_placeholders(&reassemble(&segments, &translated))
    }

    /// Single fail-soft translation.
    async fn translate_one(&self, text: &str) -> String {
        match self
            .provider
            .translate(
                text,
                &self.source_locale,
                &self.target_locale,
                self.transliterate,
            )
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                warn!(
                    provider = self.provider.provider_name(),
                    error = %e,
                    "translation failed; keeping original text"
                );
                text.to_string()
            }
        }
    }

    /// One fail-soft call per segment. The slow path.
    async fn translate_each(&self, segments: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(segments.len());
        for segment in segments {
            out.push(self.translate_one(segment).await);
        }
        out
    }

    /// Join all segments into one call and split the result.
    ///
    /// If the provider reordered, dropped, or translated the delimiter the
    /// part count will not match; the joined result is then discarded and
    /// every segment is translated individually.
    async fn translate_delimited(&self, segments: &[String]) -> Vec<String> {
        let combined = segments.join(SEGMENT_DELIMITER);
        match self
            .provider
            .translate(
                &combined,
                &self.source_locale,
                &self.target_locale,
                self.transliterate,
            )
            .await
        {
            Ok(translated) => {
                let parts: Vec<String> = translated
                    .split(SEGMENT_DELIMITER)
                    .map(str::to_string)
                    .collect();
                if parts.len() == segments.len() {
                    return parts;
                }
                warn!(
                    sent = segments.len(),
                    received = parts.len(),
                    "batch delimiter did not survive translation; retrying segment by segment"
                );
            }
            Err(e) => {
                warn!(error = %e, "joined translation failed; retrying segment by segment");
            }
        }
        self.translate_each(segments).await
    }

    /// Send segments as structured multi-text requests of up to
    /// [`BATCH_SIZE`] each.
    async fn translate_structured(&self, segments: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(segments.len());
        for chunk in segments.chunks(BATCH_SIZE) {
            match self
                .provider
                .translate_batch(
                    chunk,
                    &self.source_locale,
                    &self.target_locale,
                    self.transliterate,
                )
                .await
            {
                Ok(translated) if translated.len() == chunk.len() => out.extend(translated),
                Ok(translated) => {
                    warn!(
                        sent = chunk.len(),
                        received = translated.len(),
                        "structured batch came back misaligned; retrying segment by segment"
                    );
                    out.extend(self.translate_each(chunk).await);
                }
                Err(e) => {
                    warn!(error = %e, "structured batch failed; retrying segment by segment");
                    out.extend(self.translate_each(chunk).await);
                }
            }
        }
        out
    }
}
