//! Per-language translation runs and parallel fan-out.
//!
//! One file in, one translated file per target language out. Languages are
//! independent, so each gets its own tokio task, bounded by a worker
//! semaphore; results are collected as they complete and only re-sorted for
//! the final summary. A failed language is logged and omitted from the
//! summary, and it never cancels its siblings.

use crate::error::{Error, Result};
use crate::mt::{MachineTranslator, ValueTranslator};
use crate::res::{ResourceKey, StringsDocument, android};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Options shared by every language of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Ask the provider for a Latin-script rendering instead of a
    /// translation.
    pub transliterate: bool,
    /// Use structured multi-text requests instead of delimiter joining.
    pub batch_mode: bool,
    /// Upper bound on concurrently processed languages.
    pub max_workers: usize,
    /// Overwrite the input file instead of writing `strings-<lang>.xml`.
    /// Only valid for single-target runs.
    pub in_place: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            transliterate: false,
            batch_mode: false,
            max_workers: 10,
            in_place: false,
        }
    }
}

/// Summary of one completed language.
#[derive(Debug, Clone)]
pub struct LanguageReport {
    pub target_lang: String,
    pub string_count: usize,
    pub array_count: usize,
    pub array_items_count: usize,
    pub plurals_count: usize,
    pub plurals_items_count: usize,
    pub total_elements: usize,
    pub output_file: PathBuf,
}

impl LanguageReport {
    fn tally(
        target_lang: &str,
        flat: &IndexMap<ResourceKey, String>,
        output_file: PathBuf,
    ) -> Self {
        let mut string_count = 0;
        let mut array_items_count = 0;
        let mut plurals_items_count = 0;
        let mut array_names = HashSet::new();
        let mut plurals_names = HashSet::new();

        for key in flat.keys() {
            match key {
                ResourceKey::String { .. } => string_count += 1,
                ResourceKey::ArrayItem { name, .. } => {
                    array_items_count += 1;
                    array_names.insert(name.clone());
                }
                ResourceKey::PluralItem { name, .. } => {
                    plurals_items_count += 1;
                    plurals_names.insert(name.clone());
                }
            }
        }

        LanguageReport {
            target_lang: target_lang.to_string(),
            string_count,
            array_count: array_names.len(),
            array_items_count,
            plurals_count: plurals_names.len(),
            plurals_items_count,
            total_elements: flat.len(),
            output_file,
        }
    }
}

/// Where one language's output lands.
pub fn output_path(input: &Path, target_lang: &str, transliterate: bool, in_place: bool) -> PathBuf {
    if in_place {
        return input.to_path_buf();
    }
    let suffix = if transliterate {
        format!("translit-{target_lang}")
    } else {
        target_lang.to_string()
    };
    input.with_file_name(format!("strings-{suffix}.xml"))
}

/// Translate every value of a flat map for one target language.
///
/// Values are processed sequentially within the language; batching happens
/// inside [`ValueTranslator`] per value.
pub async fn translate_map(
    flat: &IndexMap<ResourceKey, String>,
    provider: Arc<dyn MachineTranslator>,
    source_lang: &str,
    target_lang: &str,
    options: &RunOptions,
) -> IndexMap<ResourceKey, String> {
    let translator = ValueTranslator::new(provider, source_lang, target_lang)
        .with_transliterate(options.transliterate)
        .with_batch_mode(options.batch_mode);

    let mut translated = IndexMap::with_capacity(flat.len());
    for (key, value) in flat {
        translated.insert(key.clone(), translator.translate_value(value).await);
    }
    translated
}

/// Run one target language end to end: translate, write back, report.
pub async fn process_language(
    input: &Path,
    doc: &StringsDocument,
    flat: &IndexMap<ResourceKey, String>,
    provider: Arc<dyn MachineTranslator>,
    source_lang: &str,
    target_lang: &str,
    options: &RunOptions,
) -> Result<LanguageReport> {
    let mode = if options.transliterate {
        "transliteration"
    } else {
        "translation"
    };
    info!(source = source_lang, lang = target_lang, mode, "starting language");

    let translated = translate_map(flat, provider, source_lang, target_lang, options).await;

    let mut out_doc = doc.clone();
    out_doc.apply_translations(&translated);

    let output_file = output_path(input, target_lang, options.transliterate, options.in_place);
    android::write_file(&out_doc, &output_file)?;

    info!(lang = target_lang, file = %output_file.display(), "language completed");
    Ok(LanguageReport::tally(target_lang, flat, output_file))
}

/// Translate one `strings.xml` for every target language in parallel.
///
/// Returns the per-language reports, sorted by language code. Languages
/// whose task failed are missing from the result.
pub async fn process_file(
    input: &Path,
    source_lang: &str,
    target_langs: &[String],
    provider: Arc<dyn MachineTranslator>,
    options: RunOptions,
) -> Result<Vec<LanguageReport>> {
    if options.in_place && target_langs.len() > 1 {
        return Err(Error::Config(
            "in-place output is restricted to a single target language".to_string(),
        ));
    }

    let doc = Arc::new(android::read_file(input)?);
    let flat = Arc::new(doc.extract());
    info!(count = flat.len(), file = %input.display(), "extracted translatable strings");

    let workers = options.max_workers.max(1).min(target_langs.len().max(1));
    let semaphore = Arc::new(Semaphore::new(workers));
    let options = Arc::new(options);
    let input: Arc<Path> = Arc::from(input);
    let source_lang = Arc::<str>::from(source_lang);

    let mut tasks = JoinSet::new();
    for target_lang in target_langs {
        let doc = Arc::clone(&doc);
        let flat = Arc::clone(&flat);
        let provider = Arc::clone(&provider);
        let options = Arc::clone(&options);
        let semaphore = Arc::clone(&semaphore);
        let input = Arc::clone(&input);
        let source_lang = Arc::clone(&source_lang);
        let target_lang = target_lang.clone();

        tasks.spawn(async move {
            // The semaphore is never closed, so acquisition cannot fail.
            let _permit = semaphore.acquire_owned().await.ok();
            let result = process_language(
                &input,
                &doc,
                &flat,
                provider,
                &source_lang,
                &target_lang,
                &options,
            )
            .await;
            (target_lang, result)
        });
    }

    let mut reports = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(report))) => reports.push(report),
            Ok((target_lang, Err(e))) => {
                warn!(lang = %target_lang, error = %e, "language failed; omitted from summary");
            }
            Err(e) => {
                warn!(error = %e, "language task aborted; omitted from summary");
            }
        }
    }

    reports.sort_by(|a, b| a.target_lang.cmp(&b.target_lang));
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::{MockMode, MockTranslator};
    use crate::res::android::from_str;

    const SAMPLE: &str = r#"<resources>
        <string name="hello">Hello %s</string>
        <string name="secret" translatable="false">opaque</string>
        <string-array name="menu">
            <item>Open</item>
            <item>Close</item>
        </string-array>
        <plurals name="songs">
            <item quantity="one">%d song</item>
            <item quantity="other">%d songs</item>
        </plurals>
    </resources>"#;

    #[tokio::test]
    async fn test_translate_map_preserves_keys_and_order() {
        let doc = from_str(SAMPLE).unwrap();
        let flat = doc.extract();
        let mock = MockTranslator::new(MockMode::Suffix);
        let translated = translate_map(
            &flat,
            Arc::new(mock),
            "en",
            "es",
            &RunOptions::default(),
        )
        .await;

        assert_eq!(translated.len(), flat.len());
        let keys: Vec<_> = translated.keys().collect();
        let expected: Vec<_> = flat.keys().collect();
        assert_eq!(keys, expected);
        assert_eq!(
            translated.get(&ResourceKey::array_item("menu", 0)).unwrap(),
            "Open_es"
        );
    }

    #[tokio::test]
    async fn test_placeholders_survive_the_full_map() {
        let doc = from_str(SAMPLE).unwrap();
        let flat = doc.extract();
        let mock = MockTranslator::new(MockMode::ReverseLetters);
        let translated = translate_map(
            &flat,
            Arc::new(mock),
            "en",
            "es",
            &RunOptions::default(),
        )
        .await;

        assert_eq!(
            translated.get(&ResourceKey::string("hello")).unwrap(),
            "olleH %s"
        );
        assert_eq!(
            translated
                .get(&ResourceKey::plural_item("songs", "other"))
                .unwrap(),
            "%d sgnos"
        );
    }

    #[test]
    fn test_report_tally_counts_by_kind() {
        let doc = from_str(SAMPLE).unwrap();
        let flat = doc.extract();
        let report = LanguageReport::tally("es", &flat, PathBuf::from("strings-es.xml"));

        assert_eq!(report.string_count, 1);
        assert_eq!(report.array_count, 1);
        assert_eq!(report.array_items_count, 2);
        assert_eq!(report.plurals_count, 1);
        assert_eq!(report.plurals_items_count, 2);
        assert_eq!(report.total_elements, 5);
    }

    #[test]
    fn test_output_path_variants() {
        let input = Path::new("/tmp/res/strings.xml");
        assert_eq!(
            output_path(input, "es", false, false),
            Path::new("/tmp/res/strings-es.xml")
        );
        assert_eq!(
            output_path(input, "hi", true, false),
            Path::new("/tmp/res/strings-translit-hi.xml")
        );
        assert_eq!(output_path(input, "es", false, true), input);
    }

    #[tokio::test]
    async fn test_in_place_rejected_for_multiple_targets() {
        let options = RunOptions {
            in_place: true,
            ..Default::default()
        };
        let result = process_file(
            Path::new("/nonexistent/strings.xml"),
            "en",
            &["es".to_string(), "fr".to_string()],
            Arc::new(MockTranslator::new(MockMode::Suffix)),
            options,
        )
        .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
