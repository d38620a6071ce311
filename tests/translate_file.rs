//! File-level end-to-end tests driven by the mock provider.

use droidlingo::mt::{MockMode, MockTranslator};
use droidlingo::res::{ResourceKey, android};
use droidlingo::run::{RunOptions, process_file};
use std::collections::HashMap;
use std::sync::Arc;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <string name="greeting">Hello %s, you have %d new messages</string>
    <string name="just_format">%s</string>
    <string name="api_key" translatable="false">sk-opaque-token</string>
    <string-array name="menu">
        <item>Open file</item>
        <item>Close file</item>
    </string-array>
    <plurals name="songs">
        <item quantity="one">%d song</item>
        <item quantity="other">%d songs</item>
    </plurals>
</resources>
"#;

fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("strings.xml");
    std::fs::write(&path, SAMPLE).unwrap();
    path
}

#[tokio::test]
async fn translates_one_file_per_target_language() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);
    let provider = Arc::new(MockTranslator::new(MockMode::Suffix));

    let reports = process_file(
        &input,
        "en",
        &["es".to_string(), "fr".to_string()],
        provider,
        RunOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(reports.len(), 2);
    // Reports are sorted by language code regardless of completion order.
    assert_eq!(reports[0].target_lang, "es");
    assert_eq!(reports[1].target_lang, "fr");

    for report in &reports {
        assert_eq!(report.string_count, 2);
        assert_eq!(report.array_items_count, 2);
        assert_eq!(report.plurals_items_count, 2);
        assert!(report.output_file.exists());
    }

    let es = android::read_file(&dir.path().join("strings-es.xml")).unwrap();
    let flat = es.extract();
    let greeting = flat.get(&ResourceKey::string("greeting")).unwrap();
    assert!(greeting.contains(" %s"));
    assert!(greeting.contains(" %d "));
}

#[tokio::test]
async fn format_only_values_and_excluded_elements_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);
    let provider = Arc::new(MockTranslator::new(MockMode::Suffix));

    process_file(
        &input,
        "en",
        &["es".to_string()],
        provider,
        RunOptions::default(),
    )
    .await
    .unwrap();

    let out = android::read_file(&dir.path().join("strings-es.xml")).unwrap();
    let raw = android::to_string(&out).unwrap();

    // A value that is nothing but a placeholder is untouched.
    assert!(raw.contains(r#"<string name="just_format">%s</string>"#));
    // translatable="false" content is never translated.
    assert!(raw.contains("sk-opaque-token"));
    assert!(!raw.contains("sk-opaque-token_es"));
}

#[tokio::test]
async fn reversing_provider_keeps_placeholders_in_position() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);
    let provider = Arc::new(MockTranslator::new(MockMode::ReverseLetters));

    process_file(
        &input,
        "en",
        &["es".to_string()],
        provider,
        RunOptions::default(),
    )
    .await
    .unwrap();

    let out = android::read_file(&dir.path().join("strings-es.xml")).unwrap();
    let flat = out.extract();
    assert_eq!(
        flat.get(&ResourceKey::string("greeting")).unwrap(),
        "olleH %s, uoy evah %d wen segassem"
    );
}

#[tokio::test]
async fn failing_provider_degrades_to_original_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);
    let provider = Arc::new(MockTranslator::new(MockMode::Error("outage".to_string())));

    let reports = process_file(
        &input,
        "en",
        &["es".to_string()],
        provider,
        RunOptions::default(),
    )
    .await
    .unwrap();

    // The language still completes; every value passes through untranslated.
    assert_eq!(reports.len(), 1);
    let out = android::read_file(&dir.path().join("strings-es.xml")).unwrap();
    let flat = out.extract();
    assert_eq!(
        flat.get(&ResourceKey::string("greeting")).unwrap(),
        "Hello %s, you have %d new messages"
    );
}

#[tokio::test]
async fn in_place_mode_overwrites_the_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);
    let mut map = HashMap::new();
    map.insert(
        ("Open file".to_string(), "es".to_string()),
        "Abrir archivo".to_string(),
    );
    let provider = Arc::new(MockTranslator::new(MockMode::Mappings(map)));

    let options = RunOptions {
        in_place: true,
        ..Default::default()
    };
    let reports = process_file(&input, "en", &["es".to_string()], provider, options)
        .await
        .unwrap();

    assert_eq!(reports[0].output_file, input);
    let out = android::read_file(&input).unwrap();
    let flat = out.extract();
    assert_eq!(
        flat.get(&ResourceKey::array_item("menu", 0)).unwrap(),
        "Abrir archivo"
    );
}

#[tokio::test]
async fn transliteration_names_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample(&dir);
    let provider = Arc::new(MockTranslator::new(MockMode::Suffix));

    let options = RunOptions {
        transliterate: true,
        ..Default::default()
    };
    let reports = process_file(&input, "en", &["hi".to_string()], provider, options)
        .await
        .unwrap();

    assert_eq!(
        reports[0].output_file,
        dir.path().join("strings-translit-hi.xml")
    );
    let out = android::read_file(&reports[0].output_file).unwrap();
    let flat = out.extract();
    // The mock marks transliterated renderings with a _Latn suffix.
    assert!(
        flat.get(&ResourceKey::array_item("menu", 0))
            .unwrap()
            .ends_with("_Latn")
    );
}

#[tokio::test]
async fn missing_input_file_is_fatal() {
    let provider = Arc::new(MockTranslator::new(MockMode::Suffix));
    let result = process_file(
        std::path::Path::new("/definitely/not/here/strings.xml"),
        "en",
        &["es".to_string()],
        provider,
        RunOptions::default(),
    )
    .await;
    assert!(result.is_err());
}
