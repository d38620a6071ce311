use clap::{Arg, ArgAction, ArgMatches, Command};
use droidlingo::config::{ProviderConfig, ProviderOverrides};
use droidlingo::mt::{AzureTranslatorProvider, MachineTranslator, MockMode, MockTranslator};
use droidlingo::run::{RunOptions, process_file};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn provider_overrides(matches: &ArgMatches) -> ProviderOverrides {
    ProviderOverrides {
        endpoint: matches.get_one::<String>("ms-endpoint").cloned(),
        key: matches.get_one::<String>("ms-key").cloned(),
        region: matches.get_one::<String>("ms-region").cloned(),
        api_version: matches.get_one::<String>("ms-api-version").cloned(),
        category: matches.get_one::<String>("ms-category").cloned(),
        text_type: matches.get_one::<String>("ms-text-type").cloned(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default.parse().unwrap()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("droidlingo")
        .version("0.1.0")
        .about("Translate Android strings.xml resources into multiple languages")
        .arg(
            Arg::new("input")
                .help("Path to the strings.xml file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("source-lang")
                .help("Source language code (e.g. en), or 'auto' to autodetect")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("target-langs")
                .help("One or more target language codes (e.g. fr es pt-BR)")
                .required(true)
                .num_args(1..)
                .index(3),
        )
        .arg(
            Arg::new("transliterate")
                .long("transliterate")
                .help("Request Latin-script transliteration instead of translation")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .help("Send text segments as structured multi-text requests")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("in-place")
                .long("in-place")
                .help("Overwrite the input file instead of writing strings-<lang>.xml (single target only)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-workers")
                .long("max-workers")
                .help("Maximum number of languages processed in parallel")
                .default_value("10")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a JSON config file with Microsoft Translator settings"),
        )
        .arg(
            Arg::new("ms-endpoint")
                .long("ms-endpoint")
                .help("Microsoft Translator endpoint URL"),
        )
        .arg(
            Arg::new("ms-key")
                .long("ms-key")
                .help("Microsoft Translator subscription key"),
        )
        .arg(
            Arg::new("ms-region")
                .long("ms-region")
                .help("Microsoft Translator region (if applicable)"),
        )
        .arg(
            Arg::new("ms-api-version")
                .long("ms-api-version")
                .help("Microsoft Translator API version (default: 3.0)"),
        )
        .arg(
            Arg::new("ms-category")
                .long("ms-category")
                .help("Custom category for a custom translator (optional)"),
        )
        .arg(
            Arg::new("ms-text-type")
                .long("ms-text-type")
                .help("Text type for translation")
                .value_parser(["plain", "html"]),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock translator instead of Microsoft Translator")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show detailed progress")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_tracing(matches.get_flag("verbose"));

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let source_lang = matches.get_one::<String>("source-lang").unwrap();
    let target_langs: Vec<String> = matches
        .get_many::<String>("target-langs")
        .unwrap()
        .cloned()
        .collect();

    if !input.is_file() {
        eprintln!("Error: input file '{}' not found.", input.display());
        std::process::exit(1);
    }

    let provider: Arc<dyn MachineTranslator> = if matches.get_flag("mock") {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        let config = match ProviderConfig::resolve(
            matches.get_one::<String>("config").map(Path::new),
            provider_overrides(&matches),
        ) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        };
        Arc::new(AzureTranslatorProvider::new(config)?)
    };

    let options = RunOptions {
        transliterate: matches.get_flag("transliterate"),
        batch_mode: matches.get_flag("batch"),
        max_workers: *matches.get_one::<usize>("max-workers").unwrap(),
        in_place: matches.get_flag("in-place"),
    };

    let reports = process_file(&input, source_lang, &target_langs, provider, options).await?;

    println!("\n=== Translation Summary ===");
    for report in &reports {
        println!(
            "\n{} ({}):",
            report.target_lang.to_uppercase(),
            report.output_file.display()
        );
        println!("- Regular strings: {}", report.string_count);
        println!(
            "- String arrays: {} (with {} items)",
            report.array_count, report.array_items_count
        );
        println!(
            "- Plurals: {} (with {} items)",
            report.plurals_count, report.plurals_items_count
        );
        println!("- Total processed elements: {}", report.total_elements);
    }

    if reports.len() == target_langs.len() {
        println!("\nAll translations completed successfully!");
    } else {
        println!(
            "\nCompleted {} of {} languages; see warnings above.",
            reports.len(),
            target_langs.len()
        );
    }

    Ok(())
}
