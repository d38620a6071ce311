use clap::{Arg, ArgAction, ArgMatches, Command};
use droidlingo::apk::{
    PipelineOptions, SigningConfig, ToolOverrides, Toolchain, localize_apk,
};
use droidlingo::config::{ProviderConfig, ProviderOverrides};
use droidlingo::mt::{AzureTranslatorProvider, MachineTranslator, MockMode, MockTranslator};
use droidlingo::run::RunOptions;
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

fn path_arg(matches: &ArgMatches, name: &str) -> Option<PathBuf> {
    matches.get_one::<String>(name).map(PathBuf::from)
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
    let matches = Command::new("droidlingo-apk")
        .version("0.1.0")
        .about("Decompile an APK, translate its string resources, rebuild, align and sign")
        .arg(
            Arg::new("apk")
                .help("Path to the input APK")
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
                .help("One or more target language codes (e.g. es fr pt-BR)")
                .required(true)
                .num_args(1..)
                .index(3),
        )
        // External tools
        .arg(
            Arg::new("apktool-path")
                .long("apktool-path")
                .help("Path to apktool if not on PATH"),
        )
        .arg(
            Arg::new("apksigner-path")
                .long("apksigner-path")
                .help("Path to apksigner if not on PATH"),
        )
        .arg(
            Arg::new("jarsigner-path")
                .long("jarsigner-path")
                .help("Path to jarsigner if not on PATH (signing fallback)"),
        )
        .arg(
            Arg::new("zipalign-path")
                .long("zipalign-path")
                .help("Path to zipalign if not on PATH (optional)"),
        )
        // Signing
        .arg(
            Arg::new("keystore")
                .long("keystore")
                .help("Path to the keystore (.jks/.keystore)"),
        )
        .arg(
            Arg::new("ks-alias")
                .long("ks-alias")
                .help("Key alias within the keystore"),
        )
        .arg(
            Arg::new("ks-pass")
                .long("ks-pass")
                .help("Keystore password (storepass)"),
        )
        .arg(
            Arg::new("key-pass")
                .long("key-pass")
                .help("Key password (keypass)"),
        )
        // Translator options
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
            Arg::new("max-workers")
                .long("max-workers")
                .help("Maximum number of languages processed in parallel")
                .default_value("10")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .help("Send text segments as structured multi-text requests")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock translator instead of Microsoft Translator")
                .action(ArgAction::SetTrue),
        )
        // Output placement
        .arg(
            Arg::new("workdir")
                .long("workdir")
                .help("Working directory (created if missing)"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .help("Path of the final APK (default: <apk>_signed.apk when signing)"),
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

    let apk = PathBuf::from(matches.get_one::<String>("apk").unwrap());
    let source_lang = matches.get_one::<String>("source-lang").unwrap();
    let target_langs: Vec<String> = matches
        .get_many::<String>("target-langs")
        .unwrap()
        .cloned()
        .collect();

    if !apk.is_file() {
        eprintln!("Error: APK not found: {}", apk.display());
        std::process::exit(1);
    }

    let tool_overrides = ToolOverrides {
        apktool: path_arg(&matches, "apktool-path"),
        apksigner: path_arg(&matches, "apksigner-path"),
        jarsigner: path_arg(&matches, "jarsigner-path"),
        zipalign: path_arg(&matches, "zipalign-path"),
    };
    let toolchain = match Toolchain::discover(&tool_overrides) {
        Ok(toolchain) => toolchain,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let signing = SigningConfig {
        keystore: path_arg(&matches, "keystore"),
        alias: matches.get_one::<String>("ks-alias").cloned(),
        store_pass: matches.get_one::<String>("ks-pass").cloned(),
        key_pass: matches.get_one::<String>("key-pass").cloned(),
    };

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

    let options = PipelineOptions {
        workdir: path_arg(&matches, "workdir"),
        out: path_arg(&matches, "out"),
        run: RunOptions {
            transliterate: false,
            batch_mode: matches.get_flag("batch"),
            max_workers: *matches.get_one::<usize>("max-workers").unwrap(),
            in_place: false,
        },
    };

    let final_apk = localize_apk(
        &apk,
        source_lang,
        &target_langs,
        provider,
        &toolchain,
        &signing,
        &options,
    )
    .await?;

    println!("\nDone: {}", final_apk.display());
    Ok(())
}
