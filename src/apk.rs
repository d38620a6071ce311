//! End-to-end APK localization pipeline.
//!
//! decompile → translate every discovered locale into each target → rebuild
//! → align → sign. The decompiler, aligner, and signers are opaque external
//! commands; a non-zero exit from any of them is a hard pipeline failure
//! with the combined output captured for diagnostics.
//!
//! Android resolves localization by directory, not file name, so each target
//! language lands in `res/values-<lang>/strings.xml` (region variants as
//! `values-<lang>-r<REGION>`).

use crate::error::{Error, Result};
use crate::mt::MachineTranslator;
use crate::res::{android, merge_documents};
use crate::run::{RunOptions, translate_map};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Explicit tool locations, for when a tool is not on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    pub apktool: Option<PathBuf>,
    pub apksigner: Option<PathBuf>,
    pub jarsigner: Option<PathBuf>,
    pub zipalign: Option<PathBuf>,
}

/// Resolved external tools. apksigner is preferred for signing, jarsigner is
/// the fallback; zipalign is optional but used when present.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub apktool: PathBuf,
    pub apksigner: Option<PathBuf>,
    pub jarsigner: Option<PathBuf>,
    pub zipalign: Option<PathBuf>,
}

impl Toolchain {
    pub fn discover(overrides: &ToolOverrides) -> Result<Self> {
        Ok(Toolchain {
            apktool: require_tool("apktool", overrides.apktool.as_deref())?,
            apksigner: optional_tool("apksigner", overrides.apksigner.as_deref()),
            jarsigner: optional_tool("jarsigner", overrides.jarsigner.as_deref()),
            zipalign: optional_tool("zipalign", overrides.zipalign.as_deref()),
        })
    }
}

/// Keystore parameters for the signing step.
#[derive(Debug, Clone, Default)]
pub struct SigningConfig {
    pub keystore: Option<PathBuf>,
    pub alias: Option<String>,
    pub store_pass: Option<String>,
    pub key_pass: Option<String>,
}

impl SigningConfig {
    pub fn wants_signing(&self) -> bool {
        self.keystore.is_some() && self.alias.is_some()
    }
}

/// Pipeline-level options on top of the per-language [`RunOptions`].
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Working directory; a process-scoped temp directory when unset.
    pub workdir: Option<PathBuf>,
    /// Output path for the final APK; `<input>_signed.apk` when signing and
    /// unset.
    pub out: Option<PathBuf>,
    pub run: RunOptions,
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn require_tool(name: &str, custom: Option<&Path>) -> Result<PathBuf> {
    optional_tool(name, custom).ok_or_else(|| {
        Error::ToolNotFound(format!(
            "'{name}' is not on PATH; install it or pass --{name}-path"
        ))
    })
}

fn optional_tool(name: &str, custom: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = custom {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }
    find_in_path(name)
}

/// Run an external command, capturing combined output.
///
/// Non-zero exit becomes [`Error::Tool`] carrying everything the tool
/// printed.
async fn run_checked(description: String, command: &mut Command) -> Result<String> {
    info!(command = %description, "running external tool");
    let output = command.output().await?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(Error::Tool {
            command: description,
            status: output.status.to_string(),
            output: combined,
        });
    }
    Ok(combined)
}

/// Map a basic BCP-47 code to an Android values directory.
///
/// `es` → `values-es`, `pt-BR` → `values-pt-rBR`. Script and variant
/// subtags are folded into the region slot; exotic tags may need manual
/// adjustment.
pub fn values_dir_for_lang(lang: &str) -> String {
    if lang.is_empty() {
        return "values".to_string();
    }
    let normalized = lang.replace('_', "-");
    let mut parts = normalized.split('-');
    match (parts.next(), parts.next()) {
        (Some(language), Some(region)) => {
            format!("values-{language}-r{}", region.to_uppercase())
        }
        (Some(language), None) => format!("values-{language}"),
        _ => "values".to_string(),
    }
}

/// Find `strings.xml` under every `res/values*` directory.
///
/// The default locale is keyed `"base"`; the others by the directory suffix
/// (`es`, `pt-rBR`, ...).
pub fn find_locale_strings(decompiled: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let res_dir = decompiled.join("res");
    if !res_dir.is_dir() {
        return Err(Error::InvalidResource(
            "no res/ directory in the decompiled APK".to_string(),
        ));
    }

    let mut locales = BTreeMap::new();
    for entry in std::fs::read_dir(&res_dir)? {
        let entry = entry?;
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        let strings_xml = entry.path().join("strings.xml");
        if !strings_xml.is_file() {
            continue;
        }
        if dir_name == "values" {
            locales.insert("base".to_string(), strings_xml);
        } else if let Some(locale) = dir_name.strip_prefix("values-") {
            locales.insert(locale.to_string(), strings_xml);
        }
    }

    if locales.is_empty() {
        return Err(Error::InvalidResource(
            "no strings.xml found under res/values*/".to_string(),
        ));
    }
    Ok(locales)
}

/// Translate every discovered locale into each target language and write the
/// merged `res/values-<target>/strings.xml` files.
///
/// For one target, the base document is the structural template; each source
/// locale's translated document is overlaid onto it add-wins, so text that
/// exists only in a non-base locale still reaches the output.
pub async fn translate_locales(
    locale_files: &BTreeMap<String, PathBuf>,
    source_lang: &str,
    target_langs: &[String],
    provider: Arc<dyn MachineTranslator>,
    options: &RunOptions,
) -> Result<()> {
    let base_locale = if locale_files.contains_key("base") {
        "base".to_string()
    } else {
        locale_files
            .keys()
            .next()
            .cloned()
            .ok_or_else(|| Error::InvalidResource("no source locales".to_string()))?
    };
    let base_file = &locale_files[&base_locale];
    let res_dir = base_file
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| Error::InvalidResource("unexpected resource layout".to_string()))?
        .to_path_buf();

    // Load every source document once; the per-target tasks share them.
    let base_doc = Arc::new(android::read_file(base_file)?);
    let mut sources = Vec::new();
    for (locale, path) in locale_files {
        let doc = android::read_file(path)?;
        let flat = doc.extract();
        if flat.is_empty() {
            continue;
        }
        sources.push(Arc::new((locale.clone(), doc, flat)));
    }

    let workers = options.max_workers.max(1).min(target_langs.len().max(1));
    let semaphore = Arc::new(Semaphore::new(workers));
    let sources = Arc::new(sources);
    let options = Arc::new(options.clone());
    let source_lang = Arc::<str>::from(source_lang);

    let mut tasks = JoinSet::new();
    for target in target_langs {
        let base_doc = Arc::clone(&base_doc);
        let sources = Arc::clone(&sources);
        let provider = Arc::clone(&provider);
        let options = Arc::clone(&options);
        let semaphore = Arc::clone(&semaphore);
        let source_lang = Arc::clone(&source_lang);
        let res_dir = res_dir.clone();
        let target = target.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            info!(lang = %target, locales = sources.len(), "building combined translation");

            let mut combined = (*base_doc).clone();
            for source in sources.iter() {
                let (locale, doc, flat) = &**source;
                let translated =
                    translate_map(flat, Arc::clone(&provider), &source_lang, &target, &options)
                        .await;
                let mut translated_doc = doc.clone();
                translated_doc.apply_translations(&translated);
                merge_documents(&mut combined, translated_doc);
                info!(lang = %target, source_locale = %locale, "merged locale");
            }

            let target_dir = res_dir.join(values_dir_for_lang(&target));
            std::fs::create_dir_all(&target_dir)?;
            let target_file = target_dir.join("strings.xml");
            android::write_file(&combined, &target_file)?;
            info!(lang = %target, file = %target_file.display(), "wrote combined translation");
            Ok::<_, Error>(target)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e),
            Err(e) => {
                return Err(Error::Config(format!("translation task aborted: {e}")));
            }
        }
    }
    Ok(())
}

/// Run the whole pipeline. Returns the path of the final APK (signed when a
/// keystore was provided, otherwise the aligned or bare rebuild).
pub async fn localize_apk(
    apk: &Path,
    source_lang: &str,
    target_langs: &[String],
    provider: Arc<dyn MachineTranslator>,
    toolchain: &Toolchain,
    signing: &SigningConfig,
    options: &PipelineOptions,
) -> Result<PathBuf> {
    if !apk.is_file() {
        return Err(Error::InvalidResource(format!(
            "APK not found: {}",
            apk.display()
        )));
    }
    if signing.wants_signing() && toolchain.apksigner.is_none() && toolchain.jarsigner.is_none() {
        return Err(Error::ToolNotFound(
            "signing requires apksigner or jarsigner".to_string(),
        ));
    }

    let workdir = match &options.workdir {
        Some(dir) => dir.clone(),
        None => std::env::temp_dir().join(format!("apk-i18n-{}", std::process::id())),
    };
    std::fs::create_dir_all(&workdir)?;
    info!(workdir = %workdir.display(), "working directory ready");

    let decompiled = workdir.join("apk_src");
    if decompiled.exists() {
        std::fs::remove_dir_all(&decompiled)?;
    }

    // 1) Decompile.
    run_checked(
        format!("apktool d {} -o {}", apk.display(), decompiled.display()),
        Command::new(&toolchain.apktool)
            .arg("d")
            .arg(apk)
            .arg("-o")
            .arg(&decompiled)
            .arg("-f"),
    )
    .await?;

    // 2) Translate every locale into each target.
    let locale_files = find_locale_strings(&decompiled)?;
    info!(
        locales = %locale_files.keys().cloned().collect::<Vec<_>>().join(", "),
        "discovered source locales"
    );
    translate_locales(
        &locale_files,
        source_lang,
        target_langs,
        provider,
        &options.run,
    )
    .await?;

    // 3) Rebuild.
    let unsigned_apk = workdir.join("unsigned.apk");
    run_checked(
        format!("apktool b {} -o {}", decompiled.display(), unsigned_apk.display()),
        Command::new(&toolchain.apktool)
            .arg("b")
            .arg(&decompiled)
            .arg("-o")
            .arg(&unsigned_apk),
    )
    .await?;

    // 4) Align when zipalign is available.
    let aligned_apk = match &toolchain.zipalign {
        Some(zipalign) => {
            let aligned = workdir.join("aligned.apk");
            run_checked(
                format!("zipalign -f -p 4 {} {}", unsigned_apk.display(), aligned.display()),
                Command::new(zipalign)
                    .args(["-f", "-p", "4"])
                    .arg(&unsigned_apk)
                    .arg(&aligned),
            )
            .await?;
            aligned
        }
        None => {
            warn!("zipalign not found; skipping alignment");
            unsigned_apk.clone()
        }
    };

    // 5) Sign when a keystore was provided.
    if !signing.wants_signing() {
        info!(apk = %aligned_apk.display(), "produced unsigned APK");
        return Ok(aligned_apk);
    }

    let final_apk = match &options.out {
        Some(out) => out.clone(),
        None => {
            let stem = apk
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string());
            apk.with_file_name(format!("{stem}_signed.apk"))
        }
    };

    // Checked by wants_signing above.
    let keystore = signing.keystore.as_ref().ok_or_else(|| {
        Error::Config("signing requested without a keystore".to_string())
    })?;
    let alias = signing
        .alias
        .as_ref()
        .ok_or_else(|| Error::Config("signing requested without a key alias".to_string()))?;

    if let Some(apksigner) = &toolchain.apksigner {
        let mut command = Command::new(apksigner);
        command
            .arg("sign")
            .arg("--ks")
            .arg(keystore)
            .arg("--ks-key-alias")
            .arg(alias)
            .arg("--out")
            .arg(&final_apk);
        if let Some(pass) = &signing.store_pass {
            command.arg("--ks-pass").arg(format!("pass:{pass}"));
        }
        if let Some(pass) = &signing.key_pass {
            command.arg("--key-pass").arg(format!("pass:{pass}"));
        }
        command.arg(&aligned_apk);
        run_checked(format!("apksigner sign {}", aligned_apk.display()), &mut command).await?;
    } else if let Some(jarsigner) = &toolchain.jarsigner {
        let mut command = Command::new(jarsigner);
        command
            .arg("-keystore")
            .arg(keystore)
            .arg("-signedjar")
            .arg(&final_apk);
        if let Some(pass) = &signing.store_pass {
            command.arg("-storepass").arg(pass);
        }
        if let Some(pass) = &signing.key_pass {
            command.arg("-keypass").arg(pass);
        }
        command.arg(&aligned_apk).arg(alias);
        run_checked(format!("jarsigner {}", aligned_apk.display()), &mut command).await?;
    }

    info!(apk = %final_apk.display(), "produced signed APK");
    Ok(final_apk)
}
