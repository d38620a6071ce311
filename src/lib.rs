//! droidlingo: machine translation for Android `strings.xml` resources.
//!
//! Extracts the localizable text of a resource file into a flat key space,
//! routes only the translatable prose through a remote translation provider
//! while protecting format placeholders and escape sequences, and
//! reassembles valid XML per target language. The [`apk`] module wraps the
//! same flow in an end-to-end APK pipeline: decompile, translate every
//! discovered locale, rebuild, align, sign.
//!
//! # Example
//!
//! ```ignore
//! use droidlingo::mt::{MockMode, MockTranslator};
//! use droidlingo::run::{RunOptions, process_file};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Arc::new(MockTranslator::new(MockMode::Suffix));
//!     let reports = process_file(
//!         Path::new("res/values/strings.xml"),
//!         "en",
//!         &["es".to_string(), "fr".to_string()],
//!         provider,
//!         RunOptions::default(),
//!     )
//!     .await?;
//!
//!     for report in reports {
//!         println!("{}: {} strings", report.target_lang, report.total_elements);
//!     }
//!     Ok(())
//! }
//! ```

pub mod apk;
pub mod config;
pub mod error;
pub mod mt;
pub mod res;
pub mod run;

pub use config::{ProviderConfig, ProviderOverrides, TextType};
pub use error::{Error, Result};
pub use mt::{AzureTranslatorProvider, MachineTranslator, MockMode, MockTranslator, ValueTranslator};
pub use res::{ResourceKey, StringsDocument, merge_documents};
pub use run::{LanguageReport, RunOptions, process_file};
