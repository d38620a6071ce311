//! Machine translation core
//!
//! Everything between a raw resource value and its translated counterpart:
//!
//! 1. **Segmentation**: locate protected tokens (format specifiers,
//!    escapes, bracket/brace placeholders) and split the value into prose
//!    and placeholder segments.
//! 2. **Provider trait**: [`MachineTranslator`] abstracts the remote
//!    service; [`AzureTranslatorProvider`] talks to Microsoft Translator,
//!    [`MockTranslator`] drives tests.
//! 3. **Pipeline**: [`ValueTranslator`] batches prose segments into as few
//!    provider calls as possible, verifies batch integrity, falls back to
//!    per-segment calls, and reassembles the value with placeholders intact.

pub mod azure;
pub mod error;
pub mod mock;
pub mod pipeline;
pub mod segment;
pub mod translator;

pub use azure::AzureTranslatorProvider;
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockTranslator};
pub use pipeline::{SEGMENT_DELIMITER, ValueTranslator, fix_glued_placeholders, reassemble};
pub use segment::{
    ProtectedToken, Segment, TOKEN_PATTERNS, has_translatable_prose, scan_protected_tokens,
    segment_value,
};
pub use translator::{MachineTranslator, validate_locale};
