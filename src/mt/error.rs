//! Error types for the machine translation module.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MtError {
    /// Missing or unusable provider configuration (key, endpoint).
    #[error("configuration error: {0}")]
    Config(String),

    /// A language code that cannot be sent to a provider.
    #[error("invalid locale: {0}")]
    InvalidLocale(String),

    /// Transport-level failure talking to the provider.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered, but not with a usable translation.
    #[error("translation error: {0}")]
    Translation(String),
}

/// Result type for MT operations.
pub type MtResult<T> = Result<T, MtError>;
