//! Crate-level error type.
//!
//! Returned from all fallible operations outside the MT provider layer
//! (resource parsing, serialization, configuration, toolchain invocation).

use crate::mt::MtError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid data: {0}")]
    DataMismatch(String),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("machine translation error: {0}")]
    Mt(#[from] MtError),

    #[error("required tool not found: {0}")]
    ToolNotFound(String),

    #[error("command `{command}` failed ({status}):\n{output}")]
    Tool {
        command: String,
        status: String,
        output: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
