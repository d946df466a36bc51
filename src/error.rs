//! Error type for the fallible parts of the crate (the terminal bridge).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeysError {
    /// Reading or configuring the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The terminal cannot report key release events.
    #[error("terminal does not support keyboard enhancement (key release reporting)")]
    ReleaseUnsupported,
}

pub type Result<T> = std::result::Result<T, KeysError>;
