// src/error.rs
use thiserror::Error;

pub use crate::config::size::UnitConversionError;

/// Why one codec configuration could not produce an artifact.
/// Always local to that configuration; the trial carries on without it.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid filter chain: {0}")]
    InvalidChain(&'static str),
    #[error("filter chain needs a passphrase but none is configured")]
    MissingPassphrase,
    #[error("7z archive: {0}")]
    Archive(#[from] sevenz_rust2::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec task aborted: {0}")]
    Aborted(String),
}

/// Every configuration failed, so there is nothing to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("all codec configurations failed; no compressed artifact available")]
pub struct AllCodecsFailed;
