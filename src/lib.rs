// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod compress;
pub mod config;
pub mod dedup;
pub mod digest;
pub mod dispatch;
pub mod error;
pub mod marker;
pub mod notify;
pub mod pipeline;
pub mod reflow;
pub mod source;

// ---- Re-exports for stable public API ----
pub use crate::compress::{select_best, CodecConfig, CompressionTrial, TrialResult};
pub use crate::dispatch::DispatchDecision;
pub use crate::error::{AllCodecsFailed, CodecError, UnitConversionError};
pub use crate::pipeline::{MailTemplate, Pipeline, RunOutcome, RunReport};
pub use crate::reflow::{reflow, Width};
pub use crate::source::{Batch, NewsItem};
