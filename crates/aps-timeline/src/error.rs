use aps_core::{ResourceKey, Ticks};
use thiserror::Error;

/// Failures raised by directory, timeline, and run-set mutation contracts.
///
/// Every variant is a local, synchronous failure: the operation validates
/// before committing, so a returned error means the structure is unchanged.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("resource key {0} already present in directory")]
    DuplicateKey(ResourceKey),

    #[error("resource key {0} not found")]
    NotFound(ResourceKey),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("block end {attempted} precedes timeline tail end {tail}")]
    OrderingViolation { tail: Ticks, attempted: Ticks },
}

pub type TimelineResult<T> = Result<T, TimelineError>;
