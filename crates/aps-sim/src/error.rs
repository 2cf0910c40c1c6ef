use aps_timeline::TimelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("event queue is empty")]
    QueueEmpty,

    #[error("timeline error: {0}")]
    Timeline(#[from] TimelineError),

    #[error("dispatch parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
