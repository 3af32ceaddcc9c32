use std::fmt::Display;

use cpbp_core::Inconsistency;
use thiserror::Error;

pub type CpbpResult<T> = Result<T, CpbpError>;

#[derive(Error, Debug)]
pub enum CpbpError {
    #[error("IO error, more details: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed input at token {position}: {message}")]
    MalformedInput { position: usize, message: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Sample {sample} is inconsistent: {source}")]
    InconsistentSample {
        sample: usize,
        source: Inconsistency,
    },
}

impl CpbpError {
    pub(crate) fn malformed_input(position: usize, message: impl Display) -> Self {
        Self::MalformedInput {
            position,
            message: message.to_string(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Display) -> Self {
        Self::InvalidArgument(message.to_string())
    }

    /// The code with which the process exits when this error ends a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            CpbpError::Io(_) => 1,
            CpbpError::InconsistentSample { .. } => 2,
            CpbpError::MalformedInput { .. } | CpbpError::InvalidArgument(_) => 3,
        }
    }
}
