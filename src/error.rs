use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(
        "expected two MM:SS clock readings but found fewer (start text: {start_text:?}, end text: {end_text:?})"
    )]
    ClockParse {
        start_text: String,
        end_text: String,
    },
    #[error("telemetry not found: {0}")]
    NotFound(String),
    #[error("malformed frame {frame_index}: {reason}")]
    MalformedFrame { frame_index: usize, reason: String },
    #[error("file operation failed for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// The input a failed request should be blamed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultyInput {
    ClockText,
    Telemetry,
    LocalFile,
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn faulty_input(&self) -> FaultyInput {
        match self {
            Self::ClockParse { .. } => FaultyInput::ClockText,
            Self::NotFound(_) | Self::MalformedFrame { .. } => FaultyInput::Telemetry,
            Self::Io { .. } | Self::Json(_) | Self::InvalidSettings(_) => FaultyInput::LocalFile,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
