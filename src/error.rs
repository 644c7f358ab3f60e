//! Error types for the assembly pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure of a single external tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The binary could not be located or spawned
    #[error("failed to spawn {program}: {source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited with a non-zero status
    #[error("exited with status {0}")]
    NonZeroExit(i32),

    /// The process was terminated by a signal and has no exit code
    #[error("terminated by signal {0}")]
    KilledBySignal(i32),

    /// The file standard output should be redirected into could not be opened
    #[error("cannot open output {path} for writing: {source}")]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child failed
    #[error("failed to wait for child process: {0}")]
    WaitFailed(#[source] std::io::Error),

    /// The run was interrupted while the tool was running; the child was killed
    #[error("interrupted")]
    Interrupted,
}

/// Errors that terminate a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing or invalid run parameters, detected before any stage runs
    #[error("invalid input: {0}")]
    Input(String),

    /// The working directory could not be created
    #[error("working directory error at {path}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external tool failed while executing a stage
    #[error("stage '{stage}' failed running {tool}: {source}")]
    Tool {
        stage: String,
        tool: &'static str,
        #[source]
        source: ToolError,
    },

    /// A step's declared input is absent or empty
    #[error("stage '{stage}' cannot start: input {path} is missing or empty")]
    MissingArtifact { stage: String, path: PathBuf },

    /// The run received SIGINT/SIGTERM
    #[error("run interrupted")]
    Interrupted,
}

impl PipelineError {
    /// Name of the stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            PipelineError::Tool { stage, .. } | PipelineError::MissingArtifact { stage, .. } => {
                Some(stage.as_str())
            }
            _ => None,
        }
    }
}
