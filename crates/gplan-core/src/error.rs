//! Error types for task construction, decoding, and scenario loading.

use thiserror::Error;

/// Invalid task parameters, rejected when a task is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskConfigError {
    #[error("standard deviation must be positive and finite, got {0}")]
    InvalidStdDev(f64),
    #[error("no-fly penalty must be positive and finite, got {0}")]
    InvalidPenalty(f64),
    #[error("target point must have finite coordinates")]
    NonFiniteTarget,
}

/// Failure while reading a binary planning problem.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not a planning problem record (bad magic)")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    #[error("stream truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("invalid {what} count {count}")]
    InvalidCount { what: &'static str, count: i64 },
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),
    #[error("string is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("unknown task type {0:?}")]
    UnknownTaskType(String),
    #[error("invalid {tag} task: {source}")]
    InvalidTask {
        tag: String,
        #[source]
        source: TaskConfigError,
    },
    #[error("{0} trailing bytes after planning problem")]
    TrailingBytes(usize),
}

/// Failure while loading a JSON scenario document.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("area {area}, task {task}: {source}")]
    InvalidTask {
        area: usize,
        task: usize,
        #[source]
        source: TaskConfigError,
    },
}
