//! Error types for the audio store and SDP pipeline

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Audio session error: {0}")]
    AudioSession(#[from] AudioSessionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the generic store while processing a batch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store has been shut down")]
    Closed,

    #[error("Dispatch queue is full ({0} pending batches)")]
    QueueFull(usize),

    #[error("Task was dropped before the batch settled")]
    TaskDropped,
}

/// Audio session errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioSessionError {
    #[error("Invalid configuration category:{category} mode:{mode} options:{options}")]
    InvalidConfiguration {
        category: String,
        mode: String,
        options: String,
    },

    #[error("Native audio session call failed: {0}")]
    Native(String),

    #[error("Audio device module error: {0}")]
    DeviceModule(String),

    #[error("Permission request failed: {0}")]
    Permission(String),
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
