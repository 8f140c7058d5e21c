//! Error types for the chatling engine.

use thiserror::Error;

/// Top-level error type for all engine operations.
///
/// Domain rejections (dead pet, sleeping pet, not enough energy) are *not*
/// errors; they are ordinary variants of
/// [`ActionOutcome`](crate::engine::ActionOutcome). This type covers
/// infrastructure and configuration failures only.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No pet record exists for the given chat.
    #[error("No pet exists for chat {chat}")]
    PetMissing {
        /// The chat that was looked up.
        chat: crate::ChatId,
    },

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A notifier adapter failed to deliver a notification.
    #[error("Notification failed: {0}")]
    Notify(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
