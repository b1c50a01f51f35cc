//! Transcoding sessions
//!
//! A session owns one engine handle from allocation to close. This module
//! holds the pieces that make that safe: the parameter normalizer, the owning
//! [`Handle`], the drain loop and the async [`Session`] facade that runs every
//! blocking call off the caller's thread.

pub mod drain;
pub mod facade;
pub mod handle;
pub mod params;

pub use drain::{drain, DrainOutcome, DrainPolicy, DrainReport};
pub use facade::{Job, Session};
pub use handle::{Handle, HandleState};
pub use params::{
    normalize, CommonParams, MediaKind, NormalizedParams, SessionConfig, PIXEL_FORMAT_PLACEHOLDER,
};

use crate::engine::{EngineError, UnknownErrorCode};
use std::os::raw::c_int;

/// Session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// `init_handler` failed; the handle has already been closed
    #[error("Error while creating handler: {0}")]
    Init(EngineError),

    #[error("Error while processing: {0}")]
    Process(EngineError),

    #[error("Error while flushing: {0}")]
    Flush(EngineError),

    /// The engine could not describe a code we handed it
    #[error(transparent)]
    UnknownErrorCode(#[from] UnknownErrorCode),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session is closed")]
    Closed,

    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Failed to read job file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid job description: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Engine status code behind this error, if any
    pub fn code(&self) -> Option<c_int> {
        match self {
            SessionError::Init(e) | SessionError::Process(e) | SessionError::Flush(e) => Some(e.code),
            SessionError::UnknownErrorCode(e) => Some(e.0),
            _ => None,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
