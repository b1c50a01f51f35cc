#![deny(clippy::all)]

//! Session-driven transcoding over a native FFmpeg wrapper library
//!
//! The wrapper does all decoding, filtering and encoding behind an opaque
//! handler. This crate owns that handler's lifecycle: it normalizes the job
//! parameters, opens the handler (closing it again if initialization fails),
//! drives it frame by frame off the async caller's thread, and releases it
//! exactly once.

// Native wrapper C bindings (hand-written, no bindgen)
pub mod ffi;

// Engine call surface and error translation
pub mod engine;

// Handle ownership, drain loop and async facade
pub mod session;

// Node.js API surface (NAPI classes)
#[cfg(feature = "node")]
pub mod node;

pub use engine::{Engine, EngineError, Sentinel, Sentinels, Status, Transcoder};
#[cfg(feature = "native")]
pub use engine::NativeEngine;
pub use session::{
    DrainOutcome, DrainPolicy, DrainReport, Job, Session, SessionConfig, SessionError,
    SessionResult,
};
