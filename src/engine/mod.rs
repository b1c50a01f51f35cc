//! Safe call surface of the native transcoding engine
//!
//! [`Engine`] is the seam between the session layer and whatever actually
//! decodes, filters and encodes. [`Transcoder`] pairs an engine with the
//! sentinel values it reported at startup and translates its error codes.

pub mod error;
#[cfg(feature = "native")]
pub mod native;
#[cfg(test)]
pub(crate) mod stub;

pub use error::{
    EngineError, Sentinel, Sentinels, Status, StatusClass, UnknownErrorCode, STRERROR_BUFFER_LEN,
};
#[cfg(feature = "native")]
pub use native::{NativeEngine, NativeHandle};

use crate::session::NormalizedParams;
use error::message_from_buffer;
use std::os::raw::c_int;

/// The fixed call surface of a transcoding engine
///
/// Every method maps to one native entry point. Calls other than the sentinel
/// and error lookups may block for a long time and must not run on an async
/// executor thread.
pub trait Engine: Send + Sync + 'static {
    /// Opaque per-session state
    type Handle: Send + 'static;

    /// `get_eof`
    fn eof(&self) -> c_int;

    /// `get_eagain`
    fn eagain(&self) -> c_int;

    /// `get_strerror`: bytes written into `buf`, or negative if `code` is unknown
    fn strerror(&self, code: c_int, buf: &mut [u8]) -> c_int;

    /// `alloc_handler`
    fn alloc_handler(&self) -> Self::Handle;

    /// `init_handler`
    fn init_handler(&self, params: &NormalizedParams, handle: &mut Self::Handle) -> Status;

    /// `seek`, position in seconds
    fn seek(&self, handle: &mut Self::Handle, position: f64) -> Status;

    /// `last_position`, in seconds
    fn last_position(&self, handle: &mut Self::Handle) -> f64;

    /// `process_frames`: one unit of work
    fn process_frames(&self, handle: &mut Self::Handle) -> Status;

    /// `flush`
    fn flush(&self, handle: &mut Self::Handle) -> Status;

    /// `close_handler`. Must be called exactly once per allocated handle.
    fn close_handler(&self, handle: &mut Self::Handle);
}

/// An engine together with its sentinel values
///
/// Sentinels are fetched once in [`Transcoder::new`] and never re-queried.
pub struct Transcoder<E: Engine> {
    engine: E,
    sentinels: Sentinels,
}

impl<E: Engine> Transcoder<E> {
    pub fn new(engine: E) -> Self {
        let sentinels = Sentinels {
            eof: engine.eof(),
            eagain: engine.eagain(),
        };
        tracing::debug!(
            target: "transcode",
            eof = sentinels.eof,
            eagain = sentinels.eagain,
            "engine sentinels loaded"
        );
        Self { engine, sentinels }
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine's EOF and EAGAIN values
    #[inline]
    pub fn sentinels(&self) -> Sentinels {
        self.sentinels
    }

    /// Look up the message for an error code
    ///
    /// Sentinels are valid codes too and get the engine's literal message.
    /// Fails with [`UnknownErrorCode`] when the engine rejects the code.
    pub fn describe(&self, code: c_int) -> Result<String, UnknownErrorCode> {
        let mut buf = [0u8; STRERROR_BUFFER_LEN];
        let written = self.engine.strerror(code, &mut buf);
        if written < 0 {
            return Err(UnknownErrorCode(code));
        }
        Ok(message_from_buffer(&buf, written))
    }

    /// Build an [`EngineError`] carrying the translated message
    pub fn error(&self, code: c_int) -> Result<EngineError, UnknownErrorCode> {
        self.describe(code).map(|message| EngineError::new(code, message))
    }
}

impl<E: Engine + std::fmt::Debug> std::fmt::Debug for Transcoder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcoder")
            .field("engine", &self.engine)
            .field("sentinels", &self.sentinels)
            .finish()
    }
}
