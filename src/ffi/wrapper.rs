//! Native wrapper function declarations
//!
//! The call surface exported by `libmts-ffmpeg-wrapper`. Names and signatures
//! are the contract; everything behind them is the wrapper's business.

use super::types::{Handler, HandlerParams};
use std::os::raw::{c_char, c_double, c_int};

extern "C" {
    // ========================================================================
    // Sentinels & Errors
    // ========================================================================

    /// Status code meaning "no more input" (AVERROR_EOF)
    pub fn get_eof() -> c_int;

    /// Status code meaning "no output yet, call again" (AVERROR(EAGAIN))
    pub fn get_eagain() -> c_int;

    /// Write the description of `err` into `buf`
    ///
    /// Returns the number of bytes written, or a negative value if `err` is
    /// not a known error code.
    pub fn get_strerror(err: c_int, buf: *mut c_char, buflen: usize) -> c_int;

    // ========================================================================
    // Handler Lifecycle
    // ========================================================================

    /// Allocate an uninitialized handler
    pub fn alloc_handler() -> *mut Handler;

    /// Open input/output, build the filter graph and encoder
    ///
    /// On a negative return the handler must still be released with
    /// `close_handler`.
    pub fn init_handler(params: *const HandlerParams, handler: *mut Handler) -> c_int;

    /// Release everything owned by the handler. Not idempotent.
    pub fn close_handler(handler: *mut Handler);

    // ========================================================================
    // Processing
    // ========================================================================

    /// Seek the input to `position` seconds
    pub fn seek(handler: *mut Handler, position: c_double) -> c_int;

    /// Timestamp (seconds) of the last frame written
    pub fn last_position(handler: *mut Handler) -> c_double;

    /// Decode, filter, encode and write the next chunk of input
    ///
    /// Callers stop on EOF or EAGAIN. Builds of `libmts-ffmpeg-wrapper` that
    /// consume the whole input in one call and return 0 never report EOF, so
    /// an unbounded drain over them does not end.
    pub fn process_frames(handler: *mut Handler) -> c_int;

    /// Drain decoder, filter graph and encoder, then write the trailer
    pub fn flush(handler: *mut Handler) -> c_int;
}
