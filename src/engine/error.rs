//! Engine status codes and error translation
//!
//! Every native call returns a signed status. Non-negative values are success,
//! two negative values are sentinels (fetched from the engine, never
//! hard-coded), and everything else is an error code the engine can describe.

use std::fmt;
use std::os::raw::c_int;

/// Size of the buffer handed to `get_strerror`
pub const STRERROR_BUFFER_LEN: usize = 1024;

// ============================================================================
// Status
// ============================================================================

/// Raw status code returned by an engine call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Status(c_int);

impl Status {
    #[inline]
    pub const fn new(code: c_int) -> Self {
        Self(code)
    }

    /// The raw integer code
    #[inline]
    pub const fn code(self) -> c_int {
        self.0
    }

    /// Check if the call succeeded (code >= 0)
    #[inline]
    pub const fn is_ok(self) -> bool {
        self.0 >= 0
    }

    /// Check if the call reported a failure or a sentinel
    #[inline]
    pub const fn is_err(self) -> bool {
        self.0 < 0
    }
}

impl From<c_int> for Status {
    fn from(code: c_int) -> Self {
        Self(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Sentinels
// ============================================================================

/// Named loop-termination conditions, not failures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sentinel {
    /// No more input
    EndOfStream,
    /// Nothing ready right now
    WouldBlock,
}

/// The engine's EOF and EAGAIN values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sentinels {
    pub eof: c_int,
    pub eagain: c_int,
}

impl Sentinels {
    /// Match a code against the sentinels
    #[inline]
    pub fn sentinel(&self, code: c_int) -> Option<Sentinel> {
        if code == self.eof {
            Some(Sentinel::EndOfStream)
        } else if code == self.eagain {
            Some(Sentinel::WouldBlock)
        } else {
            None
        }
    }

    /// Sort a status into success, sentinel or error
    pub fn classify(&self, status: Status) -> StatusClass {
        let code = status.code();
        if code >= 0 {
            StatusClass::Success(code)
        } else if let Some(sentinel) = self.sentinel(code) {
            StatusClass::Sentinel(sentinel)
        } else {
            StatusClass::Error(code)
        }
    }
}

/// Classified status code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Success(c_int),
    Sentinel(Sentinel),
    Error(c_int),
}

// ============================================================================
// Errors
// ============================================================================

/// Engine failure with code and translated message
#[derive(Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Error code (negative)
    pub code: c_int,
    /// Message from `get_strerror`
    pub message: String,
}

impl EngineError {
    pub fn new(code: c_int, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Debug for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineError")
            .field("code", &self.code)
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineError {}

/// `get_strerror` rejected the code: we passed something that is not an
/// engine error code
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid error: {0}")]
pub struct UnknownErrorCode(pub c_int);

// ============================================================================
// Message Helper
// ============================================================================

/// Decode the bytes `get_strerror` wrote into `buf`
///
/// `written` is clamped to the buffer and trailing NULs are dropped.
pub fn message_from_buffer(buf: &[u8], written: c_int) -> String {
    let len = usize::try_from(written).unwrap_or(0).min(buf.len());
    let bytes = &buf[..len];
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
