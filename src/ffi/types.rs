//! Native wrapper type definitions
//!
//! The session state (`handler_t`) is opaque to keep us independent of the
//! wrapper's internal layout. The parameter record is the one struct we build
//! ourselves, so it is `#[repr(C)]` with the field order the wrapper expects.

use std::marker::PhantomData;
use std::os::raw::c_char;

// ============================================================================
// Opaque Types
// ============================================================================

/// Opaque handler_t structure (decoder/encoder contexts, I/O, filter graph)
#[repr(C)]
pub struct Handler {
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

// ============================================================================
// Parameter Record
// ============================================================================

/// Flat parameter record passed to `init_handler`
///
/// Every string field must be non-null: the initializer reads all of them
/// regardless of `is_video`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HandlerParams {
    /// Input file path
    pub input: *const c_char,
    /// Output file path
    pub output: *const c_char,
    /// Filter chain description (e.g. "aphaser", "scale=w=780:h=-1,dblur")
    pub filters: *const c_char,
    /// Output container format short name (e.g. "mp4")
    pub format: *const c_char,
    /// Encoder name (e.g. "aac", "libx264")
    pub encoder: *const c_char,
    /// Encoder options, "key value" pairs separated by ','
    pub encoder_params: *const c_char,
    /// Pixel format name; placeholder for audio jobs
    pub pixel_format: *const c_char,
    /// Selects the video or audio stream of the input
    pub is_video: bool,
}
