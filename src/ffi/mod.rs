//! Hand-written bindings for the native wrapper library (no bindgen)
//!
//! The wrapper owns all FFmpeg state behind an opaque handler; we only see a
//! handful of entry points and one flat parameter record.

pub mod types;
#[cfg(feature = "native")]
pub mod wrapper;

pub use types::*;
