//! [`Engine`] backed by the linked native wrapper library

use super::{Engine, Status, Transcoder};
use crate::ffi::{wrapper, Handler};
use crate::session::NormalizedParams;
use std::os::raw::c_int;
use std::sync::{Arc, OnceLock};

/// Raw `handler_t*` owned by a session
///
/// May be null if the wrapper failed to allocate; `init_handler` reports that.
#[derive(Debug)]
pub struct NativeHandle(*mut Handler);

// The wrapper keeps no thread affinity; a handler may move between threads as
// long as only one thread uses it at a time.
unsafe impl Send for NativeHandle {}

/// The native wrapper library
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeEngine;

impl NativeEngine {
    /// Process-wide transcoder; sentinels are fetched on first use
    pub fn shared() -> Arc<Transcoder<NativeEngine>> {
        static SHARED: OnceLock<Arc<Transcoder<NativeEngine>>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(Transcoder::new(NativeEngine)))
            .clone()
    }
}

impl Engine for NativeEngine {
    type Handle = NativeHandle;

    fn eof(&self) -> c_int {
        unsafe { wrapper::get_eof() }
    }

    fn eagain(&self) -> c_int {
        unsafe { wrapper::get_eagain() }
    }

    fn strerror(&self, code: c_int, buf: &mut [u8]) -> c_int {
        unsafe { wrapper::get_strerror(code, buf.as_mut_ptr().cast(), buf.len()) }
    }

    fn alloc_handler(&self) -> NativeHandle {
        NativeHandle(unsafe { wrapper::alloc_handler() })
    }

    fn init_handler(&self, params: &NormalizedParams, handle: &mut NativeHandle) -> Status {
        // `raw` borrows the CStrings in `params` for the duration of the call
        let raw = params.as_raw();
        Status::new(unsafe { wrapper::init_handler(&raw, handle.0) })
    }

    fn seek(&self, handle: &mut NativeHandle, position: f64) -> Status {
        Status::new(unsafe { wrapper::seek(handle.0, position) })
    }

    fn last_position(&self, handle: &mut NativeHandle) -> f64 {
        unsafe { wrapper::last_position(handle.0) }
    }

    fn process_frames(&self, handle: &mut NativeHandle) -> Status {
        Status::new(unsafe { wrapper::process_frames(handle.0) })
    }

    fn flush(&self, handle: &mut NativeHandle) -> Status {
        Status::new(unsafe { wrapper::flush(handle.0) })
    }

    fn close_handler(&self, handle: &mut NativeHandle) {
        unsafe { wrapper::close_handler(handle.0) };
        handle.0 = std::ptr::null_mut();
    }
}
