//! Owning wrapper around an engine handle
//!
//! A [`Handle`] is created initialized or not at all, is never duplicated and
//! is released exactly once, by [`Handle::close`] or by `Drop`.

use crate::engine::{Engine, Sentinels, Status, StatusClass, Transcoder};
use std::fmt;
use std::sync::Arc;

use super::{NormalizedParams, SessionError, SessionResult};

/// Lifecycle of an engine handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Allocated,
    Initialized,
    /// At least one seek/process/flush has been issued
    Active,
    /// Closed; absorbing
    Terminated,
}

/// Exclusive owner of one engine handle
pub struct Handle<E: Engine> {
    transcoder: Arc<Transcoder<E>>,
    raw: E::Handle,
    state: HandleState,
}

impl<E: Engine> Handle<E> {
    /// Allocate and initialize a handle
    ///
    /// If initialization fails the handle is closed before the error is
    /// returned.
    pub fn open(transcoder: Arc<Transcoder<E>>, params: &NormalizedParams) -> SessionResult<Self> {
        Self::allocate(transcoder).initialize(params)
    }

    /// Allocation never fails here; a bad allocation surfaces from `init_handler`
    pub(crate) fn allocate(transcoder: Arc<Transcoder<E>>) -> Self {
        let raw = transcoder.engine().alloc_handler();
        tracing::trace!(target: "transcode", "handle allocated");
        Self {
            transcoder,
            raw,
            state: HandleState::Allocated,
        }
    }

    pub(crate) fn initialize(mut self, params: &NormalizedParams) -> SessionResult<Self> {
        let status = self.transcoder.engine().init_handler(params, &mut self.raw);

        match self.sentinels().classify(status) {
            StatusClass::Success(_) => {
                self.state = HandleState::Initialized;
                tracing::debug!(
                    target: "transcode",
                    input = ?params.input,
                    output = ?params.output,
                    is_video = params.is_video,
                    "handle initialized"
                );
                Ok(self)
            }
            // Sentinels are failures here too: nothing was opened
            _ => {
                let transcoder = self.transcoder.clone();
                self.close();
                let err = transcoder.error(status.code())?;
                tracing::warn!(target: "transcode", code = err.code, "init failed: {}", err);
                Err(SessionError::Init(err))
            }
        }
    }

    #[inline]
    pub fn state(&self) -> HandleState {
        self.state
    }

    #[inline]
    pub fn transcoder(&self) -> &Arc<Transcoder<E>> {
        &self.transcoder
    }

    #[inline]
    pub fn sentinels(&self) -> Sentinels {
        self.transcoder.sentinels()
    }

    fn activate(&mut self) {
        if self.state == HandleState::Initialized {
            self.state = HandleState::Active;
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Seek to `position` seconds; the raw status is returned unchecked
    pub fn seek(&mut self, position: f64) -> Status {
        self.activate();
        self.transcoder.engine().seek(&mut self.raw, position)
    }

    /// Position (seconds) of the last emitted frame
    pub fn last_position(&mut self) -> f64 {
        self.activate();
        self.transcoder.engine().last_position(&mut self.raw)
    }

    /// Run one processing step
    pub fn process_step(&mut self) -> Status {
        self.activate();
        self.transcoder.engine().process_frames(&mut self.raw)
    }

    /// Flush buffered output and write the trailer
    pub fn flush(&mut self) -> Status {
        self.activate();
        self.transcoder.engine().flush(&mut self.raw)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Release the handle. Best-effort; the engine reports nothing.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.state == HandleState::Terminated {
            return;
        }
        self.transcoder.engine().close_handler(&mut self.raw);
        self.state = HandleState::Terminated;
        tracing::trace!(target: "transcode", "handle closed");
    }
}

impl<E: Engine> Drop for Handle<E> {
    fn drop(&mut self) {
        if self.state != HandleState::Terminated {
            tracing::debug!(target: "transcode", state = ?self.state, "closing dropped handle");
            self.release();
        }
    }
}

impl<E: Engine> fmt::Debug for Handle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("state", &self.state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stub::{Call, ScriptedEngine, EINVAL, ENOENT, EOF};
    use crate::session::{normalize, CommonParams, SessionConfig};

    fn params() -> NormalizedParams {
        normalize(&SessionConfig::audio(CommonParams {
            input: "/tmp/in.mp4".into(),
            output: "/tmp/out.mp4".into(),
            filters: "anull".into(),
            format: "mp4".into(),
            encoder: "aac".into(),
            encoder_params: String::new(),
        }))
        .unwrap()
    }

    #[test]
    fn test_open_then_close() {
        let transcoder = Arc::new(Transcoder::new(ScriptedEngine::new()));
        let handle = Handle::open(transcoder.clone(), &params()).unwrap();
        assert_eq!(handle.state(), HandleState::Initialized);
        handle.close();

        let engine = transcoder.engine();
        assert_eq!(engine.calls(), vec![Call::Alloc(1), Call::Init(1), Call::Close(1)]);
        assert_eq!(engine.count(Call::is_processing), 0);
    }

    #[test]
    fn test_init_failure_closes_once() {
        let transcoder = Arc::new(Transcoder::new(ScriptedEngine::new().init_status(ENOENT)));
        let err = Handle::open(transcoder.clone(), &params()).unwrap_err();

        assert!(matches!(err, SessionError::Init(ref e) if e.code == ENOENT));
        assert_eq!(
            err.to_string(),
            "Error while creating handler: No such file or directory"
        );
        assert_eq!(
            transcoder.engine().calls(),
            vec![Call::Alloc(1), Call::Init(1), Call::Close(1)]
        );
    }

    #[test]
    fn test_init_sentinel_is_a_failure() {
        let transcoder = Arc::new(Transcoder::new(ScriptedEngine::new().init_status(EOF)));
        let err = Handle::open(transcoder.clone(), &params()).unwrap_err();
        assert!(matches!(err, SessionError::Init(ref e) if e.code == EOF));
        assert_eq!(transcoder.engine().closes(), 1);
    }

    #[test]
    fn test_init_failure_with_unknown_code_still_closes() {
        let transcoder = Arc::new(Transcoder::new(ScriptedEngine::new().init_status(-777)));
        let err = Handle::open(transcoder.clone(), &params()).unwrap_err();
        assert!(matches!(err, SessionError::UnknownErrorCode(_)));
        assert_eq!(transcoder.engine().closes(), 1);
    }

    #[test]
    fn test_drop_closes_once() {
        let transcoder = Arc::new(Transcoder::new(ScriptedEngine::new()));
        {
            let mut handle = Handle::open(transcoder.clone(), &params()).unwrap();
            assert_eq!(handle.seek(1.0), Status::new(0));
            assert_eq!(handle.state(), HandleState::Active);
        }
        assert_eq!(transcoder.engine().closes(), 1);
    }

    #[test]
    fn test_seek_failure_keeps_handle_open() {
        let transcoder = Arc::new(Transcoder::new(ScriptedEngine::new().seek_status(EINVAL)));
        let mut handle = Handle::open(transcoder.clone(), &params()).unwrap();
        assert_eq!(handle.seek(99.0).code(), EINVAL);
        assert_eq!(transcoder.engine().closes(), 0);
        assert_eq!(handle.flush(), Status::new(0));
        handle.close();
        assert_eq!(transcoder.engine().closes(), 1);
    }
}
