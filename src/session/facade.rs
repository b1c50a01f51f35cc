//! Async session facade
//!
//! Every engine call runs on tokio's blocking pool. The handle is moved into
//! the blocking task and handed back when the task finishes, so a handle is
//! never reachable while a call on it is in flight, and `&mut self` keeps a
//! caller from issuing the next call before the previous one resolved.

use crate::engine::{Engine, Status, StatusClass, Transcoder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use super::{
    drain, normalize, DrainPolicy, DrainReport, Handle, SessionConfig, SessionError, SessionResult,
};

/// A full transcoding job: configuration plus optional seek and bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub session: SessionConfig,
    /// Seek here (seconds) before processing
    #[serde(default)]
    pub seek: Option<f64>,
    /// Stop once output reaches this position (seconds)
    #[serde(default)]
    pub until: Option<f64>,
}

impl Job {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            session,
            seek: None,
            until: None,
        }
    }

    pub fn from_json(json: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON job file
    pub fn from_json_file(path: impl AsRef<Path>) -> SessionResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// An open transcoding session
///
/// Dropping a session without calling [`Session::close`] still closes the
/// handle, synchronously on the dropping thread.
pub struct Session<E: Engine> {
    transcoder: Arc<Transcoder<E>>,
    handle: Option<Handle<E>>,
}

impl<E: Engine> Session<E> {
    /// Normalize `config`, then allocate and initialize a handle off-thread
    pub async fn open(transcoder: Arc<Transcoder<E>>, config: &SessionConfig) -> SessionResult<Self> {
        let params = normalize(config)?;
        let handle = {
            let transcoder = transcoder.clone();
            spawn_blocking(move || Handle::open(transcoder, &params)).await??
        };
        tracing::info!(
            target: "transcode",
            input = %config.common().input,
            output = %config.common().output,
            kind = ?config.kind(),
            "session opened"
        );
        Ok(Self {
            transcoder,
            handle: Some(handle),
        })
    }

    /// Open, seek, process, flush and close; the handle is closed on every path
    ///
    /// A failing seek is logged and processing continues from wherever the
    /// engine left the input.
    pub async fn run(transcoder: Arc<Transcoder<E>>, job: &Job) -> SessionResult<DrainReport> {
        let mut session = Self::open(transcoder, &job.session).await?;
        let result = session.drive(job).await;
        session.close().await;
        result
    }

    async fn drive(&mut self, job: &Job) -> SessionResult<DrainReport> {
        if let Some(position) = job.seek {
            let status = self.seek(position).await?;
            if status.is_err() {
                let message = self.describe(status)?;
                tracing::warn!(target: "transcode", position, "Error while seeking: {}", message);
            }
        }

        let report = self.process(job.until).await?;

        let status = self.flush().await?;
        if let StatusClass::Error(code) = self.transcoder.sentinels().classify(status) {
            return Err(SessionError::Flush(self.transcoder.error(code)?));
        }

        Ok(report)
    }

    /// Run `op` against the handle on the blocking pool
    async fn with_handle<T, F>(&mut self, op: F) -> SessionResult<T>
    where
        F: FnOnce(&mut Handle<E>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut handle = self.handle.take().ok_or(SessionError::Closed)?;
        // If `op` panics the handle is dropped (and closed) inside the task
        let (handle, out) = spawn_blocking(move || {
            let out = op(&mut handle);
            (handle, out)
        })
        .await?;
        self.handle = Some(handle);
        Ok(out)
    }

    /// Seek to `position` seconds and return the engine's raw status
    ///
    /// A negative status does not close the session.
    pub async fn seek(&mut self, position: f64) -> SessionResult<Status> {
        self.with_handle(move |handle| handle.seek(position)).await
    }

    /// Drain the engine, optionally stopping at `bound` seconds
    pub async fn process(&mut self, bound: Option<f64>) -> SessionResult<DrainReport> {
        let policy = DrainPolicy::from(bound);
        self.with_handle(move |handle| drain(handle, policy)).await?
    }

    /// Flush and return the engine's raw status
    pub async fn flush(&mut self) -> SessionResult<Status> {
        self.with_handle(|handle| handle.flush()).await
    }

    /// Close the handle. Consumes the session, so it can only happen once.
    pub async fn close(mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(e) = spawn_blocking(move || handle.close()).await {
            tracing::error!(target: "transcode", "close task failed: {}", e);
        }
        tracing::info!(target: "transcode", "session closed");
    }

    /// Message for a status returned by [`seek`](Self::seek) or [`flush`](Self::flush)
    pub fn describe(&self, status: Status) -> SessionResult<String> {
        Ok(self.transcoder.describe(status.code())?)
    }

    /// False once an operation panicked and took the handle with it
    #[inline]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    #[inline]
    pub fn transcoder(&self) -> &Arc<Transcoder<E>> {
        &self.transcoder
    }
}

impl<E: Engine> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .finish()
    }
}
