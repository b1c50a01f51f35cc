//! Node.js surface
//!
//! Exposes transcoding sessions to JavaScript via NAPI-RS:
//!
//! ```javascript
//! const session = await open({
//!   type: 'audio',
//!   input: '/tmp/bla.mp4',
//!   output: '/tmp/blo.mp4',
//!   filters: 'aphaser',
//!   format: 'mp4',
//!   encoder: 'aac',
//!   encoderParams: 'b 64k',
//! })
//!
//! try {
//!   const ret = await session.seek(2.2)
//!   if (ret < 0) console.error(`Error while seeking: ${strerror(ret)}`)
//!   await session.process()
//!   await session.flush()
//! } finally {
//!   await session.close()
//! }
//! ```

use crate::engine::NativeEngine;
use crate::session::{CommonParams, DrainReport, MediaKind, Session, SessionConfig, SessionError};
use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::sync::Arc;
use tokio::sync::Mutex;

fn session_error(err: SessionError) -> Error {
  Error::new(Status::GenericFailure, err.to_string())
}

// ============================================================================
// Parameters
// ============================================================================

/// Session parameters, `type` selects the audio or video variant
#[napi(object)]
pub struct TranscodeParams {
  #[napi(js_name = "type", ts_type = "'audio' | 'video'")]
  pub kind: String,
  pub input: String,
  pub output: String,
  pub filters: String,
  pub format: String,
  pub encoder: String,
  pub encoder_params: String,
  /// Required for video sessions
  pub pixel_format: Option<String>,
}

impl TryFrom<TranscodeParams> for SessionConfig {
  type Error = Error;

  fn try_from(params: TranscodeParams) -> Result<Self> {
    let invalid = |e: SessionError| Error::new(Status::InvalidArg, e.to_string());
    let kind = params.kind.parse::<MediaKind>().map_err(invalid)?;
    let common = CommonParams {
      input: params.input,
      output: params.output,
      filters: params.filters,
      format: params.format,
      encoder: params.encoder,
      encoder_params: params.encoder_params,
    };
    SessionConfig::from_parts(kind, common, params.pixel_format).map_err(invalid)
  }
}

/// Result of `process()`
#[napi(object)]
pub struct ProcessResult {
  /// "eof", "eagain" or "bound"
  pub outcome: String,
  /// Processing calls issued
  pub steps: u32,
  /// Position that satisfied the bound
  pub position: Option<f64>,
}

impl From<DrainReport> for ProcessResult {
  fn from(report: DrainReport) -> Self {
    Self {
      outcome: report.outcome.as_str().to_string(),
      steps: u32::try_from(report.steps).unwrap_or(u32::MAX),
      position: report.outcome.position(),
    }
  }
}

// ============================================================================
// Module functions
// ============================================================================

/// Open a transcoding session
#[napi]
pub async fn open(params: TranscodeParams) -> Result<TranscodeSession> {
  let config = SessionConfig::try_from(params)?;
  let session = Session::open(NativeEngine::shared(), &config)
    .await
    .map_err(session_error)?;
  Ok(TranscodeSession {
    inner: Arc::new(Mutex::new(Some(session))),
  })
}

/// Describe an engine status code
#[napi]
pub fn strerror(code: i32) -> Result<String> {
  NativeEngine::shared()
    .describe(code)
    .map_err(|e| session_error(e.into()))
}

/// The engine's end-of-stream status code
#[napi(js_name = "EOF")]
pub fn eof() -> i32 {
  NativeEngine::shared().sentinels().eof
}

/// The engine's "call again" status code
#[napi(js_name = "EAGAIN")]
pub fn eagain() -> i32 {
  NativeEngine::shared().sentinels().eagain
}

// ============================================================================
// TranscodeSession - NAPI class wrapper
// ============================================================================

/// An open transcoding session
///
/// Calls are serialized: each one waits for the previous call to resolve.
#[napi]
pub struct TranscodeSession {
  inner: Arc<Mutex<Option<Session<NativeEngine>>>>,
}

#[napi]
impl TranscodeSession {
  /// Seek to `position` seconds; returns the raw status code
  #[napi]
  pub async fn seek(&self, position: f64) -> Result<i32> {
    let mut guard = self.inner.lock().await;
    let session = guard.as_mut().ok_or_else(closed_error)?;
    let status = session.seek(position).await.map_err(session_error)?;
    Ok(status.code())
  }

  /// Process until end of stream, or until output reaches `bound` seconds
  #[napi]
  pub async fn process(&self, bound: Option<f64>) -> Result<ProcessResult> {
    let mut guard = self.inner.lock().await;
    let session = guard.as_mut().ok_or_else(closed_error)?;
    let report = session.process(bound).await.map_err(session_error)?;
    Ok(report.into())
  }

  /// Flush buffered output; returns the raw status code
  #[napi]
  pub async fn flush(&self) -> Result<i32> {
    let mut guard = self.inner.lock().await;
    let session = guard.as_mut().ok_or_else(closed_error)?;
    let status = session.flush().await.map_err(session_error)?;
    Ok(status.code())
  }

  /// Close the session. Further calls reject; closing twice is a no-op.
  #[napi]
  pub async fn close(&self) -> Result<()> {
    let session = self.inner.lock().await.take();
    if let Some(session) = session {
      session.close().await;
    }
    Ok(())
  }
}

fn closed_error() -> Error {
  session_error(SessionError::Closed)
}
