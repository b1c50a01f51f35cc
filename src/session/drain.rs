//! Frame-processing loop
//!
//! Steps the engine until it reports a sentinel, the output reaches a bound,
//! or a step fails. Steps are strictly sequential. There is no iteration cap:
//! an engine that never ends the stream keeps the loop running.

use crate::engine::{Engine, Sentinel, StatusClass};

use super::{Handle, SessionError, SessionResult};

/// When the loop stops besides sentinels and errors
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrainPolicy {
    /// Until EOF or EAGAIN
    #[default]
    Unbounded,
    /// Also stop once `last_position` reaches this many seconds
    Until(f64),
}

impl From<Option<f64>> for DrainPolicy {
    fn from(bound: Option<f64>) -> Self {
        bound.map_or(DrainPolicy::Unbounded, DrainPolicy::Until)
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrainOutcome {
    EndOfStream,
    /// EAGAIN: nothing more ready right now. Resuming is up to the caller.
    WouldBlock,
    BoundReached { position: f64 },
}

impl DrainOutcome {
    /// Short name reported to callers: "eof", "eagain" or "bound"
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainOutcome::EndOfStream => "eof",
            DrainOutcome::WouldBlock => "eagain",
            DrainOutcome::BoundReached { .. } => "bound",
        }
    }

    /// Position that satisfied the bound
    pub fn position(&self) -> Option<f64> {
        match self {
            DrainOutcome::BoundReached { position } => Some(*position),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrainReport {
    pub outcome: DrainOutcome,
    /// Processing calls issued
    pub steps: u64,
}

/// Drive `handle` according to `policy`
pub fn drain<E: Engine>(handle: &mut Handle<E>, policy: DrainPolicy) -> SessionResult<DrainReport> {
    let sentinels = handle.sentinels();
    let mut steps = 0u64;

    let outcome = loop {
        if let DrainPolicy::Until(bound) = policy {
            let position = handle.last_position();
            if position >= bound {
                break DrainOutcome::BoundReached { position };
            }
        }

        let status = handle.process_step();
        steps += 1;

        match sentinels.classify(status) {
            StatusClass::Success(_) => continue,
            StatusClass::Sentinel(Sentinel::EndOfStream) => break DrainOutcome::EndOfStream,
            StatusClass::Sentinel(Sentinel::WouldBlock) => break DrainOutcome::WouldBlock,
            StatusClass::Error(code) => {
                let err = handle.transcoder().error(code)?;
                tracing::warn!(target: "transcode", code, steps, "processing failed: {}", err);
                return Err(SessionError::Process(err));
            }
        }
    };

    tracing::debug!(target: "transcode", ?outcome, steps, "drain finished");
    Ok(DrainReport { outcome, steps })
}
