//! Scripted in-memory engine for tests
//!
//! Records every call, replays scripted statuses per handle and flags any
//! operation that starts while another one is running on the same handle.

use super::{Engine, Status};
use crate::session::NormalizedParams;
use std::collections::HashMap;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const EOF: c_int = -541478725;
pub const EAGAIN: c_int = -11;
pub const EINVAL: c_int = -22;
pub const ENOENT: c_int = -2;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Alloc(u32),
    Init(u32),
    Seek(u32, f64),
    LastPosition(u32),
    Process(u32),
    Flush(u32),
    Close(u32),
}

impl Call {
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            Call::Seek(..) | Call::LastPosition(_) | Call::Process(_) | Call::Flush(_)
        )
    }
}

/// How `last_position` answers
#[derive(Debug, Clone, Copy)]
pub enum Positions {
    /// The number of processing steps taken so far
    Steps,
    /// 0, 1, 2, ... on successive queries
    Queries,
}

#[derive(Debug, Default)]
struct HandleScript {
    steps: usize,
    queries: usize,
    busy: bool,
}

#[derive(Debug)]
pub struct StubHandle(u32);

#[derive(Debug)]
pub struct ScriptedEngine {
    init_status: c_int,
    seek_status: c_int,
    flush_status: c_int,
    process: Vec<c_int>,
    positions: Positions,
    step_delay: Duration,
    next_id: AtomicUsize,
    sentinel_queries: AtomicUsize,
    strerror_calls: AtomicUsize,
    overlaps: AtomicUsize,
    calls: Mutex<Vec<Call>>,
    params: Mutex<Vec<NormalizedParams>>,
    handles: Mutex<HashMap<u32, HandleScript>>,
}

impl ScriptedEngine {
    /// Engine whose init/seek/flush succeed and whose processing hits EOF
    /// on the first step
    pub fn new() -> Self {
        Self {
            init_status: 0,
            seek_status: 0,
            flush_status: 0,
            process: Vec::new(),
            positions: Positions::Steps,
            step_delay: Duration::ZERO,
            next_id: AtomicUsize::new(1),
            sentinel_queries: AtomicUsize::new(0),
            strerror_calls: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            params: Mutex::new(Vec::new()),
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn init_status(mut self, status: c_int) -> Self {
        self.init_status = status;
        self
    }

    pub fn seek_status(mut self, status: c_int) -> Self {
        self.seek_status = status;
        self
    }

    pub fn flush_status(mut self, status: c_int) -> Self {
        self.flush_status = status;
        self
    }

    /// Statuses returned by successive processing steps of each handle;
    /// EOF once the script runs out
    pub fn process_script(mut self, statuses: impl IntoIterator<Item = c_int>) -> Self {
        self.process = statuses.into_iter().collect();
        self
    }

    /// `n` successful steps, then EOF
    pub fn frames(self, n: usize) -> Self {
        self.process_script(std::iter::repeat(0).take(n))
    }

    pub fn positions(mut self, positions: Positions) -> Self {
        self.positions = positions;
        self
    }

    pub fn step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn closes(&self) -> usize {
        self.count(|c| matches!(c, Call::Close(_)))
    }

    pub fn process_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Process(_)))
    }

    pub fn initialized_params(&self) -> Vec<NormalizedParams> {
        self.params.lock().unwrap().clone()
    }

    pub fn sentinel_queries(&self) -> usize {
        self.sentinel_queries.load(Ordering::SeqCst)
    }

    pub fn strerror_calls(&self) -> usize {
        self.strerror_calls.load(Ordering::SeqCst)
    }

    /// Operations that started while another was running on the same handle
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Mark the handle busy for the duration of `f`
    fn exclusive<T>(&self, id: u32, f: impl FnOnce(&mut HandleScript) -> T) -> T {
        {
            let mut handles = self.handles.lock().unwrap();
            let state = handles.entry(id).or_default();
            if state.busy {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            state.busy = true;
        }
        if !self.step_delay.is_zero() {
            std::thread::sleep(self.step_delay);
        }
        let mut handles = self.handles.lock().unwrap();
        let state = handles.entry(id).or_default();
        let out = f(state);
        state.busy = false;
        out
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for ScriptedEngine {
    type Handle = StubHandle;

    fn eof(&self) -> c_int {
        self.sentinel_queries.fetch_add(1, Ordering::SeqCst);
        EOF
    }

    fn eagain(&self) -> c_int {
        self.sentinel_queries.fetch_add(1, Ordering::SeqCst);
        EAGAIN
    }

    fn strerror(&self, code: c_int, buf: &mut [u8]) -> c_int {
        self.strerror_calls.fetch_add(1, Ordering::SeqCst);
        let message: &[u8] = match code {
            EOF => b"End of file",
            EAGAIN => b"Resource temporarily unavailable",
            EINVAL => b"Invalid argument",
            ENOENT => b"No such file or directory",
            _ => return -1,
        };
        let len = message.len().min(buf.len());
        buf[..len].copy_from_slice(&message[..len]);
        len as c_int
    }

    fn alloc_handler(&self) -> StubHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u32;
        self.record(Call::Alloc(id));
        StubHandle(id)
    }

    fn init_handler(&self, params: &NormalizedParams, handle: &mut StubHandle) -> Status {
        self.record(Call::Init(handle.0));
        self.params.lock().unwrap().push(params.clone());
        Status::new(self.init_status)
    }

    fn seek(&self, handle: &mut StubHandle, position: f64) -> Status {
        self.record(Call::Seek(handle.0, position));
        self.exclusive(handle.0, |_| Status::new(self.seek_status))
    }

    fn last_position(&self, handle: &mut StubHandle) -> f64 {
        self.record(Call::LastPosition(handle.0));
        self.exclusive(handle.0, |state| {
            let position = match self.positions {
                Positions::Steps => state.steps as f64,
                Positions::Queries => state.queries as f64,
            };
            state.queries += 1;
            position
        })
    }

    fn process_frames(&self, handle: &mut StubHandle) -> Status {
        self.record(Call::Process(handle.0));
        self.exclusive(handle.0, |state| {
            let status = self.process.get(state.steps).copied().unwrap_or(EOF);
            state.steps += 1;
            Status::new(status)
        })
    }

    fn flush(&self, handle: &mut StubHandle) -> Status {
        self.record(Call::Flush(handle.0));
        self.exclusive(handle.0, |_| Status::new(self.flush_status))
    }

    fn close_handler(&self, handle: &mut StubHandle) {
        self.record(Call::Close(handle.0));
    }
}
