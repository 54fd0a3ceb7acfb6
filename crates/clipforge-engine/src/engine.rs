//! The engine boundary: backend traits, the one-shot completion
//! listener, and the resolve-once outcome cell behind it.
//!
//! The engine contract is builder + listener: the adapter starts one
//! job per invocation and the engine fires the success callback XOR
//! the failure callback at most once. Because cancellation can race a
//! callback, the listener is backed by a cell whose terminal state is
//! claimed by an atomic compare-and-set; the first of {success,
//! failure, cancellation} wins and everything later is a no-op.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use clipforge_compile::CompiledGraph;
use clipforge_core::Result;
use tokio::sync::oneshot;

/// Opaque result object an engine reports on success.
///
/// Fields use engine-native wide integers; a negative value means the
/// engine could not report that metric. The result translator coerces
/// these into the caller-facing record.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineReport {
    pub average_audio_bitrate: i64,
    pub average_video_bitrate: i64,
    pub duration_ms: i64,
    pub file_size_bytes: i64,
    pub video_frame_count: i64,
    pub channel_count: i32,
    pub sample_rate: i32,
    pub height: i32,
    pub width: i32,
    pub audio_encoder_name: Option<String>,
    pub video_encoder_name: Option<String>,
}

impl Default for EngineReport {
    /// A report with every metric unreported.
    fn default() -> Self {
        Self {
            average_audio_bitrate: -1,
            average_video_bitrate: -1,
            duration_ms: -1,
            file_size_bytes: -1,
            video_frame_count: -1,
            channel_count: -1,
            sample_rate: -1,
            height: -1,
            width: -1,
            audio_encoder_name: None,
            video_encoder_name: None,
        }
    }
}

/// Opaque error object an engine delivers on failure. The message is
/// surfaced verbatim; the cause chain is preserved for diagnostics.
#[derive(Debug)]
pub struct EngineError {
    pub message: String,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EngineError {
    /// An engine error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// An engine error with an underlying cause.
    pub fn with_cause(
        message: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A transcoding engine backend.
///
/// One job is started per invocation and never reused; the engine
/// delivers at most one event to the listener it was given.
pub trait Engine: Send + Sync {
    /// Handle to one in-flight transformation.
    type Job: EngineJob;

    /// Start transforming `graph`, reporting the single terminal event
    /// through `listener`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be started at all (e.g.
    /// the backing process fails to spawn). Once `start` returns `Ok`,
    /// all further outcomes flow through the listener.
    fn start(&self, graph: CompiledGraph, listener: CompletionListener) -> Result<Self::Job>;
}

/// Handle to one in-flight engine job.
pub trait EngineJob: Send {
    /// Request cooperative cancellation of the underlying work.
    ///
    /// Fire-and-forget: the adapter commits to the cancelled outcome
    /// without waiting for an engine acknowledgement. Called at most
    /// once, and never after the job's listener has resolved.
    fn cancel(&mut self);
}

/// What one invocation terminates with. Exactly one per cell.
#[derive(Debug)]
pub(crate) enum Terminal {
    Completed(EngineReport),
    Failed(EngineError),
    Cancelled,
}

/// Single-resolution cell shared by the listener and the adapter's
/// cancellation path. `claimed` is the compare-and-set guard: whoever
/// flips it owns the terminal state, everyone else is a no-op.
#[derive(Debug)]
pub(crate) struct OutcomeCell {
    claimed: AtomicBool,
    tx: Mutex<Option<oneshot::Sender<Terminal>>>,
}

impl OutcomeCell {
    /// Create a cell and the receiver its terminal state arrives on.
    pub(crate) fn channel() -> (Arc<Self>, oneshot::Receiver<Terminal>) {
        let (tx, rx) = oneshot::channel();
        let cell = Arc::new(Self {
            claimed: AtomicBool::new(false),
            tx: Mutex::new(Some(tx)),
        });
        (cell, rx)
    }

    /// Attempt to resolve the cell with `terminal`.
    ///
    /// Returns `true` if this call won the claim; `false` if the cell
    /// was already resolved (the call is then a no-op).
    pub(crate) fn resolve(&self, terminal: Terminal) -> bool {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let tx = self.tx.lock().ok().and_then(|mut slot| slot.take());
        if let Some(tx) = tx {
            // The receiver only disappears if the caller's future was
            // dropped mid-flight; the outcome is then unobservable.
            let _ = tx.send(terminal);
        }
        true
    }
}

/// One-shot handle the engine fires its completion through.
///
/// The engine calls [`completed`](Self::completed) or
/// [`failed`](Self::failed) at most once; any later call (including one
/// racing a cancellation that already resolved the outcome) is a no-op
/// rather than a fault. Dropping the listener without firing either
/// callback resolves the outcome as an engine failure, so a buggy
/// backend cannot leave the caller suspended forever.
#[derive(Debug)]
pub struct CompletionListener {
    cell: Arc<OutcomeCell>,
}

impl CompletionListener {
    pub(crate) fn new(cell: Arc<OutcomeCell>) -> Self {
        Self { cell }
    }

    /// Report successful completion with the engine's result object.
    pub fn completed(&self, report: EngineReport) {
        self.cell.resolve(Terminal::Completed(report));
    }

    /// Report failure with the engine's error object.
    pub fn failed(&self, error: EngineError) {
        self.cell.resolve(Terminal::Failed(error));
    }
}

impl Drop for CompletionListener {
    fn drop(&mut self) {
        // No-op when the outcome was already claimed.
        self.cell.resolve(Terminal::Failed(EngineError::new(
            "engine released its listener without reporting a result",
        )));
    }
}
