//! clipforge-engine: the engine boundary and asynchronous execution adapter.
//!
//! The underlying transcoding engine exposes a builder + one-shot
//! listener API: one engine job per invocation, and exactly one of a
//! success or failure callback. This crate re-expresses that as a
//! single-resolution async operation:
//!
//! - [`Engine`] / [`EngineJob`] are the traits an engine backend
//!   implements; [`CompletionListener`] is the one-shot handle the
//!   adapter wires into it.
//! - [`Transformer`] compiles a request, starts the engine, and
//!   suspends until the single terminal outcome (success, engine
//!   failure, or cancellation). Cancellation is cooperative and always
//!   wins once it claims the outcome.
//! - [`translate`](report::translate) maps the engine's wide-integer
//!   report into the caller-facing [`TransformResult`].
//!
//! The `ffmpeg` feature (default) provides a real [`Engine`] backed by
//! the ffmpeg CLI.

pub mod engine;
pub mod report;
mod transformer;

#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;

// Re-exports
pub use engine::{CompletionListener, Engine, EngineError, EngineJob, EngineReport};
pub use report::translate;
pub use transformer::Transformer;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{FfmpegConfig, FfmpegEngine};

pub use clipforge_core::{Error, Result, TransformRequest, TransformResult};
