//! clipforge-compile: request validation and domain object compilation.
//!
//! Turns a loosely-typed [`TransformRequest`](clipforge_core::TransformRequest)
//! into the strictly-typed [`CompiledGraph`] the engine consumes.
//! Validation and compilation are synchronous, side-effect-free, and
//! run entirely before any engine object exists: a request that fails
//! here never allocates native resources.

pub mod compiler;
pub mod graph;

pub use compiler::{compile, validate};
pub use graph::{
    AudioProcessor, Clipping, CompiledGraph, Effect, EncoderSettings, EngineConfig, MixMatrix,
    SourceHandle,
};
