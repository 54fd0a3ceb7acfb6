//! clipforge-core: shared types for the clipforge workspace.
//!
//! This crate is the foundational dependency for the other clipforge
//! crates, providing the declarative transformation request schema, the
//! fixed-shape result record, and the unified error type. It is pure
//! data plus serde; no async, no I/O.

pub mod error;
pub mod request;
pub mod result;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use request::{
    AudioProcessorSpec, ClippingRange, EncoderConfig, MediaSource, MixMatrixSpec,
    PresentationLayout, TransformRequest, VideoEffectSpec,
};
pub use result::TransformResult;
