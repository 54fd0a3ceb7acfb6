//! The compiled object graph: engine-native objects built from a
//! validated request, ready to be handed to the engine's start
//! operation. Once a graph exists, every required field is present and
//! strictly typed; nothing downstream re-validates.

use clipforge_core::PresentationLayout;
use std::path::PathBuf;

/// Handle to the input media, with an optional clipping window.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceHandle {
    /// Input media URI. Non-empty.
    pub uri: String,
    /// Clipping window, attached only when the request carried one.
    pub clipping: Option<Clipping>,
}

/// Clipping bounds in milliseconds. Only bounds present in the request
/// are set; bounds are forwarded as-is (never swapped), range validity
/// is the engine's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clipping {
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

/// One compiled video effect. Closed set; one variant per request
/// effect tag, all fields required.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AspectRatio {
        aspect_ratio: f64,
        layout: PresentationLayout,
    },
    Resolution {
        width: u32,
        height: u32,
        layout: PresentationLayout,
    },
    Height {
        height: u32,
    },
    FrameDrop {
        target_frame_rate: f64,
    },
    ScaleRotate {
        scale_x: f32,
        scale_y: f32,
        rotation_degrees: f32,
    },
}

/// One compiled audio processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioProcessor {
    /// Channel remapping through an ordered list of mixing matrices.
    ChannelMix { matrices: Vec<MixMatrix> },
}

/// A single channel-mixing matrix. Counts are present by construction;
/// numeric validity beyond presence belongs to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixMatrix {
    pub input_channels: u16,
    pub output_channels: u16,
}

/// Encoder tuning handed to the engine's encoder factory. Absent fields
/// mean engine defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Requested average video bitrate in bits per second.
    pub video_bitrate: Option<u32>,
}

/// Top-level engine instance configuration: codec overrides plus
/// encoder settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub encoder: EncoderSettings,
}

/// Everything the engine needs for one invocation. Scoped strictly to
/// that invocation and discarded at its terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    pub source: SourceHandle,
    /// Effect chain in request order; order is semantically significant.
    pub effects: Vec<Effect>,
    /// Audio processor chain in request order.
    pub audio_processors: Vec<AudioProcessor>,
    pub config: EngineConfig,
    pub output_path: PathBuf,
}
