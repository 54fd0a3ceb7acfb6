//! The declarative transformation request schema.
//!
//! These types mirror the wire shape of a request: every field that the
//! compiler will later require is still optional here, because requests
//! arrive as loosely-typed key/value structures and missing fields must
//! surface as `MissingArgument` errors with a precise path, not as
//! deserialization failures. Unset optional fields are omitted on the
//! wire rather than serialized as null.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single declarative media-transformation request.
///
/// Immutable once constructed; exactly one per invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    /// The input media and its transformation chains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MediaSource>,
    /// Plain filesystem path for the output file (no URI scheme).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Optional video codec identifier override (e.g. "h264").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    /// Optional audio codec identifier override (e.g. "aac").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    /// Optional encoder tuning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoder: Option<EncoderConfig>,
}

/// The input media descriptor: where the media lives and what is done to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSource {
    /// URI of the input media. Required; checked first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Optional clipping window applied to the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipping: Option<ClippingRange>,
    /// Ordered video effect chain; order is semantically significant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub video_effects: Vec<VideoEffectSpec>,
    /// Ordered audio processor chain; order is semantically significant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio_processors: Vec<AudioProcessorSpec>,
}

/// Clipping window in milliseconds. Each bound is independently
/// optional; only bounds that are present are handed to the engine,
/// and the engine owns range validity (start <= end).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippingRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<i64>,
}

/// How presentation effects place the scaled frame in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresentationLayout {
    /// Scale to fit inside the target, letterboxing as needed.
    ScaleToFit,
    /// Scale to fill the target, cropping the overflow.
    ScaleToFitWithCrop,
    /// Stretch to the target, ignoring the source aspect ratio.
    StretchToFit,
}

impl fmt::Display for PresentationLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScaleToFit => write!(f, "scale-to-fit"),
            Self::ScaleToFitWithCrop => write!(f, "scale-to-fit-with-crop"),
            Self::StretchToFit => write!(f, "stretch-to-fit"),
        }
    }
}

/// One video effect in the chain. Internally tagged by `type`.
///
/// Each variant's fields are required once that tag is chosen, but they
/// stay optional at the schema level so the compiler can report the
/// exact missing field instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VideoEffectSpec {
    /// Presentation sized by target aspect ratio.
    #[serde(rename_all = "camelCase")]
    AspectRatio {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aspect_ratio: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layout: Option<PresentationLayout>,
    },
    /// Presentation sized by explicit output dimensions.
    #[serde(rename_all = "camelCase")]
    Resolution {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layout: Option<PresentationLayout>,
    },
    /// Presentation sized by output height, width following the source.
    #[serde(rename_all = "camelCase")]
    Height {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
    /// Drop frames down to a target frame rate.
    #[serde(rename_all = "camelCase")]
    FrameDrop {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_frame_rate: Option<f64>,
    },
    /// Scale and rotate the frame.
    #[serde(rename_all = "camelCase")]
    ScaleRotate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale_x: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale_y: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rotation_degrees: Option<f32>,
    },
}

/// One audio processor in the chain. Internally tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AudioProcessorSpec {
    /// Remap audio channels through an ordered list of mixing matrices.
    #[serde(rename_all = "camelCase")]
    ChannelMix {
        #[serde(default)]
        matrices: Vec<MixMatrixSpec>,
    },
}

/// One channel-mixing matrix. Both channel counts must be present;
/// numeric validity (non-zero, sane ranges) is the engine's concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixMatrixSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_channels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_channels: Option<u16>,
}

/// Optional encoder tuning carried through to the engine's encoder
/// factory. Absent fields mean engine defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncoderConfig {
    /// Requested average video bitrate in bits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_bitrate: Option<u32>,
}
