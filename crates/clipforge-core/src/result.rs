//! The fixed-shape record a successful transformation resolves with.

use serde::{Deserialize, Serialize};

/// Engine-reported metrics for a completed transformation.
///
/// Exactly these eleven fields, nothing more, so callers can rely on a
/// flat, stable shape. Numeric fields are absent when the engine could
/// not report them; the two encoder identifiers are strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// Average audio bitrate of the output, in bits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_audio_bitrate: Option<u64>,
    /// Average video bitrate of the output, in bits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_video_bitrate: Option<u64>,
    /// Output duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Output file size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    /// Number of video frames written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_frame_count: Option<u64>,
    /// Audio channel count of the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_count: Option<u32>,
    /// Audio sample rate of the output, in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    /// Output video height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Output video width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Identifier of the audio encoder the engine used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_encoder_name: Option<String>,
    /// Identifier of the video encoder the engine used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_encoder_name: Option<String>,
}
