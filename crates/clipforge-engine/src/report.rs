//! Result translation: from the engine's opaque objects to the
//! caller-facing record and error.

use clipforge_core::{Error, TransformResult};

use crate::engine::{EngineError, EngineReport};

/// Translate an engine report into the fixed-shape result record.
///
/// Total and side-effect-free: every field is copied over, with the
/// engine's wide integers coerced into the record's non-negative
/// fields. Negative sentinel values (metric unreported) become absent.
pub fn translate(report: EngineReport) -> TransformResult {
    TransformResult {
        average_audio_bitrate: non_negative_u64(report.average_audio_bitrate),
        average_video_bitrate: non_negative_u64(report.average_video_bitrate),
        duration_ms: non_negative_u64(report.duration_ms),
        file_size_bytes: non_negative_u64(report.file_size_bytes),
        video_frame_count: non_negative_u64(report.video_frame_count),
        channel_count: non_negative_u32(report.channel_count),
        sample_rate: non_negative_u32(report.sample_rate),
        height: non_negative_u32(report.height),
        width: non_negative_u32(report.width),
        audio_encoder_name: report.audio_encoder_name,
        video_encoder_name: report.video_encoder_name,
    }
}

fn non_negative_u64(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

fn non_negative_u32(value: i32) -> Option<u32> {
    u32::try_from(value).ok()
}

impl From<EngineError> for Error {
    /// Preserve the engine's message verbatim and keep the cause chain
    /// reachable through `std::error::Error::source`.
    fn from(err: EngineError) -> Self {
        Error::Engine {
            message: err.message,
            source: err.cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn full_report_translates_field_by_field() {
        let report = EngineReport {
            average_audio_bitrate: 128_000,
            average_video_bitrate: 2_500_000,
            duration_ms: 5_000_000_000, // past u32 range; must survive
            file_size_bytes: 6_442_450_944,
            video_frame_count: 143_940,
            channel_count: 2,
            sample_rate: 48_000,
            height: 1080,
            width: 1920,
            audio_encoder_name: Some("aac".into()),
            video_encoder_name: Some("libx264".into()),
        };
        let result = translate(report);
        assert_eq!(result.average_audio_bitrate, Some(128_000));
        assert_eq!(result.average_video_bitrate, Some(2_500_000));
        assert_eq!(result.duration_ms, Some(5_000_000_000));
        assert_eq!(result.file_size_bytes, Some(6_442_450_944));
        assert_eq!(result.video_frame_count, Some(143_940));
        assert_eq!(result.channel_count, Some(2));
        assert_eq!(result.sample_rate, Some(48_000));
        assert_eq!(result.height, Some(1080));
        assert_eq!(result.width, Some(1920));
        assert_eq!(result.audio_encoder_name.as_deref(), Some("aac"));
        assert_eq!(result.video_encoder_name.as_deref(), Some("libx264"));
    }

    #[test]
    fn unreported_metrics_become_absent() {
        let result = translate(EngineReport::default());
        assert_eq!(result, TransformResult::default());
    }

    #[test]
    fn zero_is_a_reported_value() {
        let report = EngineReport {
            video_frame_count: 0,
            ..Default::default()
        };
        assert_eq!(translate(report).video_frame_count, Some(0));
    }

    #[test]
    fn engine_error_converts_with_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "SIGKILL");
        let err: Error = EngineError::with_cause("encoder died", io).into();
        assert_eq!(err.to_string(), "engine failure: encoder died");
        assert!(err.source().unwrap().to_string().contains("SIGKILL"));
    }
}
