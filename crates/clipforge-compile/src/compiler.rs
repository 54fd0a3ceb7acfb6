//! Request validation and compilation.
//!
//! [`validate`] walks the request in a fixed check order and reports
//! the first missing required field; [`compile`] runs the same checks
//! while building the [`CompiledGraph`]. Field paths in errors use the
//! wire notation of the request schema (`videoEffects[2].targetFrameRate`).
//!
//! Presence is the only thing checked here. Semantically odd but
//! well-formed values (zero bitrate, zero channel counts, inverted
//! clipping bounds) pass through untouched; the engine owns numeric
//! validity.

use clipforge_core::{
    AudioProcessorSpec, Error, MediaSource, MixMatrixSpec, Result, TransformRequest,
    VideoEffectSpec,
};
use std::path::PathBuf;

use crate::graph::{
    AudioProcessor, Clipping, CompiledGraph, Effect, EncoderSettings, EngineConfig, MixMatrix,
    SourceHandle,
};

/// Validate a request without building anything.
///
/// Check order: source presence, `source.uri`, `outputPath`, then each
/// effect's required fields in list order, then each audio processor's
/// matrices in list order.
///
/// # Errors
///
/// Returns [`Error::MissingArgument`] naming the first missing field.
pub fn validate(request: &TransformRequest) -> Result<()> {
    let source = require_source(request)?;
    require_uri(source)?;
    require_output_path(request)?;
    for (i, effect) in source.video_effects.iter().enumerate() {
        compile_effect(i, effect)?;
    }
    for (i, processor) in source.audio_processors.iter().enumerate() {
        compile_processor(i, processor)?;
    }
    Ok(())
}

/// Compile a request into the engine object graph.
///
/// Runs the full fixed-order validation as it goes, so a successful
/// return means every required field was present; callers never
/// re-validate the graph.
///
/// # Errors
///
/// Returns [`Error::MissingArgument`] naming the first missing field.
pub fn compile(request: &TransformRequest) -> Result<CompiledGraph> {
    let source = require_source(request)?;
    let uri = require_uri(source)?;
    let output_path = require_output_path(request)?;

    let mut effects = Vec::with_capacity(source.video_effects.len());
    for (i, effect) in source.video_effects.iter().enumerate() {
        effects.push(compile_effect(i, effect)?);
    }

    let mut audio_processors = Vec::with_capacity(source.audio_processors.len());
    for (i, processor) in source.audio_processors.iter().enumerate() {
        audio_processors.push(compile_processor(i, processor)?);
    }

    Ok(CompiledGraph {
        source: SourceHandle {
            uri: uri.to_owned(),
            clipping: source.clipping.map(|range| Clipping {
                start_ms: range.start_ms,
                end_ms: range.end_ms,
            }),
        },
        effects,
        audio_processors,
        config: EngineConfig {
            video_codec: request.video_codec.clone(),
            audio_codec: request.audio_codec.clone(),
            encoder: EncoderSettings {
                video_bitrate: request.encoder.and_then(|e| e.video_bitrate),
            },
        },
        output_path: PathBuf::from(output_path),
    })
}

fn require_source(request: &TransformRequest) -> Result<&MediaSource> {
    request.source.as_ref().ok_or_else(|| Error::missing("source"))
}

fn require_uri(source: &MediaSource) -> Result<&str> {
    match source.uri.as_deref() {
        Some(uri) if !uri.is_empty() => Ok(uri),
        _ => Err(Error::missing("source.uri")),
    }
}

fn require_output_path(request: &TransformRequest) -> Result<&str> {
    match request.output_path.as_deref() {
        Some(path) if !path.is_empty() => Ok(path),
        _ => Err(Error::missing("outputPath")),
    }
}

/// Compile one effect spec. Exactly one arm per variant; the match is
/// exhaustive so adding a variant without a compiler arm fails to build.
fn compile_effect(index: usize, spec: &VideoEffectSpec) -> Result<Effect> {
    match *spec {
        VideoEffectSpec::AspectRatio {
            aspect_ratio,
            layout,
        } => Ok(Effect::AspectRatio {
            aspect_ratio: require(aspect_ratio, index, "aspectRatio")?,
            layout: require(layout, index, "layout")?,
        }),
        VideoEffectSpec::Resolution {
            width,
            height,
            layout,
        } => Ok(Effect::Resolution {
            width: require(width, index, "width")?,
            height: require(height, index, "height")?,
            layout: require(layout, index, "layout")?,
        }),
        VideoEffectSpec::Height { height } => Ok(Effect::Height {
            height: require(height, index, "height")?,
        }),
        VideoEffectSpec::FrameDrop { target_frame_rate } => Ok(Effect::FrameDrop {
            target_frame_rate: require(target_frame_rate, index, "targetFrameRate")?,
        }),
        VideoEffectSpec::ScaleRotate {
            scale_x,
            scale_y,
            rotation_degrees,
        } => Ok(Effect::ScaleRotate {
            scale_x: require(scale_x, index, "scaleX")?,
            scale_y: require(scale_y, index, "scaleY")?,
            rotation_degrees: require(rotation_degrees, index, "rotationDegrees")?,
        }),
    }
}

fn compile_processor(index: usize, spec: &AudioProcessorSpec) -> Result<AudioProcessor> {
    match spec {
        AudioProcessorSpec::ChannelMix { matrices } => {
            let mut compiled = Vec::with_capacity(matrices.len());
            for (m, matrix) in matrices.iter().enumerate() {
                compiled.push(compile_matrix(index, m, matrix)?);
            }
            Ok(AudioProcessor::ChannelMix { matrices: compiled })
        }
    }
}

fn compile_matrix(processor: usize, index: usize, spec: &MixMatrixSpec) -> Result<MixMatrix> {
    let input_channels = spec.input_channels.ok_or_else(|| {
        Error::missing(format!(
            "audioProcessors[{processor}].matrices[{index}].inputChannels"
        ))
    })?;
    let output_channels = spec.output_channels.ok_or_else(|| {
        Error::missing(format!(
            "audioProcessors[{processor}].matrices[{index}].outputChannels"
        ))
    })?;
    Ok(MixMatrix {
        input_channels,
        output_channels,
    })
}

fn require<T>(value: Option<T>, index: usize, field: &str) -> Result<T> {
    value.ok_or_else(|| Error::missing(format!("videoEffects[{index}].{field}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clipforge_core::{ClippingRange, EncoderConfig, PresentationLayout};

    fn minimal_request() -> TransformRequest {
        TransformRequest {
            source: Some(MediaSource {
                uri: Some("file:///tmp/in.mp4".into()),
                ..Default::default()
            }),
            output_path: Some("/tmp/out.mp4".into()),
            ..Default::default()
        }
    }

    fn missing_field(result: Result<CompiledGraph>) -> String {
        match result {
            Err(Error::MissingArgument { field }) => field,
            other => panic!("expected MissingArgument, got {other:?}"),
        }
    }

    #[test]
    fn minimal_request_compiles() {
        let graph = compile(&minimal_request()).unwrap();
        assert_eq!(graph.source.uri, "file:///tmp/in.mp4");
        assert_eq!(graph.source.clipping, None);
        assert!(graph.effects.is_empty());
        assert!(graph.audio_processors.is_empty());
        assert_eq!(graph.config, EngineConfig::default());
        assert_eq!(graph.output_path, PathBuf::from("/tmp/out.mp4"));
    }

    #[test]
    fn missing_source_reported_first() {
        let request = TransformRequest::default();
        assert_eq!(missing_field(compile(&request)), "source");
    }

    #[test]
    fn missing_uri() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().uri = None;
        assert_eq!(missing_field(compile(&request)), "source.uri");
    }

    #[test]
    fn empty_uri_is_missing() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().uri = Some(String::new());
        assert_eq!(missing_field(compile(&request)), "source.uri");
    }

    #[test]
    fn missing_output_path() {
        let mut request = minimal_request();
        request.output_path = None;
        assert_eq!(missing_field(compile(&request)), "outputPath");
    }

    #[test]
    fn uri_checked_before_output_path() {
        let request = TransformRequest {
            source: Some(MediaSource::default()),
            ..Default::default()
        };
        assert_eq!(missing_field(compile(&request)), "source.uri");
    }

    #[test]
    fn aspect_ratio_missing_fields() {
        let cases = [
            (
                VideoEffectSpec::AspectRatio {
                    aspect_ratio: None,
                    layout: Some(PresentationLayout::ScaleToFit),
                },
                "videoEffects[0].aspectRatio",
            ),
            (
                VideoEffectSpec::AspectRatio {
                    aspect_ratio: Some(1.78),
                    layout: None,
                },
                "videoEffects[0].layout",
            ),
        ];
        for (effect, expected) in cases {
            let mut request = minimal_request();
            request.source.as_mut().unwrap().video_effects = vec![effect];
            assert_eq!(missing_field(compile(&request)), expected);
        }
    }

    #[test]
    fn resolution_missing_fields() {
        let cases = [
            (
                VideoEffectSpec::Resolution {
                    width: None,
                    height: Some(720),
                    layout: Some(PresentationLayout::StretchToFit),
                },
                "videoEffects[0].width",
            ),
            (
                VideoEffectSpec::Resolution {
                    width: Some(1280),
                    height: None,
                    layout: Some(PresentationLayout::StretchToFit),
                },
                "videoEffects[0].height",
            ),
            (
                VideoEffectSpec::Resolution {
                    width: Some(1280),
                    height: Some(720),
                    layout: None,
                },
                "videoEffects[0].layout",
            ),
        ];
        for (effect, expected) in cases {
            let mut request = minimal_request();
            request.source.as_mut().unwrap().video_effects = vec![effect];
            assert_eq!(missing_field(compile(&request)), expected);
        }
    }

    #[test]
    fn height_missing_field() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().video_effects =
            vec![VideoEffectSpec::Height { height: None }];
        assert_eq!(missing_field(compile(&request)), "videoEffects[0].height");
    }

    #[test]
    fn frame_drop_missing_field() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().video_effects = vec![VideoEffectSpec::FrameDrop {
            target_frame_rate: None,
        }];
        assert_eq!(
            missing_field(compile(&request)),
            "videoEffects[0].targetFrameRate"
        );
    }

    #[test]
    fn scale_rotate_missing_fields() {
        let cases = [
            (None, Some(1.0), Some(0.0), "videoEffects[0].scaleX"),
            (Some(1.0), None, Some(0.0), "videoEffects[0].scaleY"),
            (
                Some(1.0),
                Some(1.0),
                None,
                "videoEffects[0].rotationDegrees",
            ),
        ];
        for (scale_x, scale_y, rotation_degrees, expected) in cases {
            let mut request = minimal_request();
            request.source.as_mut().unwrap().video_effects = vec![VideoEffectSpec::ScaleRotate {
                scale_x,
                scale_y,
                rotation_degrees,
            }];
            assert_eq!(missing_field(compile(&request)), expected);
        }
    }

    #[test]
    fn error_path_names_effect_index() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().video_effects = vec![
            VideoEffectSpec::Height { height: Some(480) },
            VideoEffectSpec::Height { height: Some(720) },
            VideoEffectSpec::FrameDrop {
                target_frame_rate: None,
            },
        ];
        assert_eq!(
            missing_field(compile(&request)),
            "videoEffects[2].targetFrameRate"
        );
    }

    #[test]
    fn effect_order_is_preserved() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().video_effects = vec![
            VideoEffectSpec::ScaleRotate {
                scale_x: Some(2.0),
                scale_y: Some(2.0),
                rotation_degrees: Some(0.0),
            },
            VideoEffectSpec::FrameDrop {
                target_frame_rate: Some(15.0),
            },
            VideoEffectSpec::Height { height: Some(480) },
        ];
        let graph = compile(&request).unwrap();
        // Scale-then-drop differs from drop-then-scale; the compiled
        // chain must be a permutation-sensitive copy of the request.
        assert_eq!(
            graph.effects,
            vec![
                Effect::ScaleRotate {
                    scale_x: 2.0,
                    scale_y: 2.0,
                    rotation_degrees: 0.0,
                },
                Effect::FrameDrop {
                    target_frame_rate: 15.0,
                },
                Effect::Height { height: 480 },
            ]
        );
    }

    #[test]
    fn clipping_fields_forwarded_exactly() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().clipping = Some(ClippingRange {
            start_ms: Some(1000),
            end_ms: Some(6000),
        });
        let graph = compile(&request).unwrap();
        assert_eq!(
            graph.source.clipping,
            Some(Clipping {
                start_ms: Some(1000),
                end_ms: Some(6000),
            })
        );
    }

    #[test]
    fn clipping_bounds_independently_optional() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().clipping = Some(ClippingRange {
            start_ms: Some(2500),
            end_ms: None,
        });
        let graph = compile(&request).unwrap();
        assert_eq!(
            graph.source.clipping,
            Some(Clipping {
                start_ms: Some(2500),
                end_ms: None,
            })
        );
    }

    #[test]
    fn inverted_clipping_is_not_swapped() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().clipping = Some(ClippingRange {
            start_ms: Some(6000),
            end_ms: Some(1000),
        });
        let graph = compile(&request).unwrap();
        let clipping = graph.source.clipping.unwrap();
        assert_eq!(clipping.start_ms, Some(6000));
        assert_eq!(clipping.end_ms, Some(1000));
    }

    #[test]
    fn channel_mix_matrices_in_order() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().audio_processors = vec![AudioProcessorSpec::ChannelMix {
            matrices: vec![
                MixMatrixSpec {
                    input_channels: Some(1),
                    output_channels: Some(2),
                },
                MixMatrixSpec {
                    input_channels: Some(2),
                    output_channels: Some(1),
                },
            ],
        }];
        let graph = compile(&request).unwrap();
        assert_eq!(
            graph.audio_processors,
            vec![AudioProcessor::ChannelMix {
                matrices: vec![
                    MixMatrix {
                        input_channels: 1,
                        output_channels: 2,
                    },
                    MixMatrix {
                        input_channels: 2,
                        output_channels: 1,
                    },
                ],
            }]
        );
    }

    #[test]
    fn matrix_missing_channel_counts() {
        let mut request = minimal_request();
        request.source.as_mut().unwrap().audio_processors = vec![AudioProcessorSpec::ChannelMix {
            matrices: vec![
                MixMatrixSpec {
                    input_channels: Some(2),
                    output_channels: Some(2),
                },
                MixMatrixSpec {
                    input_channels: None,
                    output_channels: Some(2),
                },
            ],
        }];
        assert_eq!(
            missing_field(compile(&request)),
            "audioProcessors[0].matrices[1].inputChannels"
        );

        request.source.as_mut().unwrap().audio_processors = vec![AudioProcessorSpec::ChannelMix {
            matrices: vec![MixMatrixSpec {
                input_channels: Some(2),
                output_channels: None,
            }],
        }];
        assert_eq!(
            missing_field(compile(&request)),
            "audioProcessors[0].matrices[0].outputChannels"
        );
    }

    #[test]
    fn zero_channel_counts_pass_through() {
        // Presence is validated here; numeric validity is the engine's.
        let mut request = minimal_request();
        request.source.as_mut().unwrap().audio_processors = vec![AudioProcessorSpec::ChannelMix {
            matrices: vec![MixMatrixSpec {
                input_channels: Some(0),
                output_channels: Some(0),
            }],
        }];
        assert!(compile(&request).is_ok());
    }

    #[test]
    fn codec_and_encoder_overrides_carried() {
        let mut request = minimal_request();
        request.video_codec = Some("h265".into());
        request.audio_codec = Some("aac".into());
        request.encoder = Some(EncoderConfig {
            video_bitrate: Some(4_000_000),
        });
        let graph = compile(&request).unwrap();
        assert_eq!(graph.config.video_codec.as_deref(), Some("h265"));
        assert_eq!(graph.config.audio_codec.as_deref(), Some("aac"));
        assert_eq!(graph.config.encoder.video_bitrate, Some(4_000_000));
    }

    #[test]
    fn zero_bitrate_is_not_an_error() {
        let mut request = minimal_request();
        request.encoder = Some(EncoderConfig {
            video_bitrate: Some(0),
        });
        let graph = compile(&request).unwrap();
        assert_eq!(graph.config.encoder.video_bitrate, Some(0));
    }

    #[test]
    fn validate_matches_compile() {
        let mut request = minimal_request();
        assert!(validate(&request).is_ok());

        request.source.as_mut().unwrap().video_effects = vec![VideoEffectSpec::AspectRatio {
            aspect_ratio: None,
            layout: None,
        }];
        assert_matches!(
            validate(&request),
            Err(Error::MissingArgument { field }) if field == "videoEffects[0].aspectRatio"
        );
    }
}
