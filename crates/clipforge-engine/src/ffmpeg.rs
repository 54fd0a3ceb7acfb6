//! Ffmpeg-CLI-backed [`Engine`] implementation.
//!
//! Renders the compiled object graph to an ffmpeg argument list, spawns
//! ffmpeg with `tokio::process`, and delivers exactly one listener
//! event from a supervising task. Cancellation kills the child process.
//! After a successful run the output file is probed with
//! `ffprobe -print_format json -show_format -show_streams` to fill the
//! [`EngineReport`]; metrics that cannot be probed stay unreported.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use clipforge_compile::{AudioProcessor, CompiledGraph, Effect};
use clipforge_core::{Error, PresentationLayout, Result};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::engine::{CompletionListener, Engine, EngineError, EngineJob, EngineReport};

/// Paths to the external tools the engine shells out to.
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// Path to the ffmpeg binary.
    pub ffmpeg_path: PathBuf,
    /// Path to the ffprobe binary; without it the report carries only
    /// the output file size.
    pub ffprobe_path: Option<PathBuf>,
}

/// An [`Engine`] that shells out to the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    config: FfmpegConfig,
}

impl FfmpegEngine {
    /// Create an engine with explicit tool paths.
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Create an engine by locating ffmpeg (and, if present, ffprobe)
    /// on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if ffmpeg is not found.
    pub fn from_path() -> Result<Self> {
        let ffmpeg_path = which::which("ffmpeg")
            .map_err(|e| Error::engine_with_cause("ffmpeg not found on PATH", e))?;
        let ffprobe_path = which::which("ffprobe").ok();
        Ok(Self {
            config: FfmpegConfig {
                ffmpeg_path,
                ffprobe_path,
            },
        })
    }
}

impl Engine for FfmpegEngine {
    type Job = FfmpegJob;

    fn start(&self, graph: CompiledGraph, listener: CompletionListener) -> Result<FfmpegJob> {
        let args = render_args(&graph);
        tracing::debug!(args = ?args, "spawning ffmpeg");

        let mut cmd = Command::new(&self.config.ffmpeg_path);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::engine_with_cause("failed to spawn ffmpeg", e))?;

        let token = CancellationToken::new();
        let supervise_token = token.clone();
        let ffprobe_path = self.config.ffprobe_path.clone();
        let output_path = graph.output_path.clone();

        tokio::spawn(async move {
            let stderr = child.stderr.take();
            // Drain stderr concurrently so ffmpeg never blocks on a
            // full pipe.
            let stderr_task = tokio::spawn(async move {
                let mut buf = String::new();
                if let Some(mut stderr) = stderr {
                    let _ = stderr.read_to_string(&mut buf).await;
                }
                buf
            });

            tokio::select! {
                status = child.wait() => {
                    let stderr_text = stderr_task.await.unwrap_or_default();
                    match status {
                        Ok(status) if status.success() => {
                            let report = probe_output(ffprobe_path.as_deref(), &output_path).await;
                            listener.completed(report);
                        }
                        Ok(status) => {
                            listener.failed(EngineError::new(format!(
                                "ffmpeg exited with {status}: {}",
                                stderr_text.trim()
                            )));
                        }
                        Err(e) => {
                            listener.failed(EngineError::with_cause(
                                "i/o error waiting for ffmpeg",
                                e,
                            ));
                        }
                    }
                }
                _ = supervise_token.cancelled() => {
                    tracing::debug!("killing ffmpeg after cancellation");
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    // The adapter already owns the cancelled outcome;
                    // there is nothing to deliver.
                }
            }
        });

        Ok(FfmpegJob { token })
    }
}

/// Handle to a running ffmpeg child.
pub struct FfmpegJob {
    token: CancellationToken,
}

impl EngineJob for FfmpegJob {
    fn cancel(&mut self) {
        self.token.cancel();
    }
}

/// Render the compiled graph to an ffmpeg argument list.
///
/// Clipping bounds go before `-i` (input seeking); the effect chain
/// becomes a `-vf` filter list in request order.
fn render_args(graph: &CompiledGraph) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-nostdin".into()];

    if let Some(clipping) = graph.source.clipping {
        if let Some(start_ms) = clipping.start_ms {
            args.push("-ss".into());
            args.push(format_seconds(start_ms));
        }
        if let Some(end_ms) = clipping.end_ms {
            args.push("-to".into());
            args.push(format_seconds(end_ms));
        }
    }

    args.push("-i".into());
    args.push(graph.source.uri.clone());

    if let Some(filters) = video_filters(&graph.effects) {
        args.push("-vf".into());
        args.push(filters);
    }

    if let Some(codec) = graph.config.video_codec.as_deref() {
        args.push("-c:v".into());
        args.push(video_encoder_for(codec).into());
    }
    if let Some(bitrate) = graph.config.encoder.video_bitrate {
        args.push("-b:v".into());
        args.push(bitrate.to_string());
    }

    if let Some(codec) = graph.config.audio_codec.as_deref() {
        args.push("-c:a".into());
        args.push(audio_encoder_for(codec).into());
    }
    if let Some(channels) = output_channel_count(&graph.audio_processors) {
        args.push("-ac".into());
        args.push(channels.to_string());
    }

    args.push(graph.output_path.to_string_lossy().into_owned());
    args
}

/// Milliseconds to an ffmpeg time value in seconds.
fn format_seconds(ms: i64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

/// Build the `-vf` filter chain, preserving effect order exactly.
fn video_filters(effects: &[Effect]) -> Option<String> {
    if effects.is_empty() {
        return None;
    }
    let filters: Vec<String> = effects.iter().map(effect_filter).collect();
    Some(filters.join(","))
}

fn effect_filter(effect: &Effect) -> String {
    match *effect {
        Effect::AspectRatio {
            aspect_ratio,
            layout,
        } => match layout {
            PresentationLayout::ScaleToFit => format!(
                "pad=max(iw\\,ih*{aspect_ratio}):max(ih\\,iw/{aspect_ratio}):(ow-iw)/2:(oh-ih)/2"
            ),
            PresentationLayout::ScaleToFitWithCrop => format!(
                "crop=min(iw\\,ih*{aspect_ratio}):min(ih\\,iw/{aspect_ratio})"
            ),
            PresentationLayout::StretchToFit => format!("scale=ih*{aspect_ratio}:ih"),
        },
        Effect::Resolution {
            width,
            height,
            layout,
        } => match layout {
            PresentationLayout::ScaleToFit => format!(
                "scale={width}:{height}:force_original_aspect_ratio=decrease,\
                 pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"
            ),
            PresentationLayout::ScaleToFitWithCrop => format!(
                "scale={width}:{height}:force_original_aspect_ratio=increase,\
                 crop={width}:{height}"
            ),
            PresentationLayout::StretchToFit => format!("scale={width}:{height}"),
        },
        Effect::Height { height } => format!("scale=-2:{height}"),
        Effect::FrameDrop { target_frame_rate } => format!("fps={target_frame_rate}"),
        Effect::ScaleRotate {
            scale_x,
            scale_y,
            rotation_degrees,
        } => format!("scale=iw*{scale_x}:ih*{scale_y},rotate={rotation_degrees}*PI/180"),
    }
}

/// The channel count the chain ends on: the last mixing matrix's
/// output. Per-coefficient mixing is not expressible through `-ac`;
/// the final width is.
fn output_channel_count(processors: &[AudioProcessor]) -> Option<u16> {
    processors.iter().rev().find_map(|p| match p {
        AudioProcessor::ChannelMix { matrices } => matrices.last().map(|m| m.output_channels),
    })
}

/// Map a codec identifier to the ffmpeg encoder name.
fn video_encoder_for(codec: &str) -> &str {
    match codec {
        "h264" | "avc" => "libx264",
        "h265" | "hevc" => "libx265",
        "vp9" => "libvpx-vp9",
        "av1" => "libaom-av1",
        other => other,
    }
}

fn audio_encoder_for(codec: &str) -> &str {
    match codec {
        "opus" => "libopus",
        "vorbis" => "libvorbis",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Output probing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    channels: Option<i32>,
    sample_rate: Option<String>,
    bit_rate: Option<String>,
    nb_frames: Option<String>,
}

/// Probe the finished output and assemble the engine report. Probing
/// is best-effort: anything that cannot be read stays unreported.
async fn probe_output(ffprobe_path: Option<&Path>, output: &Path) -> EngineReport {
    let mut report = EngineReport::default();

    if let Ok(meta) = tokio::fs::metadata(output).await {
        report.file_size_bytes = meta.len() as i64;
    }

    let Some(ffprobe_path) = ffprobe_path else {
        return report;
    };

    let result = Command::new(ffprobe_path)
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(output)
        .stdin(Stdio::null())
        .output()
        .await;

    let output_bytes = match result {
        Ok(out) if out.status.success() => out.stdout,
        Ok(out) => {
            tracing::warn!(status = %out.status, "ffprobe failed; report will be partial");
            return report;
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not run ffprobe; report will be partial");
            return report;
        }
    };

    let parsed: FfprobeOutput = match serde_json::from_slice(&output_bytes) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "ffprobe output did not parse; report will be partial");
            return report;
        }
    };

    if let Some(format) = parsed.format {
        if let Some(duration) = format.duration.and_then(|d| d.parse::<f64>().ok()) {
            report.duration_ms = (duration * 1000.0).round() as i64;
        }
        if let Some(size) = format.size.and_then(|s| s.parse::<i64>().ok()) {
            report.file_size_bytes = size;
        }
    }

    for stream in parsed.streams {
        match stream.codec_type.as_deref() {
            Some("video") => {
                report.width = stream.width.unwrap_or(-1);
                report.height = stream.height.unwrap_or(-1);
                report.video_encoder_name = stream.codec_name;
                if let Some(frames) = stream.nb_frames.and_then(|f| f.parse::<i64>().ok()) {
                    report.video_frame_count = frames;
                }
                if let Some(rate) = stream.bit_rate.and_then(|b| b.parse::<i64>().ok()) {
                    report.average_video_bitrate = rate;
                }
            }
            Some("audio") => {
                report.channel_count = stream.channels.unwrap_or(-1);
                report.audio_encoder_name = stream.codec_name;
                if let Some(rate) = stream.sample_rate.and_then(|r| r.parse::<i32>().ok()) {
                    report.sample_rate = rate;
                }
                if let Some(rate) = stream.bit_rate.and_then(|b| b.parse::<i64>().ok()) {
                    report.average_audio_bitrate = rate;
                }
            }
            _ => {}
        }
    }

    report
}
