use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{CutawayError, CutawayResult};
use std::path::{Path, PathBuf};

/// Basic metadata about the base video.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// Source path, when the video lives on disk.
    pub source_path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Expected number of frames. Decoders may deliver fewer; the compositor trusts the decoder.
    pub frame_count: u64,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

impl VideoInfo {
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.frame_count as f64 * 1000.0 * f64::from(self.fps.den) / f64::from(self.fps.num)
    }
}

/// Probe video metadata through `ffprobe`.
pub fn probe_video(source_path: &Path) -> CutawayResult<VideoInfo> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| CutawayError::composition(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(CutawayError::composition(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    let mut info = parse_probe_json(&out.stdout)?;
    info.source_path = Some(source_path.to_path_buf());
    Ok(info)
}

/// Interpret `ffprobe -show_streams -show_format` JSON output.
pub fn parse_probe_json(json: &[u8]) -> CutawayResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        avg_frame_rate: Option<String>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| CutawayError::composition(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| CutawayError::composition("no video stream found"))?;
    let width = video
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| CutawayError::composition("missing video width from ffprobe"))?;
    let height = video
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| CutawayError::composition("missing video height from ffprobe"))?;

    let fps = [video.avg_frame_rate.as_deref(), video.r_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|r| Fps::parse_ratio(r).ok())
        .ok_or_else(|| CutawayError::composition("missing or invalid video frame rate"))?;

    let frame_count = match video.nb_frames.as_deref().and_then(|n| n.parse::<u64>().ok()) {
        Some(n) if n > 0 => n,
        _ => {
            let duration_s = video
                .duration
                .as_deref()
                .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
                .and_then(|d| d.parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d >= 0.0)
                .ok_or_else(|| {
                    CutawayError::composition("ffprobe reported neither frame count nor duration")
                })?;
            fps.frames_in_ms_floor((duration_s * 1000.0).round() as u64)
        }
    };

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoInfo {
        source_path: None,
        width,
        height,
        fps,
        frame_count,
        has_audio,
    })
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
