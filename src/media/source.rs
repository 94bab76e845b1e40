use crate::foundation::error::{CutawayError, CutawayResult};
use crate::media::probe::VideoInfo;
use crate::render::backend::FrameRGBA;
use std::collections::VecDeque;
use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

/// Read-only, forward-only stream of base video frames.
///
/// Frames are opaque or premultiplied RGBA8 and arrive in timeline order.
pub trait BaseFrameSource: Send {
    fn info(&self) -> &VideoInfo;

    /// Next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> CutawayResult<Option<FrameRGBA>>;

    /// Release decoder resources. Called once after the last frame was read or on failure.
    fn finish(&mut self) -> CutawayResult<()> {
        Ok(())
    }
}

/// Base video held in memory, for tests and synthetic inputs.
#[derive(Debug)]
pub struct InMemorySource {
    info: VideoInfo,
    frames: VecDeque<FrameRGBA>,
}

impl InMemorySource {
    pub fn new(info: VideoInfo, frames: Vec<FrameRGBA>) -> CutawayResult<Self> {
        for f in &frames {
            if f.width != info.width || f.height != info.height {
                return Err(CutawayError::validation(format!(
                    "in-memory frame is {}x{}, video is {}x{}",
                    f.width, f.height, info.width, info.height
                )));
            }
        }
        let info = VideoInfo {
            frame_count: frames.len() as u64,
            ..info
        };
        Ok(Self {
            info,
            frames: frames.into(),
        })
    }
}

impl BaseFrameSource for InMemorySource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> CutawayResult<Option<FrameRGBA>> {
        Ok(self.frames.pop_front())
    }
}

/// Streams decoded frames from one long-lived `ffmpeg` process.
pub struct FfmpegFrameReader {
    info: VideoInfo,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
}

impl FfmpegFrameReader {
    /// Spawn the decoder for `info.source_path`.
    pub fn open(info: VideoInfo) -> CutawayResult<Self> {
        let path = info
            .source_path
            .clone()
            .ok_or_else(|| CutawayError::composition("base video has no source path"))?;
        let frame_len = info.canvas().byte_len();
        if frame_len == 0 {
            return Err(CutawayError::composition(
                "decoded video frame size is zero (invalid source dimensions)",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(&path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CutawayError::composition(format!("failed to run ffmpeg for video decode: {e}"))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CutawayError::composition("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| CutawayError::composition("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::debug!(path = %path.display(), "base video decoder started");
        Ok(Self {
            info,
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            frame_len,
        })
    }

    fn collect_stderr(&mut self) -> String {
        match self.stderr_drain.take().map(|h| h.join()) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
            _ => String::new(),
        }
    }
}

impl BaseFrameSource for FfmpegFrameReader {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> CutawayResult<Option<FrameRGBA>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };
        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0;
        while filled < buf.len() {
            let n = stdout.read(&mut buf[filled..]).map_err(|e| {
                CutawayError::composition(format!("failed to read decoded frame: {e}"))
            })?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            self.stdout = None;
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(CutawayError::composition(format!(
                "truncated frame from decoder: got {filled} of {} bytes",
                buf.len()
            )));
        }
        FrameRGBA::from_premul(self.info.width, self.info.height, buf).map(Some)
    }

    fn finish(&mut self) -> CutawayResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|e| {
            CutawayError::composition(format!("failed to wait for ffmpeg decoder: {e}"))
        })?;
        let stderr = self.collect_stderr();
        if !status.success() {
            return Err(CutawayError::composition(format!(
                "ffmpeg decoder exited with status {status}: {stderr}"
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegFrameReader {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
