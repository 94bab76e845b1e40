use crate::foundation::core::Canvas;
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::backend::FrameRGBA;
use crate::render::dom::{Surface, SurfaceEngine};
use anyhow::{Context as _, anyhow};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Program and arguments used to launch a driver process, e.g. `node capture.js`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl DriverCommand {
    /// Split a command line on whitespace. Quoting is not supported.
    pub fn parse(s: &str) -> CutawayResult<Self> {
        let mut parts = s.split_whitespace().map(str::to_owned);
        let program = parts
            .next()
            .ok_or_else(|| CutawayError::validation("DOM driver command is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl std::fmt::Display for DriverCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Request<'a> {
    Ping,
    Open {
        template: String,
        width: u32,
        height: u32,
    },
    Apply {
        config: &'a serde_json::Value,
    },
    Seek {
        #[serde(rename = "timeMs")]
        time_ms: f64,
    },
    Close,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Reply {
    Pong,
    Ready,
    Ok,
    Frame { data: String },
    Error { error: serde_json::Value },
}

impl Reply {
    fn name(&self) -> &'static str {
        match self {
            Reply::Pong => "pong",
            Reply::Ready => "ready",
            Reply::Ok => "ok",
            Reply::Frame { .. } => "frame",
            Reply::Error { .. } => "error",
        }
    }
}

/// One driver child process speaking line-delimited JSON over stdin/stdout.
struct DriverSession {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl DriverSession {
    fn spawn(cmd: &DriverCommand) -> anyhow::Result<Self> {
        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to spawn DOM driver '{cmd}'"))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("driver stdin not available"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("driver stdout not available"))?;
        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
        })
    }

    fn send(&mut self, req: &Request<'_>) -> anyhow::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("driver stdin already closed"))?;
        let mut msg = serde_json::to_string(req)?;
        msg.push('\n');
        stdin.write_all(msg.as_bytes())?;
        stdin.flush()?;
        Ok(())
    }

    fn call(&mut self, req: &Request<'_>) -> anyhow::Result<Reply> {
        self.send(req)?;
        let mut line = String::new();
        self.stdout.read_line(&mut line)?;
        if line.trim().is_empty() {
            return Err(anyhow!("DOM driver closed unexpectedly"));
        }
        match serde_json::from_str::<Reply>(line.trim())
            .with_context(|| format!("malformed driver reply: {}", line.trim()))?
        {
            Reply::Error { error } => {
                let msg = error
                    .as_str()
                    .map(str::to_owned)
                    .unwrap_or_else(|| error.to_string());
                Err(anyhow!("DOM driver error: {msg}"))
            }
            reply => Ok(reply),
        }
    }

    fn expect(&mut self, req: &Request<'_>, want: &'static str) -> anyhow::Result<Reply> {
        let reply = self.call(req)?;
        if reply.name() != want {
            return Err(anyhow!(
                "expected '{want}' from DOM driver, got '{}'",
                reply.name()
            ));
        }
        Ok(reply)
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        if self.stdin.is_some() {
            let _ = self.send(&Request::Close);
        }
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let status = child.wait().context("failed to wait for DOM driver")?;
            if !status.success() {
                return Err(anyhow!("DOM driver exited with status {status}"));
            }
        }
        Ok(())
    }
}

impl Drop for DriverSession {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// [`SurfaceEngine`] backed by an external driver process, one process per surface.
#[derive(Clone, Debug)]
pub struct DriverEngine {
    cmd: DriverCommand,
}

impl DriverEngine {
    pub fn new(cmd: DriverCommand) -> Self {
        Self { cmd }
    }

    pub fn command(&self) -> &DriverCommand {
        &self.cmd
    }
}

impl SurfaceEngine for DriverEngine {
    fn probe(&self) -> CutawayResult<()> {
        let run = || -> anyhow::Result<()> {
            let mut session = DriverSession::spawn(&self.cmd)?;
            session.expect(&Request::Ping, "pong")?;
            session.shutdown()
        };
        run().map_err(|e| CutawayError::renderer_unavailable(format!("{e:#}")))
    }

    fn open(&self, template: &Path, canvas: Canvas) -> CutawayResult<Box<dyn Surface>> {
        let run = || -> anyhow::Result<DriverSession> {
            let abs = std::fs::canonicalize(template)
                .with_context(|| format!("template '{}' not found", template.display()))?;
            let mut session = DriverSession::spawn(&self.cmd)?;
            session.expect(
                &Request::Open {
                    template: format!("file://{}", abs.display()),
                    width: canvas.width,
                    height: canvas.height,
                },
                "ready",
            )?;
            Ok(session)
        };
        let session = run().map_err(|e| CutawayError::renderer_unavailable(format!("{e:#}")))?;
        tracing::debug!(template = %template.display(), "driver surface opened");
        Ok(Box::new(DriverSurface { session, canvas }))
    }
}

struct DriverSurface {
    session: DriverSession,
    canvas: Canvas,
}

impl Surface for DriverSurface {
    fn apply(&mut self, config: &serde_json::Value) -> CutawayResult<()> {
        self.session.expect(&Request::Apply { config }, "ok")?;
        Ok(())
    }

    fn seek(&mut self, time_ms: f64) -> CutawayResult<FrameRGBA> {
        let Reply::Frame { data } = self.session.expect(&Request::Seek { time_ms }, "frame")?
        else {
            return Err(CutawayError::Other(anyhow!("DOM driver returned no frame")));
        };
        decode_png_frame(&data, self.canvas)
    }

    fn close(&mut self) -> CutawayResult<()> {
        self.session.shutdown()?;
        Ok(())
    }
}

/// Decode a base64 PNG snapshot into a premultiplied frame of exactly `canvas` size.
pub(crate) fn decode_png_frame(b64: &str, canvas: Canvas) -> CutawayResult<FrameRGBA> {
    use base64::{Engine as _, engine::general_purpose};

    let bytes = general_purpose::STANDARD
        .decode(b64.trim())
        .context("frame data is not valid base64")?;
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .context("frame data is not a PNG image")?;
    let mut rgba = img.to_rgba8();
    if rgba.width() != canvas.width || rgba.height() != canvas.height {
        return Err(CutawayError::Other(anyhow!(
            "snapshot is {}x{}, expected {}x{}",
            rgba.width(),
            rgba.height(),
            canvas.width,
            canvas.height
        )));
    }
    premultiply_rgba8_in_place(&mut rgba);
    FrameRGBA::from_premul(canvas.width, canvas.height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../../tests/unit/render/dom/driver.rs"]
mod tests;
