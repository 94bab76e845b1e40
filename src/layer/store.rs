use crate::foundation::error::{CutawayError, CutawayResult};
use crate::lifecycle::scratch::ScratchArea;
use crate::render::backend::{Frame, FrameRGBA};
use std::io::{Read, Write};
use std::path::PathBuf;

/// Ordered frame sequence persisted as raw premultiplied RGBA in a [`ScratchArea`].
///
/// Frames are appended strictly in index order (`0, 1, 2, ..`), so the store can only ever
/// describe a gap-free prefix of the timing grid.
#[derive(Debug)]
pub struct FrameStore {
    area: ScratchArea,
    width: u32,
    height: u32,
    len: u64,
}

impl FrameStore {
    pub fn new(area: ScratchArea, width: u32, height: u32) -> Self {
        Self {
            area,
            width,
            height,
            len: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn frame_path(&self, index: u64) -> PathBuf {
        self.area.path().join(format!("frame_{index:05}.rgba"))
    }

    fn frame_bytes(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    pub fn push(&mut self, frame: &Frame) -> CutawayResult<()> {
        use anyhow::Context as _;

        if frame.index.0 != self.len {
            return Err(CutawayError::validation(format!(
                "frame store for {} expected frame {}, got {}",
                self.area.label(),
                self.len,
                frame.index.0
            )));
        }
        if frame.pixels.width != self.width
            || frame.pixels.height != self.height
            || frame.pixels.data.len() != self.frame_bytes()
        {
            return Err(CutawayError::validation(format!(
                "frame size mismatch in {}: got {}x{}, expected {}x{}",
                self.area.label(),
                frame.pixels.width,
                frame.pixels.height,
                self.width,
                self.height
            )));
        }

        let path = self.frame_path(frame.index.0);
        let mut file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        file.write_all(&frame.pixels.data)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        self.len += 1;
        Ok(())
    }

    /// Read frame `index` into `buf`, resizing it as needed. Returns `false` when the index is
    /// past the end of the sequence.
    pub fn read_into(&self, index: u64, buf: &mut Vec<u8>) -> CutawayResult<bool> {
        use anyhow::Context as _;

        if index >= self.len {
            return Ok(false);
        }
        let path = self.frame_path(index);
        buf.resize(self.frame_bytes(), 0);
        let mut file = std::fs::File::open(&path)
            .with_context(|| format!("failed to open '{}'", path.display()))?;
        file.read_exact(buf)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Ok(true)
    }

    pub fn get(&self, index: u64) -> CutawayResult<Option<FrameRGBA>> {
        let mut buf = Vec::new();
        if !self.read_into(index, &mut buf)? {
            return Ok(None);
        }
        FrameRGBA::from_premul(self.width, self.height, buf).map(Some)
    }

    /// Give back the backing area so it can be released.
    pub fn into_area(self) -> ScratchArea {
        self.area
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/store.rs"]
mod tests;
