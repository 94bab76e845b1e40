use crate::foundation::core::{Fps, FrameIndex};

/// `floor(duration_ms / 1000 * fps)`; zero for a zero-length duration.
pub fn frame_count(duration_ms: u64, fps: Fps) -> u64 {
    fps.frames_in_ms_floor(duration_ms)
}

/// One sample point on a layer's frame grid.
///
/// Only the index is stored; `time_ms` is always derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleInstant {
    pub frame: FrameIndex,
    pub fps: Fps,
}

impl SampleInstant {
    /// Milliseconds since the start of the layer.
    pub fn time_ms(self) -> f64 {
        self.fps.frame_time_ms(self.frame)
    }

    /// Fractional frame position, as animation curves consume it.
    pub fn frame_f64(self) -> f64 {
        self.frame.0 as f64
    }
}

/// Deterministic grid of sample instants covering a duration at a frame rate.
///
/// The grid is a value: iterating it twice yields the same instants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingGrid {
    fps: Fps,
    len: u64,
}

impl TimingGrid {
    pub fn new(duration_ms: u64, fps: Fps) -> Self {
        Self {
            fps,
            len: frame_count(duration_ms, fps),
        }
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn instant(&self, frame: u64) -> Option<SampleInstant> {
        (frame < self.len).then_some(SampleInstant {
            frame: FrameIndex(frame),
            fps: self.fps,
        })
    }

    pub fn iter(&self) -> SampleInstants {
        SampleInstants {
            fps: self.fps,
            next: 0,
            end: self.len,
        }
    }
}

impl IntoIterator for &TimingGrid {
    type Item = SampleInstant;
    type IntoIter = SampleInstants;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a [`TimingGrid`].
#[derive(Clone, Debug)]
pub struct SampleInstants {
    fps: Fps,
    next: u64,
    end: u64,
}

impl Iterator for SampleInstants {
    type Item = SampleInstant;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let out = SampleInstant {
            frame: FrameIndex(self.next),
            fps: self.fps,
        };
        self.next += 1;
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

impl ExactSizeIterator for SampleInstants {}

#[cfg(test)]
#[path = "../../tests/unit/timing/grid.rs"]
mod tests;
