use crate::foundation::error::{CutawayError, CutawayResult};

/// How a time window ends: at an absolute timeline position or after a length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WindowEnd {
    /// Absolute end in milliseconds; must be `>= start_ms`.
    EndMs(u64),
    /// Length in milliseconds; must be `> 0`.
    DurationMs(u64),
}

/// A time window as authored in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeWindow {
    pub start_ms: u64,
    pub end: WindowEnd,
}

impl TimeWindow {
    pub fn until(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end: WindowEnd::EndMs(end_ms),
        }
    }

    pub fn lasting(start_ms: u64, duration_ms: u64) -> Self {
        Self {
            start_ms,
            end: WindowEnd::DurationMs(duration_ms),
        }
    }

    /// Canonical `(start, duration)` form used by everything downstream of validation.
    pub fn normalize(self) -> CutawayResult<Span> {
        let duration_ms = match self.end {
            WindowEnd::EndMs(end_ms) => {
                if end_ms < self.start_ms {
                    return Err(CutawayError::validation(format!(
                        "endMs ({end_ms}) must be >= startMs ({})",
                        self.start_ms
                    )));
                }
                end_ms - self.start_ms
            }
            WindowEnd::DurationMs(0) => {
                return Err(CutawayError::validation("durationMs must be > 0"));
            }
            WindowEnd::DurationMs(d) => d,
        };
        if self.start_ms.checked_add(duration_ms).is_none() {
            return Err(CutawayError::validation("time window end overflows"));
        }
        Ok(Span {
            start_ms: self.start_ms,
            duration_ms,
        })
    }
}

/// Normalized half-open interval `[start_ms, start_ms + duration_ms)` on the master timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl Span {
    pub fn end_ms(self) -> u64 {
        self.start_ms + self.duration_ms
    }

    pub fn is_empty(self) -> bool {
        self.duration_ms == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/window.rs"]
mod tests;
