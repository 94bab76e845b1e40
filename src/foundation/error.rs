/// Convenience result type used across cutaway.
pub type CutawayResult<T> = Result<T, CutawayError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CutawayError {
    /// Malformed or missing configuration, detected before any rendering starts.
    #[error("config validation error: {0}")]
    Validation(String),

    /// Range interpolation over a zero-width input range.
    #[error("degenerate range: input range [{in_min}, {in_max}] has zero width")]
    DegenerateRange {
        /// Lower input bound.
        in_min: f64,
        /// Upper input bound (equal to `in_min`).
        in_max: f64,
    },

    /// A rendering backend could not be initialized.
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// A single frame failed to render; fatal to its layer.
    #[error("frame render error in {effect} at frame {frame}: {message}")]
    FrameRender {
        /// Effect instance label, e.g. `keyPhrases[2]`.
        effect: String,
        /// Frame index within the effect's timing grid.
        frame: u64,
        /// Backend-provided cause.
        message: String,
    },

    /// Base video unreadable or output encode failure.
    #[error("composition error: {0}")]
    Composition(String),

    /// The job was cancelled through its cancellation token.
    #[error("job cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CutawayError {
    /// Build a [`CutawayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CutawayError::RendererUnavailable`] value.
    pub fn renderer_unavailable(msg: impl Into<String>) -> Self {
        Self::RendererUnavailable(msg.into())
    }

    /// Build a [`CutawayError::FrameRender`] value.
    pub fn frame_render(effect: impl Into<String>, frame: u64, msg: impl Into<String>) -> Self {
        Self::FrameRender {
            effect: effect.into(),
            frame,
            message: msg.into(),
        }
    }

    /// Build a [`CutawayError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`CutawayError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
