//! Output sinks for composited frames.

pub(crate) mod ffmpeg;
pub(crate) mod sink;
