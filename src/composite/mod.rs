//! Alpha compositing of layers over the base video.

pub(crate) mod blend;
pub(crate) mod compositor;
