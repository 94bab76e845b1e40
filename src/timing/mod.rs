//! Time windows and the frame grid every layer is sampled on.

pub(crate) mod grid;
pub(crate) mod window;
