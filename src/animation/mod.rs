//! Stateless animation curves sampled per frame.
//!
//! Every function here is a closed form of its inputs: sampling frame 500 never requires
//! sampling frames 0..499 first, so any seek point yields the same value.

pub(crate) mod ease;
pub(crate) mod interpolate;
pub(crate) mod spring;
