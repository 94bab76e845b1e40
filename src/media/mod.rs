//! Base video access: probing, and streaming decoded frames in timeline order.

pub(crate) mod probe;
pub(crate) mod source;
