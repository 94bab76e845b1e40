//! Scoped temporary storage for layer frame sequences.

pub(crate) mod scratch;
