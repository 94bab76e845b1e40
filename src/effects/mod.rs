//! Effects configuration: the JSON document, per-kind defaults, themes, and the validated
//! effect model the layer builder consumes.

pub(crate) mod defaults;
pub(crate) mod document;
pub(crate) mod model;
pub(crate) mod resolve;
pub(crate) mod theme;
