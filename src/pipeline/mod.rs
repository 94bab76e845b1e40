//! Job orchestration: validate, negotiate, build, composite, finalize.
pub(crate) mod job;
pub(crate) mod opts;
