//! Report output modules.
//!
//! The pipeline's only artifact is the aggregate JSON report; [`json`]
//! owns serializing and writing it. Presentation documents (dashboards,
//! editorial reports) are produced by downstream tooling from that file.

pub mod json;
