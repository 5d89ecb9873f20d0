//! Core library for counting distinct people in a video.
//!
//! The pipeline samples frames, detects faces, gates them through a quality
//! scorer, and folds the surviving observations into an incremental cluster
//! store that deduplicates identities online. A ranker turns the final
//! cluster list into a quality-ordered, timestamp-annotated report.

pub mod clustering;
pub mod detection;
pub mod matching;
pub mod pipeline;
pub mod scoring;
pub mod shared;
pub mod video;
