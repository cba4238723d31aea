//! TELL mentee-to-mentor matching engine.
//!
//! Scores every (user, mentor) pair from five independent factors, persists one match record per
//! pair, and serves ranked recommendations. Bulk recomputation runs as a tracked background job.

pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
