//! Analysis over cached scans: gap synthesis and change detection.
//!
//! Everything here is pure over core types; the server decides what to
//! feed in and where the outputs land.

pub mod detect;
pub mod similarity;
pub mod synthesize;
pub mod tone;

pub use detect::detect_changes;
pub use similarity::token_similarity;
pub use synthesize::{synthesize, CorrelationData};
pub use tone::tone_score;
