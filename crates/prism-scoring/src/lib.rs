//! prism-scoring — Personality scoring engine.
//! Answers → function strengths → type prototype shares → ranked profile.

pub mod key;
pub mod normalise;
pub mod answers;
pub mod aggregate;
pub mod classify;
pub mod assemble;
pub mod engine;
pub mod fc_tally;

pub use engine::{score_assessment, ScoreInput};
pub use assemble::{Profile, RankedType, ScoreResult};
