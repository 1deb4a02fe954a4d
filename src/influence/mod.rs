//! Influence strategies and winner extraction.
//!
//! Used by conquest resolution on islands and by professor assignment.

pub mod calculator;
pub mod extractor;
pub mod professor;

pub use calculator::{base_influence, compute_influence, Influence, InfluenceModifier};
pub use extractor::MaxExtractor;
pub use professor::hall_scores;
