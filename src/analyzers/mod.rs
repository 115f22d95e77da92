//! Seasonal aggregation and live-reading classification.
//!
//! This module groups historical readings by season, summarizes them, and
//! judges a live temperature against the ±2σ band of its season.

pub mod aggregate;
pub mod analyzer;
pub mod describe;
pub mod judge;
pub mod types;
pub mod utility;
