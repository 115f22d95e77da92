//! Error types for the analysis core.

use thiserror::Error;

use crate::season::Season;

/// Errors surfaced by the statistics and judging code.
///
/// Windows without enough history are not errors; they show up as `None`
/// fields on [`crate::stats::EnrichedReading`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// No historical readings exist for the season of the live observation.
    #[error("no seasonal history for {city} in {season}")]
    MissingSeasonalData { city: String, season: Season },

    /// The seasonal group exists but is too small to have a standard deviation.
    #[error("seasonal baseline for {city} in {season} is undefined ({count} reading(s))")]
    UndefinedBaseline {
        city: String,
        season: Season,
        count: usize,
    },

    /// Malformed or out-of-order readings.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Type alias for Results using [`AnalysisError`]
pub type Result<T> = std::result::Result<T, AnalysisError>;
