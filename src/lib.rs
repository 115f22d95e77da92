pub mod analyzers;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod reading;
pub mod season;
pub mod stats;
