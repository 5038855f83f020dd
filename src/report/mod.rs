//! Findings produced by a signature check, and their aggregation into a report

mod finding;
mod sorted;

pub use finding::*;
pub use sorted::*;
