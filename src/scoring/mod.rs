//! Score normalization: picking a primary metric out of a sample's scores
//! container and deriving a `[0, 1]` value from it.

mod coerce;
mod primary;

pub use coerce::coerce_score_bool;
pub use primary::{extract_primary_metric, PRIMARY_METRIC_PRIORITY};
