//! Temporal enrichment: column detection and derived grouping columns.
//!
//! The detector ([`detect`]) walks each column and classifies it as raw or
//! temporal using a permissive per-value parse; the generator ([`derive`])
//! rewrites temporal columns into their parsed form and appends
//! year/month-bucket/day grouping columns, registering their names for default
//! display suppression.

pub mod derive;
pub mod detect;

pub use derive::{enrich, DAY_SUFFIX, MONTH_SUFFIX, YEAR_SUFFIX};
pub use detect::{classify, parse_temporal, DetectionOptions};
