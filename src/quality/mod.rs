//! Water quality data model and threshold classification.

pub mod bands;
pub mod data;

pub use bands::{classify, Band, Metric};
pub use data::{Reading, Snapshot, WaterReport};
