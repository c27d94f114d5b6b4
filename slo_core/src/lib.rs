pub mod error;
pub mod measurement;

pub use error::{Result, SloError};
pub use measurement::{BucketCounts, EventSum, NO_DATA};
