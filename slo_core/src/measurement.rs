use serde::{Deserialize, Serialize};

/// Value handed to the SLO engine when a window holds no usable data.
pub const NO_DATA: i64 = -1;

/// Good and bad event counts for one measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BucketCounts {
    Counts { good: u64, bad: u64 },
    NoData,
}

impl BucketCounts {
    pub fn new(good: u64, bad: u64) -> Self {
        Self::Counts { good, bad }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, BucketCounts::NoData)
    }

    pub fn good(&self) -> Option<u64> {
        match self {
            BucketCounts::Counts { good, .. } => Some(*good),
            BucketCounts::NoData => None,
        }
    }

    pub fn bad(&self) -> Option<u64> {
        match self {
            BucketCounts::Counts { bad, .. } => Some(*bad),
            BucketCounts::NoData => None,
        }
    }

    pub fn total(&self) -> Option<u64> {
        match self {
            BucketCounts::Counts { good, bad } => Some(good + bad),
            BucketCounts::NoData => None,
        }
    }

    /// Ratio of good events to all events. `None` when there is nothing to divide by.
    pub fn sli(&self) -> Option<f64> {
        match self {
            BucketCounts::Counts { good, bad } if good + bad > 0 => {
                Some(*good as f64 / (good + bad) as f64)
            }
            _ => None,
        }
    }

    /// The `(good, bad)` pair as the SLO engine expects it.
    pub fn contract_pair(&self) -> (i64, i64) {
        match self {
            BucketCounts::Counts { good, bad } => (clamp(*good), clamp(*bad)),
            BucketCounts::NoData => (NO_DATA, NO_DATA),
        }
    }

    /// Same counts with good and bad exchanged. `NoData` stays `NoData`.
    pub fn swapped(self) -> Self {
        match self {
            BucketCounts::Counts { good, bad } => BucketCounts::Counts {
                good: bad,
                bad: good,
            },
            BucketCounts::NoData => BucketCounts::NoData,
        }
    }
}

fn clamp(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Sum of counter-style values over a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventSum {
    Sum { total: f64 },
    NoData,
}

impl EventSum {
    pub fn is_no_data(&self) -> bool {
        matches!(self, EventSum::NoData)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            EventSum::Sum { total } => Some(*total),
            EventSum::NoData => None,
        }
    }

    pub fn contract_value(&self) -> f64 {
        match self {
            EventSum::Sum { total } => *total,
            EventSum::NoData => NO_DATA as f64,
        }
    }
}
