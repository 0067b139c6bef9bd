//! # Logical Time
//!
//! Federation logical time is a 64-bit floating point value. The "null time"
//! sentinel of the wire format is modelled as `Option<LogicalTime>` on
//! messages, so a `LogicalTime` value is always a real point in time.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// A point on the federation's logical time axis.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct LogicalTime(pub f64);

impl LogicalTime {
    /// Time at which every federate starts.
    pub const INITIAL: LogicalTime = LogicalTime(0.0);

    /// Raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// False for NaN and infinities, which are never valid advance targets.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0.is_finite()
    }

    /// Total order used when sorting timestamped deliveries.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for LogicalTime {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// A non-negative distance on the logical time axis (used for lookahead).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct LogicalInterval(pub f64);

impl LogicalInterval {
    pub const ZERO: LogicalInterval = LogicalInterval(0.0);

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Lookahead must be finite and not negative.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}

impl From<f64> for LogicalInterval {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LogicalInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl Add<LogicalInterval> for LogicalTime {
    type Output = LogicalTime;

    fn add(self, rhs: LogicalInterval) -> LogicalTime {
        LogicalTime(self.0 + rhs.0)
    }
}
