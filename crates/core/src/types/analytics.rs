//! Time ranges accepted by the dashboard analytics endpoint.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a range key is not one of the known values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown analytics range: {0}")]
pub struct UnknownRange(pub String);

/// Granularity of a dashboard chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsRange {
    Minutes,
    Hourly,
    Daily,
    Monthly,
    Yearly,
}

impl AnalyticsRange {
    pub const ALL: [Self; 5] = [
        Self::Minutes,
        Self::Hourly,
        Self::Daily,
        Self::Monthly,
        Self::Yearly,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for AnalyticsRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyticsRange {
    type Err = UnknownRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| UnknownRange(s.to_owned()))
    }
}
