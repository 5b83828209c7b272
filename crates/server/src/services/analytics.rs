//! Dashboard chart data.
//!
//! The series are fixed per range; nothing is computed from visits yet.

use serde::Serialize;

use shoptrail_core::AnalyticsRange;

/// One chart: parallel label and value arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSeries {
    pub labels: Vec<&'static str>,
    pub values: Vec<u32>,
}

impl AnalyticsSeries {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    /// The series for `range`.
    #[must_use]
    pub fn for_range(range: AnalyticsRange) -> Self {
        let (labels, values): (&[&'static str], &[u32]) = match range {
            AnalyticsRange::Minutes => (&["Now", "-1m", "-2m"][..], &[4, 2, 3][..]),
            AnalyticsRange::Hourly => (&["12 AM", "1 AM", "2 AM"][..], &[15, 12, 19][..]),
            AnalyticsRange::Daily => (&["Mon", "Tue", "Wed"][..], &[28, 35, 31][..]),
            AnalyticsRange::Monthly => (&["Jan", "Feb", "Mar"][..], &[120, 150, 180][..]),
            AnalyticsRange::Yearly => (&["2022", "2023", "2024"][..], &[650, 720, 810][..]),
        };
        Self {
            labels: labels.to_vec(),
            values: values.to_vec(),
        }
    }

    /// Look up a raw `range` query value; unknown or missing keys give an empty series.
    #[must_use]
    pub fn lookup(range: Option<&str>) -> Self {
        range
            .and_then(|raw| raw.parse::<AnalyticsRange>().ok())
            .map_or_else(Self::empty, Self::for_range)
    }
}
