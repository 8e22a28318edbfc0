/// HTTP request and response payloads
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::view::DateRange;

/// Query string of `GET /api/dashboard`. Missing bounds default to the
/// dataset's first and last purchase dates.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DashboardQuery {
    /// Resolve against the dataset bounds, clamping supplied dates into them.
    /// A window that misses the data entirely resolves to itself and yields
    /// an empty snapshot.
    pub fn resolve(&self, bounds: (NaiveDate, NaiveDate)) -> DateRange {
        let (min, max) = bounds;
        DateRange::new(self.start.unwrap_or(min), self.end.unwrap_or(max)).clamp_to(bounds)
    }
}

/// Body of `GET /api/bounds`
#[derive(Debug, Serialize)]
pub struct BoundsResponse {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub rows: usize,
}

/// Error body for any failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
