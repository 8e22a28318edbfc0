/// Headline metrics derived from the aggregated tables.
///
/// Totals of an empty window are zero. Means of an empty window are `None`
/// rather than NaN so callers must decide how to display "no data".

use crate::aggregate::{DailyOrders, RfmScore};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OrderSummary {
    pub total_orders: usize,
    pub total_revenue: f64,
}

impl OrderSummary {
    pub fn from_daily(daily: &[DailyOrders]) -> Self {
        daily.iter().fold(OrderSummary::default(), |acc, day| OrderSummary {
            total_orders: acc.total_orders + day.order_count,
            total_revenue: acc.total_revenue + day.revenue,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RfmSummary {
    pub customers: usize,
    pub avg_recency: Option<f64>,
    pub avg_frequency: Option<f64>,
    pub avg_monetary: Option<f64>,
}

impl RfmSummary {
    pub fn from_scores(scores: &[RfmScore]) -> Self {
        RfmSummary {
            customers: scores.len(),
            avg_recency: mean(scores.iter().map(|s| s.recency as f64)),
            avg_frequency: mean(scores.iter().map(|s| s.frequency as f64)),
            avg_monetary: mean(scores.iter().map(|s| s.monetary)),
        }
    }
}

/// Arithmetic mean, `None` for an empty iterator.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
