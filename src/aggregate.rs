/// MartDash Aggregators
///
/// Five independent, single-pass aggregations over filtered order lines.
/// Each one is a pure function of its input slice: an empty slice yields an
/// empty result, and running it twice yields identical output.

use crate::group::{group_by, DistinctCount, GroupKey};
use crate::record::OrderLine;
use chrono::NaiveDate;
use serde::Serialize;

/// Orders and revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOrders {
    pub date: NaiveDate,
    /// Distinct `order_id` values purchased that day
    pub order_count: usize,
    /// Sum of `payment_value` over every line that day
    pub revenue: f64,
}

/// Distinct products sold under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRank {
    pub category: GroupKey,
    pub product_count: usize,
}

/// Distinct customers in one city or state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoCount {
    pub name: GroupKey,
    pub customer_count: usize,
}

/// Recency, frequency and monetary value of one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmScore {
    pub customer_id: String,
    /// Distinct orders placed
    pub frequency: usize,
    /// Total payment value
    pub monetary: f64,
    /// Whole days between the customer's latest purchase and the reference date
    pub recency: i64,
}

#[derive(Default)]
struct DayTotals<'a> {
    orders: DistinctCount<'a>,
    revenue: f64,
}

#[derive(Default)]
struct CustomerTotals<'a> {
    orders: DistinctCount<'a>,
    monetary: f64,
    last_purchase: Option<NaiveDate>,
}

/// Daily order volume, chronological, one row per day that has data.
///
/// Days without purchases are not filled in.
///
/// ```
/// use martdash::{daily_orders, parse_timestamp, OrderLine};
///
/// let ts = parse_timestamp("2023-01-01 09:30:00").unwrap();
/// let rows = vec![
///     OrderLine::new("o1", "A", ts).with_payment(50.0),
///     OrderLine::new("o1", "A", ts).with_payment(30.0),
/// ];
/// let daily = daily_orders(&rows);
/// assert_eq!(daily.len(), 1);
/// assert_eq!(daily[0].order_count, 1);
/// assert_eq!(daily[0].revenue, 80.0);
/// ```
pub fn daily_orders<'a>(rows: &'a [OrderLine]) -> Vec<DailyOrders> {
    group_by(
        rows,
        |row: &'a OrderLine| row.purchase_date(),
        |totals: &mut DayTotals<'a>, row: &'a OrderLine| {
            totals.orders.insert(Some(row.order_id.as_str()));
            totals.revenue += row.payment();
        },
    )
    .into_iter()
    .map(|(date, totals)| DailyOrders {
        date,
        order_count: totals.orders.len(),
        revenue: totals.revenue,
    })
    .collect()
}

/// Distinct products per category, ranked by count descending.
///
/// Ties keep ascending category order, with the missing-category group last.
pub fn category_ranking<'a>(rows: &'a [OrderLine]) -> Vec<CategoryRank> {
    let mut ranking: Vec<CategoryRank> = group_by(
        rows,
        |row: &'a OrderLine| GroupKey::from_option(row.product_category_name.as_deref()),
        |products: &mut DistinctCount<'a>, row: &'a OrderLine| {
            products.insert(row.product_id.as_deref());
        },
    )
    .into_iter()
    .map(|(category, products)| CategoryRank {
        category,
        product_count: products.len(),
    })
    .collect();

    // stable: equal counts stay in key order
    ranking.sort_by(|a, b| b.product_count.cmp(&a.product_count));
    ranking
}

fn customers_by<'a, F>(rows: &'a [OrderLine], key: F) -> Vec<GeoCount>
where
    F: Fn(&'a OrderLine) -> Option<&'a str>,
{
    group_by(
        rows,
        |row: &'a OrderLine| GroupKey::from_option(key(row)),
        |customers: &mut DistinctCount<'a>, row: &'a OrderLine| {
            customers.insert(Some(row.customer_id.as_str()));
        },
    )
    .into_iter()
    .map(|(name, customers)| GeoCount {
        name,
        customer_count: customers.len(),
    })
    .collect()
}

/// Distinct customers per city, in ascending city order (missing last).
pub fn customers_by_city(rows: &[OrderLine]) -> Vec<GeoCount> {
    customers_by(rows, |row| row.customer_city.as_deref())
}

/// Distinct customers per state, in ascending state order (missing last).
pub fn customers_by_state(rows: &[OrderLine]) -> Vec<GeoCount> {
    customers_by(rows, |row| row.customer_state.as_deref())
}

/// Latest purchase date in `rows`: the anchor recency is measured from.
pub fn reference_date(rows: &[OrderLine]) -> Option<NaiveDate> {
    rows.iter().map(OrderLine::purchase_date).max()
}

/// Per-customer RFM scores in ascending `customer_id` order.
///
/// Recency is measured against [`reference_date`] of the same rows, so it
/// always reflects the active window rather than the whole dataset.
pub fn rfm<'a>(rows: &'a [OrderLine]) -> Vec<RfmScore> {
    let Some(reference) = reference_date(rows) else {
        return Vec::new();
    };

    group_by(
        rows,
        |row: &'a OrderLine| row.customer_id.as_str(),
        |totals: &mut CustomerTotals<'a>, row: &'a OrderLine| {
            totals.orders.insert(Some(row.order_id.as_str()));
            totals.monetary += row.payment();
            let date = row.purchase_date();
            totals.last_purchase = Some(totals.last_purchase.map_or(date, |d| d.max(date)));
        },
    )
    .into_iter()
    .map(|(customer_id, totals)| RfmScore {
        customer_id: customer_id.to_string(),
        frequency: totals.orders.len(),
        monetary: totals.monetary,
        recency: totals
            .last_purchase
            .map_or(0, |last| (reference - last).num_days()),
    })
    .collect()
}
