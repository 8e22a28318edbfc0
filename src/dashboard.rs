/// MartDash Dashboard Session
///
/// A `Dashboard` borrows one loaded `OrderTable` and turns a date range into
/// a complete `DashboardSnapshot`: filter, the five aggregations, headline
/// metrics and the top/bottom-N leaderboards. Nothing is cached; every
/// snapshot is recomputed from the table.
///
/// # Examples
///
/// ```
/// use martdash::{Dashboard, OrderLine, OrderTable, parse_timestamp};
///
/// let table = OrderTable::from_records("orders", vec![
///     OrderLine::new("1", "A", parse_timestamp("2023-01-01 10:00:00").unwrap()).with_payment(50.0),
///     OrderLine::new("1", "A", parse_timestamp("2023-01-01 10:00:00").unwrap()).with_payment(30.0),
///     OrderLine::new("2", "A", parse_timestamp("2023-01-03 12:00:00").unwrap()).with_payment(20.0),
/// ]);
///
/// let dashboard = Dashboard::new(&table);
/// let snapshot = dashboard.snapshot(dashboard.full_range().unwrap());
///
/// assert_eq!(snapshot.orders.total_orders, 2);
/// assert_eq!(snapshot.orders.total_revenue, 100.0);
/// assert_eq!(snapshot.rfm[0].frequency, 2);
/// assert_eq!(snapshot.rfm[0].recency, 0);
/// ```

use crate::aggregate::{
    category_ranking, customers_by_city, customers_by_state, daily_orders, reference_date, rfm,
    CategoryRank, DailyOrders, GeoCount, RfmScore,
};
use crate::summary::{OrderSummary, RfmSummary};
use crate::table::OrderTable;
use crate::view::{DateRange, RangeView, SortOrder, SortedView};
use chrono::NaiveDate;
use serde::Serialize;

/// Rows per leaderboard unless configured otherwise.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;

/// Top and bottom rows the dashboard charts display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboards {
    /// Categories with the most distinct products
    pub top_categories: Vec<CategoryRank>,
    /// Categories with the fewest distinct products
    pub bottom_categories: Vec<CategoryRank>,
    /// Cities with the most customers
    pub top_cities: Vec<GeoCount>,
    /// States with the fewest customers
    pub bottom_states: Vec<GeoCount>,
    pub most_recent_customers: Vec<RfmScore>,
    pub top_spenders: Vec<RfmScore>,
    pub most_frequent_customers: Vec<RfmScore>,
}

impl Leaderboards {
    pub fn build(
        categories: &[CategoryRank],
        cities: &[GeoCount],
        states: &[GeoCount],
        scores: &[RfmScore],
        n: usize,
    ) -> Self {
        Leaderboards {
            top_categories: top_n(categories, |c| c.product_count, SortOrder::Descending, n),
            bottom_categories: top_n(categories, |c| c.product_count, SortOrder::Ascending, n),
            top_cities: top_n(cities, |c| c.customer_count, SortOrder::Descending, n),
            bottom_states: top_n(states, |s| s.customer_count, SortOrder::Ascending, n),
            most_recent_customers: top_n(scores, |s| s.recency, SortOrder::Ascending, n),
            top_spenders: top_n(scores, |s| s.monetary, SortOrder::Descending, n),
            most_frequent_customers: top_n(scores, |s| s.frequency, SortOrder::Descending, n),
        }
    }
}

fn top_n<T, K, F>(rows: &[T], key: F, order: SortOrder, n: usize) -> Vec<T>
where
    T: Clone,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    SortedView::new(rows, key, order)
        .head(n)
        .into_iter()
        .cloned()
        .collect()
}

/// Everything the dashboard shows for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub range: DateRange,
    /// Order lines inside the range
    pub rows: usize,
    /// Latest purchase date inside the range; recency is measured from it
    pub reference_date: Option<NaiveDate>,
    pub orders: OrderSummary,
    pub daily_orders: Vec<DailyOrders>,
    pub category_ranking: Vec<CategoryRank>,
    pub customers_by_city: Vec<GeoCount>,
    pub customers_by_state: Vec<GeoCount>,
    pub rfm: Vec<RfmScore>,
    pub rfm_summary: RfmSummary,
    pub leaderboards: Leaderboards,
}

/// One dashboard session over a borrowed, immutable table.
pub struct Dashboard<'a> {
    table: &'a OrderTable,
    leaderboard_size: usize,
}

impl<'a> Dashboard<'a> {
    pub fn new(table: &'a OrderTable) -> Self {
        Dashboard {
            table,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }

    pub fn with_leaderboard_size(mut self, n: usize) -> Self {
        self.leaderboard_size = n;
        self
    }

    pub fn table(&self) -> &'a OrderTable {
        self.table
    }

    pub fn leaderboard_size(&self) -> usize {
        self.leaderboard_size
    }

    /// First and last purchase dates of the whole dataset.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.table.purchase_date_bounds()
    }

    /// The range covering the whole dataset, `None` when it is empty.
    pub fn full_range(&self) -> Option<DateRange> {
        self.bounds().map(|(min, max)| DateRange::new(min, max))
    }

    pub fn filter(&self, range: DateRange) -> RangeView<'a> {
        RangeView::new(self.table, range)
    }

    /// Run the whole pipeline for `range`.
    ///
    /// An empty or inverted range is not an error: the snapshot just has
    /// empty tables, zero totals and no means.
    pub fn snapshot(&self, range: DateRange) -> DashboardSnapshot {
        let view = self.filter(range);
        let rows = view.rows();

        let daily = daily_orders(rows);
        let categories = category_ranking(rows);
        let cities = customers_by_city(rows);
        let states = customers_by_state(rows);
        let scores = rfm(rows);

        let leaderboards =
            Leaderboards::build(&categories, &cities, &states, &scores, self.leaderboard_size);

        log::debug!(
            "Snapshot {}..={}: {} rows, {} days, {} customers",
            range.start,
            range.end,
            rows.len(),
            daily.len(),
            scores.len()
        );

        DashboardSnapshot {
            range,
            rows: rows.len(),
            reference_date: reference_date(rows),
            orders: OrderSummary::from_daily(&daily),
            rfm_summary: RfmSummary::from_scores(&scores),
            daily_orders: daily,
            category_ranking: categories,
            customers_by_city: cities,
            customers_by_state: states,
            rfm: scores,
            leaderboards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupKey;
    use crate::record::{parse_timestamp, OrderLine};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table() -> OrderTable {
        let line = |order: &str, customer: &str, ts: &str| {
            OrderLine::new(order, customer, parse_timestamp(ts).unwrap())
        };
        let mut rows = Vec::new();
        // seven cities with 1..=7 customers, one order per customer
        for city in 1..=7u32 {
            for n in 0..city {
                let order = format!("o{city}-{n}");
                let customer = format!("c{city}-{n}");
                let ts = format!("2023-02-{:02} 10:00:00", city);
                let category = format!("cat{city}");
                let (city_name, state) = (format!("city{city}"), format!("S{city}"));
                rows.push(
                    line(order.as_str(), customer.as_str(), ts.as_str())
                        .with_product(format!("p{n}"), Some(category.as_str()))
                        .with_location(Some(city_name.as_str()), Some(state.as_str()))
                        .with_payment(f64::from(city * 10 + n)),
                );
            }
        }
        OrderTable::from_records("orders", rows)
    }

    #[test]
    fn test_full_range_snapshot() {
        let table = table();
        let dashboard = Dashboard::new(&table);
        let range = dashboard.full_range().unwrap();
        assert_eq!(range, DateRange::new(date("2023-02-01"), date("2023-02-07")));

        let snapshot = dashboard.snapshot(range);
        assert_eq!(snapshot.rows, 28);
        assert_eq!(snapshot.reference_date, Some(date("2023-02-07")));
        assert_eq!(snapshot.daily_orders.len(), 7);
        assert_eq!(snapshot.orders.total_orders, 28);
        assert_eq!(snapshot.customers_by_city.len(), 7);
        assert_eq!(snapshot.rfm.len(), 28);
        assert_eq!(snapshot.rfm_summary.customers, 28);
    }

    #[test]
    fn test_leaderboards_respect_direction_and_size() {
        let table = table();
        let dashboard = Dashboard::new(&table);
        let snapshot = dashboard.snapshot(dashboard.full_range().unwrap());
        let boards = &snapshot.leaderboards;

        let top: Vec<usize> = boards.top_categories.iter().map(|c| c.product_count).collect();
        assert_eq!(top, vec![7, 6, 5, 4, 3]);
        let bottom: Vec<usize> = boards.bottom_categories.iter().map(|c| c.product_count).collect();
        assert_eq!(bottom, vec![1, 2, 3, 4, 5]);

        assert_eq!(boards.top_cities[0].name, GroupKey::Value("city7".into()));
        assert_eq!(boards.bottom_states[0].name, GroupKey::Value("S1".into()));

        assert!(boards.most_recent_customers.iter().all(|s| s.recency == 0));
        assert_eq!(boards.top_spenders[0].monetary, 76.0);
        assert_eq!(boards.most_frequent_customers.len(), 5);
    }

    #[test]
    fn test_leaderboard_size_is_configurable() {
        let table = table();
        let dashboard = Dashboard::new(&table).with_leaderboard_size(2);
        assert_eq!(dashboard.leaderboard_size(), 2);
        let snapshot = dashboard.snapshot(dashboard.full_range().unwrap());
        assert_eq!(snapshot.leaderboards.top_categories.len(), 2);
        assert_eq!(snapshot.leaderboards.top_spenders.len(), 2);
    }

    #[test]
    fn test_narrow_range_moves_reference_date() {
        let table = table();
        let dashboard = Dashboard::new(&table);
        let snapshot = dashboard.snapshot(DateRange::new(date("2023-02-02"), date("2023-02-03")));
        assert_eq!(snapshot.rows, 5);
        assert_eq!(snapshot.reference_date, Some(date("2023-02-03")));
        assert_eq!(snapshot.leaderboards.top_categories.len(), 2);
        let zero = snapshot.rfm.iter().filter(|s| s.recency == 0).count();
        assert_eq!(zero, 3);
    }

    #[test]
    fn test_empty_range_snapshot_degrades_gracefully() {
        let table = table();
        let dashboard = Dashboard::new(&table);
        let snapshot = dashboard.snapshot(DateRange::new(date("2024-01-01"), date("2024-01-31")));

        assert_eq!(snapshot.rows, 0);
        assert_eq!(snapshot.reference_date, None);
        assert!(snapshot.daily_orders.is_empty());
        assert!(snapshot.category_ranking.is_empty());
        assert!(snapshot.rfm.is_empty());
        assert_eq!(snapshot.orders, OrderSummary::default());
        assert_eq!(snapshot.rfm_summary.avg_monetary, None);
        assert!(snapshot.leaderboards.top_spenders.is_empty());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["rfm_summary"]["avg_recency"], serde_json::Value::Null);
        assert_eq!(json["daily_orders"], serde_json::json!([]));
    }

    #[test]
    fn test_inverted_range_snapshot_is_empty() {
        let table = table();
        let dashboard = Dashboard::new(&table);
        let snapshot = dashboard.snapshot(DateRange::new(date("2023-02-05"), date("2023-02-02")));
        assert_eq!(snapshot.rows, 0);
    }

    #[test]
    fn test_empty_table_has_no_range() {
        let table = OrderTable::from_records("empty", Vec::new());
        let dashboard = Dashboard::new(&table);
        assert_eq!(dashboard.bounds(), None);
        assert_eq!(dashboard.full_range(), None);
    }

    #[test]
    fn test_snapshot_serializes_dates_and_keys() {
        let table = table();
        let dashboard = Dashboard::new(&table);
        let snapshot = dashboard.snapshot(DateRange::day(date("2023-02-01")));
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["range"]["start"], "2023-02-01");
        assert_eq!(json["daily_orders"][0]["date"], "2023-02-01");
        assert_eq!(json["daily_orders"][0]["order_count"], 1);
        assert_eq!(json["customers_by_state"][0]["name"], "S1");
    }
}
