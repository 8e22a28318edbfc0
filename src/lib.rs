/// MartDash - Order Analytics Dashboard Engine
///
/// Loads a flat table of e-commerce order lines once, restricts it to an
/// inclusive date range, and derives the dashboard's views: daily order
/// volume, category rankings, customer geography and per-customer RFM
/// scores, plus the headline metrics and leaderboards built on them.
///
/// Data flows one way: `OrderTable` → `RangeView` → aggregators →
/// `DashboardSnapshot`. The table is immutable after load and every view
/// borrows it.

pub mod error;
pub mod record;
pub mod table;
pub mod view;
pub mod group;
pub mod aggregate;
pub mod summary;
pub mod dashboard;
pub mod config;

pub use error::{ConfigError, LoadError};
pub use record::{parse_timestamp, OrderLine};
pub use table::OrderTable;
pub use view::{DateRange, RangeView, SortOrder, SortedView};
pub use group::{group_by, DistinctCount, GroupKey};
pub use aggregate::{
    category_ranking, customers_by_city, customers_by_state, daily_orders, reference_date, rfm,
    CategoryRank, DailyOrders, GeoCount, RfmScore,
};
pub use summary::{OrderSummary, RfmSummary};
pub use dashboard::{Dashboard, DashboardSnapshot, Leaderboards, DEFAULT_LEADERBOARD_SIZE};

// HTTP server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod server;
