/// MartDash View Implementation
///
/// Views are read-only windows over data owned elsewhere. A `RangeView`
/// restricts an `OrderTable` to an inclusive purchase-date range; a
/// `SortedView` presents any slice of derived rows in a stable sorted order
/// for leaderboards.

use crate::record::OrderLine;
use crate::table::OrderTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Inclusive range of calendar days.
///
/// A purchase at any time of day on either bound is inside the range. A
/// range whose start is after its end contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        DateRange { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// True when at least one day lies in both this range and `[min, max]`.
    pub fn overlaps(&self, (min, max): (NaiveDate, NaiveDate)) -> bool {
        !self.is_empty() && self.start <= max && self.end >= min
    }

    /// Pull both bounds into `[min, max]`, the way the date picker limits input.
    ///
    /// A range with no day in common with the bounds is returned unchanged,
    /// so it still selects nothing.
    pub fn clamp_to(&self, bounds: (NaiveDate, NaiveDate)) -> Self {
        if !self.overlaps(bounds) {
            return *self;
        }
        let (min, max) = bounds;
        DateRange {
            start: self.start.clamp(min, max),
            end: self.end.clamp(min, max),
        }
    }
}

/// Rows of an `OrderTable` whose purchase date falls in a `DateRange`.
///
/// The table is sorted by purchase timestamp, so the matching rows are one
/// contiguous run located with two binary searches.
///
/// # Examples
///
/// ```
/// use martdash::{DateRange, OrderLine, OrderTable, RangeView, parse_timestamp};
/// use chrono::NaiveDate;
///
/// let table = OrderTable::from_records("orders", vec![
///     OrderLine::new("o1", "c1", parse_timestamp("2023-01-01 08:00:00").unwrap()),
///     OrderLine::new("o2", "c2", parse_timestamp("2023-01-02 23:59:59").unwrap()),
///     OrderLine::new("o3", "c3", parse_timestamp("2023-01-03 00:00:00").unwrap()),
/// ]);
///
/// let day = |d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap();
/// let view = RangeView::new(&table, DateRange::new(day(1), day(2)));
/// assert_eq!(view.len(), 2);
/// assert_eq!(view.get_row(1).unwrap().order_id, "o2");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RangeView<'a> {
    range: DateRange,
    rows: &'a [OrderLine],
    /// Index of the first view row in the parent table
    offset: usize,
}

impl<'a> RangeView<'a> {
    pub fn new(parent: &'a OrderTable, range: DateRange) -> Self {
        let all = parent.rows();
        let start = all.partition_point(|row| row.purchase_date() < range.start);
        let end = all
            .partition_point(|row| row.purchase_date() <= range.end)
            .max(start);

        log::debug!(
            "Range {}..={} selects {} of {} rows in '{}'",
            range.start,
            range.end,
            end - start,
            all.len(),
            parent.name()
        );

        RangeView {
            range,
            rows: &all[start..end],
            offset: start,
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get_row(&self, index: usize) -> Option<&'a OrderLine> {
        self.rows.get(index)
    }

    /// Map a view index back to the parent table's row index.
    pub fn get_parent_index(&self, index: usize) -> Option<usize> {
        (index < self.rows.len()).then(|| self.offset + index)
    }

    pub fn rows(&self) -> &'a [OrderLine] {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'a, OrderLine> {
        self.rows.iter()
    }
}

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    Ascending,
    /// Descending order (largest first)
    Descending,
}

/// A SortedView presents rows from a parent slice in sorted order.
///
/// The sort is stable in both directions: rows with equal keys keep their
/// parent order. Keys not comparable with themselves (NaN) sort last in
/// either direction.
///
/// # Examples
///
/// ```
/// use martdash::{SortedView, SortOrder};
///
/// let scores = [("ana", 3), ("bo", 7), ("cy", 3), ("di", 9)];
/// let view = SortedView::new(&scores, |s| s.1, SortOrder::Descending);
///
/// let names: Vec<&str> = view.head(3).iter().map(|s| s.0).collect();
/// assert_eq!(names, vec!["di", "bo", "ana"]);
/// ```
#[derive(Debug)]
pub struct SortedView<'a, T> {
    parent: &'a [T],
    order: SortOrder,
    /// Sorted index: sorted_index[view_pos] = parent_row_index
    sorted_index: Vec<usize>,
}

impl<'a, T> SortedView<'a, T> {
    pub fn new<K, F>(parent: &'a [T], key: F, order: SortOrder) -> Self
    where
        K: PartialOrd,
        F: Fn(&T) -> K,
    {
        let keys: Vec<K> = parent.iter().map(key).collect();
        let mut sorted_index: Vec<usize> = (0..parent.len()).collect();

        sorted_index.sort_by(|&a, &b| {
            let (a_nan, b_nan) = (is_incomparable(&keys[a]), is_incomparable(&keys[b]));
            if a_nan || b_nan {
                return a_nan.cmp(&b_nan);
            }
            let ordering = keys[a].partial_cmp(&keys[b]).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });

        SortedView {
            parent,
            order,
            sorted_index,
        }
    }

    pub fn len(&self) -> usize {
        self.sorted_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_index.is_empty()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.sorted_index.get(index).map(|&i| &self.parent[i])
    }

    pub fn get_parent_index(&self, view_index: usize) -> Option<usize> {
        self.sorted_index.get(view_index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.sorted_index.iter().map(|&i| &self.parent[i])
    }

    /// The first `n` rows in sorted order (fewer if the parent is shorter).
    pub fn head(&self, n: usize) -> Vec<&'a T> {
        self.iter().take(n).collect()
    }
}

/// True for keys like NaN that have no ordering even against themselves.
fn is_incomparable<K: PartialOrd>(key: &K) -> bool {
    key.partial_cmp(key).is_none()
}
