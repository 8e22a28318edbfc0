/// MartDash Order Table
///
/// An `OrderTable` is the loaded dataset: every order line, stable-sorted
/// ascending by purchase timestamp and re-indexed. The table is read-only
/// once built; views and dashboards borrow it.
///
/// # Examples
///
/// ```
/// use martdash::OrderTable;
///
/// let csv = "order_id,customer_id,product_id,product_category_name,customer_city,customer_state,payment_value,order_purchase_timestamp\n\
///            o2,c2,p2,books,rio de janeiro,RJ,20.0,2023-01-03 09:00:00\n\
///            o1,c1,p1,toys,sao paulo,SP,50.0,2023-01-01 10:00:00\n";
///
/// let table = OrderTable::from_csv("orders", csv).unwrap();
/// assert_eq!(table.len(), 2);
/// // Rows come back in purchase order, not file order
/// assert_eq!(table.get_row(0).unwrap().order_id, "o1");
/// ```

use crate::error::LoadError;
use crate::record::OrderLine;
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub struct OrderTable {
    name: String,
    rows: Vec<OrderLine>,
}

impl OrderTable {
    /// Build a table from already-parsed lines.
    ///
    /// Rows are stable-sorted by `order_purchase_timestamp`, so lines sharing
    /// a timestamp keep their input order.
    pub fn from_records(name: impl Into<String>, mut rows: Vec<OrderLine>) -> Self {
        rows.sort_by_key(|row| row.order_purchase_timestamp);
        OrderTable {
            name: name.into(),
            rows,
        }
    }

    /// Parse a headed, comma-delimited order file from any reader.
    ///
    /// The whole load fails on the first bad record: a missing or malformed
    /// purchase timestamp, a malformed lifecycle timestamp, or a payment
    /// value that is negative or not finite. Errors name the line the record
    /// starts on.
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Fields)
            .from_reader(reader);
        let headers = reader.headers().map_err(LoadError::Header)?.clone();

        let mut rows = Vec::new();
        let mut record = csv::StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(source) => {
                    return Err(LoadError::Csv {
                        line: source.position().map_or(0, |pos| pos.line()),
                        source,
                    })
                }
            }
            let line = record.position().map_or(0, |pos| pos.line());
            let row: OrderLine = record
                .deserialize(Some(&headers))
                .map_err(|source| LoadError::Csv { line, source })?;
            if let Some(value) = row.payment_value.filter(|v| !v.is_finite() || *v < 0.0) {
                return Err(LoadError::InvalidPayment { line, value });
            }
            rows.push(row);
        }

        Ok(Self::from_records(name, rows))
    }

    /// Parse an order file held in memory.
    pub fn from_csv(name: &str, csv: &str) -> Result<Self, LoadError> {
        Self::from_csv_reader(name, csv.as_bytes())
    }

    /// Load an order file from disk. The table is named after the file stem.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "orders".to_string());

        let table = Self::from_csv_reader(name, file)?;
        log::info!(
            "Loaded {} order lines from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get_row(&self, index: usize) -> Option<&OrderLine> {
        self.rows.get(index)
    }

    /// All rows in purchase order.
    pub fn rows(&self) -> &[OrderLine] {
        &self.rows
    }

    pub fn iter_rows(&self) -> std::slice::Iter<'_, OrderLine> {
        self.rows.iter()
    }

    /// First and last purchase dates, or `None` for an empty table.
    pub fn purchase_date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        // sorted by purchase timestamp, so the ends are the extremes
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some((first.purchase_date(), last.purchase_date()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = ",order_id,customer_id,product_id,product_category_name,customer_city,customer_state,payment_value,price,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date";

    fn csv_with(lines: &[&str]) -> String {
        let mut csv = String::from(HEADER);
        for line in lines {
            csv.push('\n');
            csv.push_str(line);
        }
        csv.push('\n');
        csv
    }

    #[test]
    fn test_load_sorts_by_purchase_timestamp() {
        let csv = csv_with(&[
            "0,o3,c3,p3,toys,curitiba,PR,10.0,9.9,2023-01-05 08:00:00,,,,",
            "1,o1,c1,p1,books,sao paulo,SP,50.0,45.0,2023-01-01 10:00:00,2023-01-01 10:15:00,2023-01-02 12:00:00,2023-01-04 18:00:00,2023-01-10 00:00:00",
            "2,o2,c2,p2,,,,20.0,19.0,2023-01-03 09:00:00,,,,",
        ]);

        let table = OrderTable::from_csv("orders", &csv).unwrap();
        assert_eq!(table.len(), 3);
        let ids: Vec<&str> = table.iter_rows().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o2", "o3"]);

        let first = table.get_row(0).unwrap();
        assert!(first.order_delivered_customer_date.is_some());
        assert_eq!(first.payment_value, Some(50.0));

        let second = table.get_row(1).unwrap();
        assert_eq!(second.product_category_name, None);
        assert_eq!(second.customer_city, None);
        assert_eq!(second.order_approved_at, None);
    }

    #[test]
    fn test_load_is_stable_for_equal_timestamps() {
        let csv = csv_with(&[
            "0,o1,c1,pB,toys,a,X,1.0,1.0,2023-01-01 10:00:00,,,,",
            "1,o1,c1,pA,toys,a,X,2.0,2.0,2023-01-01 10:00:00,,,,",
        ]);
        let table = OrderTable::from_csv("orders", &csv).unwrap();
        assert_eq!(table.get_row(0).unwrap().product_id.as_deref(), Some("pB"));
        assert_eq!(table.get_row(1).unwrap().product_id.as_deref(), Some("pA"));
    }

    #[test]
    fn test_bounds() {
        let csv = csv_with(&[
            "0,o1,c1,p1,toys,a,X,1.0,1.0,2023-02-10 23:00:00,,,,",
            "1,o2,c2,p2,toys,a,X,1.0,1.0,2023-01-01 01:00:00,,,,",
        ]);
        let table = OrderTable::from_csv("orders", &csv).unwrap();
        let (min, max) = table.purchase_date_bounds().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2023, 2, 10).unwrap());
    }

    #[test]
    fn test_empty_file_loads_empty_table() {
        let table = OrderTable::from_csv("orders", &csv_with(&[])).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.purchase_date_bounds(), None);
    }

    #[test]
    fn test_missing_purchase_timestamp_fails_load() {
        let csv = csv_with(&[
            "0,o1,c1,p1,toys,a,X,1.0,1.0,2023-01-01 10:00:00,,,,",
            "1,o2,c2,p2,toys,a,X,1.0,1.0,,,,,",
        ]);
        let err = OrderTable::from_csv("orders", &csv).err().unwrap();
        match err {
            LoadError::Csv { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_lifecycle_timestamp_fails_load() {
        let csv = csv_with(&["0,o1,c1,p1,toys,a,X,1.0,1.0,2023-01-01 10:00:00,not a date,,,"]);
        let err = OrderTable::from_csv("orders", &csv).err().unwrap();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn test_negative_payment_fails_load() {
        let csv = csv_with(&[
            "0,o1,c1,p1,toys,a,X,1.0,1.0,2023-01-01 10:00:00,,,,",
            "1,o2,c2,p2,toys,a,X,-4.5,1.0,2023-01-01 10:00:00,,,,",
        ]);
        let err = OrderTable::from_csv("orders", &csv).err().unwrap();
        match err {
            LoadError::InvalidPayment { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, -4.5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_payment_fails_load() {
        for cell in ["NaN", "inf", "-inf"] {
            let bad = format!("0,o1,c1,p1,toys,a,X,{cell},1.0,2023-01-01 10:00:00,,,,");
            let err = OrderTable::from_csv("orders", &csv_with(&[&bad])).err().unwrap();
            match err {
                LoadError::InvalidPayment { line, value } => {
                    assert_eq!(line, 2);
                    assert!(!value.is_finite());
                }
                other => panic!("unexpected error for {cell}: {other}"),
            }
        }
    }

    #[test]
    fn test_error_line_counts_multiline_fields() {
        // The quoted city spans two physical lines
        let csv = csv_with(&[
            "0,o1,c1,p1,toys,\"sao\npaulo\",SP,1.0,1.0,2023-01-01 10:00:00,,,,",
            "1,o2,c2,p2,toys,a,X,-1.0,1.0,2023-01-01 10:00:00,,,,",
        ]);
        let err = OrderTable::from_csv("orders", &csv).err().unwrap();
        match err {
            LoadError::InvalidPayment { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(csv_with(&["0,o1,c1,p1,toys,a,X,1.0,1.0,2023-01-01 10:00:00,,,,"]).as_bytes())
            .unwrap();

        let table = OrderTable::from_csv_path(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.name().is_empty());
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = OrderTable::from_csv_path("/definitely/not/here.csv").err().unwrap();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
