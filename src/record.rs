/// MartDash Order-Line Record
///
/// An `OrderLine` is one row of the flat order table: one (order, product)
/// combination. An order with several products contributes several lines,
/// so order counts are always distinct counts over `order_id`.
///
/// # Timestamps
///
/// Timestamp columns accept `YYYY-MM-DD HH:MM:SS`, the ISO `T` separator
/// (both with optional fractional seconds) and a bare `YYYY-MM-DD`, which is
/// read as midnight. The purchase timestamp is required; the four lifecycle
/// timestamps may be empty.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a timestamp cell in any of the accepted layouts.
///
/// ```
/// use martdash::parse_timestamp;
///
/// let ts = parse_timestamp("2017-10-02 10:56:33").unwrap();
/// assert_eq!(ts.to_string(), "2017-10-02 10:56:33");
///
/// let midnight = parse_timestamp("2017-10-02").unwrap();
/// assert_eq!(midnight.to_string(), "2017-10-02 00:00:00");
///
/// assert!(parse_timestamp("02/10/2017").is_err());
/// ```
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| format!("invalid timestamp '{}'", raw))
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Err(D::Error::custom("missing order_purchase_timestamp"));
        }
        super::parse_timestamp(&raw).map_err(D::Error::custom)
    }
}

mod optional_timestamp {
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => {
                super::parse_timestamp(&raw).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

/// One (order, product) line of the order dataset.
///
/// Columns of the source file that are not listed here are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: String,
    pub customer_id: String,
    pub product_id: Option<String>,
    pub product_category_name: Option<String>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,
    pub payment_value: Option<f64>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub order_purchase_timestamp: NaiveDateTime,
    #[serde(default, deserialize_with = "optional_timestamp::deserialize")]
    pub order_approved_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "optional_timestamp::deserialize")]
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "optional_timestamp::deserialize")]
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "optional_timestamp::deserialize")]
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
}

impl OrderLine {
    /// Create a line with the required fields; everything optional starts empty.
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        order_purchase_timestamp: NaiveDateTime,
    ) -> Self {
        OrderLine {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            product_id: None,
            product_category_name: None,
            customer_city: None,
            customer_state: None,
            payment_value: None,
            order_purchase_timestamp,
            order_approved_at: None,
            order_delivered_carrier_date: None,
            order_delivered_customer_date: None,
            order_estimated_delivery_date: None,
        }
    }

    pub fn with_product(mut self, product_id: impl Into<String>, category: Option<&str>) -> Self {
        self.product_id = Some(product_id.into());
        self.product_category_name = category.map(str::to_string);
        self
    }

    pub fn with_location(mut self, city: Option<&str>, state: Option<&str>) -> Self {
        self.customer_city = city.map(str::to_string);
        self.customer_state = state.map(str::to_string);
        self
    }

    pub fn with_payment(mut self, value: f64) -> Self {
        self.payment_value = Some(value);
        self
    }

    /// Calendar day of the purchase.
    #[inline]
    pub fn purchase_date(&self) -> NaiveDate {
        self.order_purchase_timestamp.date()
    }

    /// Payment value with a missing cell counted as zero.
    #[inline]
    pub fn payment(&self) -> f64 {
        self.payment_value.unwrap_or(0.0)
    }
}
