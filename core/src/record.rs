//! Input records for the event simulator.
//!
//! RULE: Raw rows are validated exactly once, here, at the Record Source
//! boundary. The simulator only ever sees an InputRecord whose required
//! fields are present and whose optional fields are already typed.

use crate::{
    error::{PipelineError, PipelineResult},
    types::{AbGroup, CustomerId, OrderId, Timestamp},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One joined order row as the Record Source returns it.
/// Every column is optional here; validation decides what is fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrderRow {
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub order_purchase_timestamp: Option<String>,
    pub payment_value: Option<f64>,
    /// Kept as text so a malformed score survives to the simulator's
    /// review policy instead of failing the whole row.
    pub review_score: Option<String>,
    pub ab_group: Option<String>,
    #[serde(default)]
    pub feature_exposure_date: Option<String>,
}

/// A review score coerced to an integer in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReviewScore(u8);

impl ReviewScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(score: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&score).then_some(Self(score))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Parse "4", "4.0", " 5 ". Fractional or out-of-range values are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return u8::try_from(n).ok().and_then(Self::new);
        }
        let f = trimmed.parse::<f64>().ok()?;
        if !f.is_finite() || f.fract() != 0.0 {
            return None;
        }
        if !(Self::MIN as f64..=Self::MAX as f64).contains(&f) {
            return None;
        }
        Self::new(f as u8)
    }
}

impl fmt::Display for ReviewScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The review column after boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewField {
    Score(ReviewScore),
    /// Present but not coercible to 1..=5; carries the raw text for logging.
    Malformed(String),
}

impl ReviewField {
    fn from_raw(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() || raw.trim().eq_ignore_ascii_case("nan") {
            return None;
        }
        Some(match ReviewScore::parse(raw) {
            Some(score) => Self::Score(score),
            None => Self::Malformed(raw.to_string()),
        })
    }
}

/// A validated, strongly typed order record.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub order_purchase_timestamp: Timestamp,
    pub payment_value: Option<f64>,
    pub review_score: Option<ReviewField>,
    pub ab_group: AbGroup,
}

impl InputRecord {
    /// Convenience constructor for the always-present fields.
    pub fn new(
        order_id: impl Into<OrderId>,
        customer_id: impl Into<CustomerId>,
        order_purchase_timestamp: Timestamp,
        ab_group: impl Into<AbGroup>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            order_purchase_timestamp,
            payment_value: None,
            review_score: None,
            ab_group: ab_group.into(),
        }
    }

    pub fn with_payment(mut self, value: f64) -> Self {
        self.payment_value = Some(value).filter(|v| !v.is_nan());
        self
    }

    pub fn with_review(mut self, score: u8) -> Self {
        self.review_score = Some(match ReviewScore::new(score) {
            Some(s) => ReviewField::Score(s),
            None => ReviewField::Malformed(score.to_string()),
        });
        self
    }

    /// Validate a raw row. Missing required fields fail the record.
    pub fn try_from_raw(raw: RawOrderRow) -> PipelineResult<Self> {
        let order_id = non_empty(raw.order_id).ok_or_else(|| PipelineError::MissingField {
            order_id: "<unknown>".into(),
            field: "order_id",
        })?;
        let missing = |field: &'static str| PipelineError::MissingField {
            order_id: order_id.clone(),
            field,
        };

        let customer_id = non_empty(raw.customer_id).ok_or_else(|| missing("customer_id"))?;
        let ab_group = non_empty(raw.ab_group).ok_or_else(|| missing("ab_group"))?;
        let ts_raw = non_empty(raw.order_purchase_timestamp)
            .ok_or_else(|| missing("order_purchase_timestamp"))?;
        let order_purchase_timestamp =
            parse_timestamp(&ts_raw).ok_or_else(|| PipelineError::InvalidTimestamp {
                order_id: order_id.clone(),
                value: ts_raw.clone(),
            })?;

        Ok(Self {
            order_id,
            customer_id,
            order_purchase_timestamp,
            payment_value: raw.payment_value.filter(|v| !v.is_nan()),
            review_score: raw.review_score.as_deref().and_then(ReviewField::from_raw),
            ab_group,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts the shapes warehouses and CSV exports commonly use:
/// `2024-01-01 00:00:00`, `2024-01-01T00:00:00`, fractional seconds,
/// and a trailing `UTC`, `Z` or `+00:00`.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let trimmed = raw
        .trim()
        .trim_end_matches(" UTC")
        .trim_end_matches('Z')
        .trim_end_matches("+00:00");
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
