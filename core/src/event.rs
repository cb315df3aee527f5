//! Simulated behavioural events.
//!
//! RULE: event_type is a closed vocabulary. Nothing outside EventType
//! may produce an event_type string.

use crate::{
    record::ReviewScore,
    types::{AbGroup, CustomerId, OrderId, Timestamp, TIMESTAMP_FORMAT},
};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    OrderPlaced,
    PaymentSuccess,
    Review(ReviewScore),
}

impl EventType {
    /// Every string this type can render, in a stable order.
    pub const VOCABULARY: [&'static str; 7] = [
        "order_placed",
        "payment_success",
        "review_1star",
        "review_2star",
        "review_3star",
        "review_4star",
        "review_5star",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderPlaced => Self::VOCABULARY[0],
            Self::PaymentSuccess => Self::VOCABULARY[1],
            Self::Review(score) => Self::VOCABULARY[1 + score.get() as usize],
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One output row. Field order is the sink's column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedEvent {
    pub customer_id: CustomerId,
    pub order_id: OrderId,
    pub event_type: EventType,
    #[serde(serialize_with = "serialize_timestamp")]
    pub event_timestamp: Timestamp,
    pub ab_group: AbGroup,
}

impl SimulatedEvent {
    /// Column names in sink order.
    pub const COLUMNS: [&'static str; 5] = [
        "customer_id",
        "order_id",
        "event_type",
        "event_timestamp",
        "ab_group",
    ];
}

fn serialize_timestamp<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}
