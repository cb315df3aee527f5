//! The event simulator: turns one historical order into a short,
//! plausible event timeline.
//!
//! EMISSION ORDER (fixed):
//!   1. order_placed     at the purchase timestamp
//!   2. payment_success  at +5..=120 minutes, only if a payment value exists
//!   3. review_Nstar     at +5..=20 days, only if a valid review score exists
//!
//! RULES:
//!   - Offsets are never negative, so no event precedes its order.
//!   - Every event copies customer_id, order_id and ab_group verbatim.
//!   - The simulator performs no I/O and owns no state beyond its RNG.

use crate::{
    event::{EventType, SimulatedEvent},
    record::{InputRecord, ReviewField},
    rng::RandomSource,
    types::Timestamp,
};
use chrono::Duration;

/// Payment confirmation lag, in minutes (inclusive).
pub const PAYMENT_DELAY_MINUTES: (i64, i64) = (5, 120);

/// Purchase-to-review lag, in days (inclusive).
pub const REVIEW_DELAY_DAYS: (i64, i64) = (5, 20);

pub struct EventSimulator<R: RandomSource> {
    rng: R,
}

impl<R: RandomSource> EventSimulator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Hand the random source back, e.g. to inspect a scripted stub.
    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Produce the 1..=3 events for one record.
    pub fn simulate(&mut self, record: &InputRecord) -> Vec<SimulatedEvent> {
        let anchor = record.order_purchase_timestamp;
        let mut events = Vec::with_capacity(3);

        events.push(event_for(record, EventType::OrderPlaced, anchor));

        if record.payment_value.is_some() {
            let (lo, hi) = PAYMENT_DELAY_MINUTES;
            let delay = Duration::minutes(self.rng.uniform_inclusive(lo, hi));
            events.push(event_for(record, EventType::PaymentSuccess, anchor + delay));
        }

        match &record.review_score {
            Some(ReviewField::Score(score)) => {
                let (lo, hi) = REVIEW_DELAY_DAYS;
                let delay = Duration::days(self.rng.uniform_inclusive(lo, hi));
                events.push(event_for(record, EventType::Review(*score), anchor + delay));
            }
            Some(ReviewField::Malformed(raw)) => {
                log::warn!(
                    "order={} review_score {raw:?} is not an integer in 1..=5, review event dropped",
                    record.order_id
                );
            }
            None => {}
        }

        events
    }

    /// Simulate every record in iteration order and concatenate the results.
    pub fn simulate_batch(&mut self, records: &[InputRecord]) -> Vec<SimulatedEvent> {
        let mut all = Vec::with_capacity(records.len() * 2);
        for record in records {
            all.extend(self.simulate(record));
        }
        log::debug!(
            "simulator: {} records -> {} events",
            records.len(),
            all.len()
        );
        all
    }
}

fn event_for(record: &InputRecord, event_type: EventType, at: Timestamp) -> SimulatedEvent {
    SimulatedEvent {
        customer_id: record.customer_id.clone(),
        order_id: record.order_id.clone(),
        event_type,
        event_timestamp: at,
        ab_group: record.ab_group.clone(),
    }
}
