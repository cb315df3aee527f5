//! Event simulator behaviour.
//!
//! Scripted RNG tests pin exact timestamps; seeded RNG tests sweep many
//! draws and check the bounds hold for every generated event.

use abtest_core::{
    event::{EventType, SimulatedEvent},
    record::{parse_timestamp, InputRecord, ReviewField},
    rng::SeededRng,
    simulator::{EventSimulator, PAYMENT_DELAY_MINUTES, REVIEW_DELAY_DAYS},
    types::Timestamp,
};
use chrono::Duration;

mod common;
use common::ScriptedRng;

fn ts(s: &str) -> Timestamp {
    parse_timestamp(s).expect("valid timestamp")
}

fn base(order: &str, customer: &str, group: &str) -> InputRecord {
    InputRecord::new(order, customer, ts("2024-01-01 00:00:00"), group)
}

fn types(events: &[SimulatedEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.event_type.as_str()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Cardinality
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn cardinality_follows_optional_fields() {
    let mut sim = EventSimulator::new(SeededRng::new(1));

    let neither = base("O1", "C1", "control");
    let payment_only = base("O2", "C2", "control").with_payment(10.0);
    let review_only = base("O3", "C3", "control").with_review(3);
    let both = base("O4", "C4", "control").with_payment(10.0).with_review(3);

    assert_eq!(sim.simulate(&neither).len(), 1);
    assert_eq!(sim.simulate(&payment_only).len(), 2);
    assert_eq!(sim.simulate(&review_only).len(), 2);
    assert_eq!(sim.simulate(&both).len(), 3);
}

#[test]
fn events_are_emitted_in_fixed_order() {
    let mut sim = EventSimulator::new(SeededRng::new(2));
    let rec = base("O1", "C1", "treatment").with_payment(1.0).with_review(4);
    assert_eq!(
        types(&sim.simulate(&rec)),
        vec!["order_placed", "payment_success", "review_4star"]
    );

    let rec = base("O2", "C1", "treatment").with_review(2);
    assert_eq!(types(&sim.simulate(&rec)), vec!["order_placed", "review_2star"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn scenario_a_payment_without_review() {
    let mut sim = EventSimulator::new(SeededRng::new(3));
    let rec = base("O1", "C1", "treatment").with_payment(49.90);

    let events = sim.simulate(&rec);
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].event_type, EventType::OrderPlaced);
    assert_eq!(events[0].event_timestamp, ts("2024-01-01 00:00:00"));

    assert_eq!(events[1].event_type, EventType::PaymentSuccess);
    let at = events[1].event_timestamp;
    assert!(at >= ts("2024-01-01 00:05:00") && at <= ts("2024-01-01 02:00:00"), "{at}");

    assert!(events.iter().all(|e| e.ab_group == "treatment"));
}

#[test]
fn scenario_b_payment_and_five_star_review() {
    let mut sim = EventSimulator::new(SeededRng::new(4));
    let rec = base("O1", "C1", "control").with_payment(20.0).with_review(5);

    let events = sim.simulate(&rec);
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].event_type.as_str(), "review_5star");

    let offset = events[2].event_timestamp - rec.order_purchase_timestamp;
    assert!(offset >= Duration::days(5) && offset <= Duration::days(20), "{offset}");
}

#[test]
fn scenario_c_bare_order() {
    let mut sim = EventSimulator::new(ScriptedRng::default());
    let rec = base("O1", "C1", "control");

    let events = sim.simulate(&rec);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::OrderPlaced);
    assert_eq!(events[0].event_timestamp, rec.order_purchase_timestamp);
    // No draws were needed.
    assert_eq!(sim.into_rng().remaining(), 0);
}

#[test]
fn scenario_d_batch_preserves_record_order() {
    let mut sim = EventSimulator::new(SeededRng::new(5));
    let records = vec![
        base("O1", "C1", "control").with_payment(5.0).with_review(1),
        base("O2", "C2", "treatment"),
        base("O3", "C3", "treatment").with_review(4),
        base("O4", "C1", "control").with_payment(7.5),
    ];

    let events = sim.simulate_batch(&records);
    assert_eq!(events.len(), 3 + 1 + 2 + 2);

    let order_ids: Vec<&str> = events.iter().map(|e| e.order_id.as_str()).collect();
    assert_eq!(
        order_ids,
        vec!["O1", "O1", "O1", "O2", "O3", "O3", "O4", "O4"]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Exact offsets via scripted draws
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn scripted_draws_give_exact_timestamps() {
    // First draw feeds the payment lag, second the review lag.
    let mut sim = EventSimulator::new(ScriptedRng::new([37, 12]));
    let rec = base("O1", "C1", "control").with_payment(1.0).with_review(5);

    let events = sim.simulate(&rec);
    assert_eq!(events[0].event_timestamp, ts("2024-01-01 00:00:00"));
    assert_eq!(events[1].event_timestamp, ts("2024-01-01 00:37:00"));
    assert_eq!(events[2].event_timestamp, ts("2024-01-13 00:00:00"));
}

#[test]
fn scripted_extremes_land_on_inclusive_bounds() {
    let (pay_lo, pay_hi) = PAYMENT_DELAY_MINUTES;
    let (rev_lo, rev_hi) = REVIEW_DELAY_DAYS;
    let rec = base("O1", "C1", "control").with_payment(1.0).with_review(3);
    let anchor = rec.order_purchase_timestamp;

    let mut low = EventSimulator::new(ScriptedRng::new([pay_lo, rev_lo]));
    let events = low.simulate(&rec);
    assert_eq!(events[1].event_timestamp, anchor + Duration::minutes(5));
    assert_eq!(events[2].event_timestamp, anchor + Duration::days(5));

    let mut high = EventSimulator::new(ScriptedRng::new([pay_hi, rev_hi]));
    let events = high.simulate(&rec);
    assert_eq!(events[1].event_timestamp, anchor + Duration::minutes(120));
    assert_eq!(events[2].event_timestamp, anchor + Duration::days(20));
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties over many draws
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn offsets_stay_bounded_and_never_precede_anchor() {
    let mut sim = EventSimulator::new(SeededRng::new(0xFEED_BEEF));
    let rec = base("O1", "C1", "control").with_payment(3.0).with_review(2);
    let anchor = rec.order_purchase_timestamp;

    for _ in 0..5_000 {
        let events = sim.simulate(&rec);
        assert_eq!(events[0].event_timestamp, anchor);
        for e in &events {
            assert!(e.event_timestamp >= anchor);
        }
        let pay = events[1].event_timestamp - anchor;
        assert!(pay >= Duration::minutes(5) && pay <= Duration::minutes(120), "{pay}");
        let review = events[2].event_timestamp - anchor;
        assert!(review >= Duration::days(5) && review <= Duration::days(20), "{review}");
        // Whole minutes / whole days only.
        assert_eq!(pay.num_seconds() % 60, 0);
        assert_eq!(review.num_seconds() % 86_400, 0);
    }
}

#[test]
fn fields_propagate_without_cross_contamination() {
    let mut sim = EventSimulator::new(SeededRng::new(9));
    let records: Vec<InputRecord> = (0..50)
        .map(|i| {
            let group = if i % 2 == 0 { "control" } else { "treatment" };
            base(&format!("O{i}"), &format!("C{i}"), group)
                .with_payment(i as f64)
                .with_review((i % 5 + 1) as u8)
        })
        .collect();

    let events = sim.simulate_batch(&records);
    assert_eq!(events.len(), 150);
    for (chunk, rec) in events.chunks(3).zip(&records) {
        for e in chunk {
            assert_eq!(e.order_id, rec.order_id);
            assert_eq!(e.customer_id, rec.customer_id);
            assert_eq!(e.ab_group, rec.ab_group);
        }
    }
}

#[test]
fn event_types_stay_in_vocabulary() {
    let mut sim = EventSimulator::new(SeededRng::new(10));
    let records: Vec<InputRecord> = (1..=5u8)
        .map(|s| base("O", "C", "control").with_payment(1.0).with_review(s))
        .collect();
    let events = sim.simulate_batch(&records);
    for e in &events {
        assert!(
            EventType::VOCABULARY.contains(&e.event_type.as_str()),
            "unexpected event type {}",
            e.event_type
        );
    }
    let reviews: Vec<&str> = events
        .iter()
        .filter(|e| matches!(e.event_type, EventType::Review(_)))
        .map(|e| e.event_type.as_str())
        .collect();
    assert_eq!(
        reviews,
        vec!["review_1star", "review_2star", "review_3star", "review_4star", "review_5star"]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Malformed review policy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn malformed_review_drops_only_the_review_event() {
    let mut sim = EventSimulator::new(ScriptedRng::new([30]));
    let mut rec = base("O1", "C1", "control").with_payment(12.0);
    rec.review_score = Some(ReviewField::Malformed("five".into()));

    let events = sim.simulate(&rec);
    assert_eq!(types(&events), vec!["order_placed", "payment_success"]);
}

#[test]
fn out_of_range_review_is_treated_as_malformed() {
    let rec = base("O1", "C1", "control").with_review(9);
    assert_eq!(rec.review_score, Some(ReviewField::Malformed("9".into())));

    let mut sim = EventSimulator::new(ScriptedRng::default());
    assert_eq!(types(&sim.simulate(&rec)), vec!["order_placed"]);
}

#[test]
fn scripted_draws_are_clamped_into_range() {
    use abtest_core::rng::RandomSource;
    let mut rng = ScriptedRng::new([1, 500, 60]);
    assert_eq!(rng.uniform_inclusive(5, 120), 5);
    assert_eq!(rng.uniform_inclusive(5, 120), 120);
    assert_eq!(rng.uniform_inclusive(5, 120), 60);
    assert_eq!(rng.remaining(), 0);
}
