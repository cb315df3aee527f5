//! Event generation run: Record Source → Simulator → Event Sink.
//!
//! Strictly sequential. The full batch is held in memory and written
//! once after the last record is simulated; any error before that point
//! means nothing reaches the sink.

use crate::{
    error::PipelineResult,
    rng::RandomSource,
    simulator::EventSimulator,
    sink::EventSink,
    source::RecordSource,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub records: usize,
    pub events: usize,
    pub order_placed: usize,
    pub payment_success: usize,
    pub reviews: usize,
}

/// Pretty JSON for any step summary, as printed by `--json`.
pub fn summary_json<T: Serialize + ?Sized>(summary: &T) -> PipelineResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

pub fn generate_events<S, R, K>(
    source: &S,
    simulator: &mut EventSimulator<R>,
    sink: &mut K,
) -> PipelineResult<GenerationSummary>
where
    S: RecordSource + ?Sized,
    R: RandomSource,
    K: EventSink + ?Sized,
{
    let records = source.fetch_records()?;
    let events = simulator.simulate_batch(&records);

    let mut summary = GenerationSummary {
        records: records.len(),
        events: events.len(),
        ..Default::default()
    };
    for event in &events {
        match event.event_type {
            crate::event::EventType::OrderPlaced => summary.order_placed += 1,
            crate::event::EventType::PaymentSuccess => summary.payment_success += 1,
            crate::event::EventType::Review(_) => summary.reviews += 1,
        }
    }

    let written = sink.write_batch(&events)?;
    log::info!(
        "generated {} events from {} records, wrote {written} to {}",
        summary.events,
        summary.records,
        sink.describe()
    );
    Ok(summary)
}
