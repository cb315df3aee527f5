//! Core library for the A/B-testing analytics toolkit: warehouse
//! provisioning, CSV loading, synthetic event simulation and the
//! analysis query runner.

pub mod config;
pub mod error;
pub mod event;
pub mod loader;
pub mod pipeline;
pub mod provision;
pub mod queries;
pub mod record;
pub mod rng;
pub mod simulator;
pub mod sink;
pub mod source;
pub mod store;
pub mod types;
pub mod warehouse;
