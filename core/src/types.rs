//! Shared primitive types used across the workspace.

/// Opaque order identifier as stored in the warehouse.
pub type OrderId = String;

/// Opaque customer identifier as stored in the warehouse.
pub type CustomerId = String;

/// Experiment arm label (e.g. "control", "treatment").
pub type AbGroup = String;

/// Timestamps are wall-clock values without a zone, the way the
/// warehouse hands them back.
pub type Timestamp = chrono::NaiveDateTime;

/// Rendering used for every timestamp written back out. Sub-second
/// precision is kept and whole seconds print without a fraction.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
