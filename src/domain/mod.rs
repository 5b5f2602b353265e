//! Domain layer - pure tournament progression logic.
//!
//! No I/O happens here. Everything external (persistence, counters,
//! authentication, transport) is reached through the ports layer.

pub mod admission;
pub mod bracket;
pub mod disputes;
pub mod foundation;
pub mod matches;
pub mod results;
