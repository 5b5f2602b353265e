//! Admission policy values: connection limits and the message-rate bucket.
//!
//! The enforcement lives in the application layer and its counter stores;
//! this module holds the pure pieces so they can be tested without clocks
//! or sockets.

mod limits;
mod token_bucket;

pub use limits::AdmissionLimits;
pub use token_bucket::TokenBucket;
