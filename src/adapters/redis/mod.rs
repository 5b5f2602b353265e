//! Redis-backed adapters for multi-server deployments.

mod counter_store;

pub use counter_store::RedisCounterStore;
