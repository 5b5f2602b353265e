//! Redis-backed counter store for multi-server deployments.
//!
//! Session counters and token buckets must be shared across gateway
//! instances, so both operations run as Lua scripts: the check and the
//! write happen atomically on the Redis side, never as a read-modify-write
//! round trip from here.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Script;

use crate::ports::{CounterStore, StorageError};

/// Increment only while under the limit. Returns 1 on success, 0 when the
/// counter is already at the limit. A TTL guards against leaked counters
/// from crashed gateways.
const TRY_INCREMENT: &str = r#"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
if current >= tonumber(ARGV[1]) then
    return 0
end
redis.call('INCR', KEYS[1])
redis.call('EXPIRE', KEYS[1], ARGV[2])
return 1
"#;

/// Decrement, deleting the key once it reaches zero.
const DECREMENT: &str = r#"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
if current <= 1 then
    redis.call('DEL', KEYS[1])
else
    redis.call('DECR', KEYS[1])
end
return 1
"#;

/// Token bucket refilled from the Redis server clock. State is two fields
/// on a hash: the fractional token count and the last refill time in
/// milliseconds. Returns 1 when a token was taken.
const TRY_TAKE_TOKEN: &str = r#"
local rate = tonumber(ARGV[1])
local burst = tonumber(ARGV[2])
local time = redis.call('TIME')
local now_ms = time[1] * 1000 + math.floor(time[2] / 1000)

local state = redis.call('HMGET', KEYS[1], 'tokens', 'refilled_ms')
local tokens = tonumber(state[1]) or burst
local refilled_ms = tonumber(state[2]) or now_ms

local elapsed_ms = math.max(0, now_ms - refilled_ms)
tokens = math.min(burst, tokens + elapsed_ms * rate / 1000)

local taken = 0
if tokens >= 1 then
    tokens = tokens - 1
    taken = 1
end

redis.call('HSET', KEYS[1], 'tokens', tokens, 'refilled_ms', now_ms)
redis.call('EXPIRE', KEYS[1], ARGV[3])
return taken
"#;

/// Seconds of inactivity after which counter and bucket keys expire.
const KEY_TTL_SECS: u32 = 6 * 60 * 60;

#[derive(Clone)]
pub struct RedisCounterStore {
    conn: MultiplexedConnection,
    try_increment: Script,
    decrement: Script,
    try_take_token: Script,
}

impl RedisCounterStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            try_increment: Script::new(TRY_INCREMENT),
            decrement: Script::new(DECREMENT),
            try_take_token: Script::new(TRY_TAKE_TOKEN),
        }
    }
}

fn unavailable(e: redis::RedisError) -> StorageError {
    StorageError::Unavailable(e.to_string())
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn try_increment(&self, key: &str, limit: u32) -> Result<bool, StorageError> {
        let mut conn = self.conn.clone();
        let taken: i64 = self
            .try_increment
            .key(key)
            .arg(limit)
            .arg(KEY_TTL_SECS)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(taken == 1)
    }

    async fn decrement(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        self.decrement
            .key(key)
            .invoke_async::<_, i64>(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn try_take_token(
        &self,
        key: &str,
        rate_per_sec: u32,
        burst: u32,
    ) -> Result<bool, StorageError> {
        let mut conn = self.conn.clone();
        let taken: i64 = self
            .try_take_token
            .key(key)
            .arg(rate_per_sec)
            .arg(burst)
            .arg(KEY_TTL_SECS)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(taken == 1)
    }
}

impl std::fmt::Debug for RedisCounterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCounterStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    // Redis integration tests need a running instance and live in the
    // deployment pipeline, not the unit suite. Local setup:
    //
    // let client = redis::Client::open("redis://127.0.0.1/").unwrap();
    // let conn = client.get_multiplexed_tokio_connection().await.unwrap();
    // let store = RedisCounterStore::new(conn);
}
