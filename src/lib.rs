//! Papi: a step-powered virtual pet.
//!
//! The engines here are pure functions of persisted timestamps, step
//! counters and a caller-supplied `now`; nothing reads the clock or runs in
//! the background. The host polls [`model::GameState::poll`] once a minute
//! and feeds player input through [`model::GameState::apply`].

pub mod config;
pub mod daily;
pub mod events;
pub mod evolution;
pub mod level;
pub mod model;
pub mod notifications;
pub mod shop;
pub mod sim;
pub mod stats;
pub mod storage;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseNameError {
    #[error("unknown stat `{0}` (expected hunger, fun or energy)")]
    Stat(String),
    #[error("unknown event `{0}` (expected fly, poop or spider)")]
    Event(String),
}

/// Optional instants stored as epoch milliseconds, `0` meaning never.
pub(crate) mod epoch_ms_or_zero {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(v.map_or(0, |t| t.timestamp_millis()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let ms = i64::deserialize(d)?;
        if ms <= 0 {
            return Ok(None);
        }
        Ok(DateTime::from_timestamp_millis(ms))
    }
}
