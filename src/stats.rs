//! Time-driven need decay.
//!
//! Hunger, fun and energy are never stored as numbers. Each stat keeps the
//! instant it was last "full" and its value is derived from how long ago that
//! was: 100 at the reset instant, falling linearly to 0 after 24 hours.
//! Raising a stat means moving that instant, never storing a value.

use crate::ParseNameError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const STAT_MAX: u8 = 100;
pub const HOURS_TO_ZERO: i64 = 24;

const MS_PER_HOUR: f64 = 3_600_000.0;
// 24h spread over 100 points.
const MS_PER_POINT: i64 = HOURS_TO_ZERO * 3_600_000 / STAT_MAX as i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Hunger,
    Fun,
    Energy,
}

impl Stat {
    pub const ALL: [Stat; 3] = [Stat::Hunger, Stat::Fun, Stat::Energy];

    pub fn name(self) -> &'static str {
        match self {
            Stat::Hunger => "hunger",
            Stat::Fun => "fun",
            Stat::Energy => "energy",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Stat {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hunger" => Ok(Stat::Hunger),
            "fun" => Ok(Stat::Fun),
            "energy" => Ok(Stat::Energy),
            other => Err(ParseNameError::Stat(other.to_string())),
        }
    }
}

/// Last-reset instants for one pet, persisted as epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatTimestamps {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub hunger_last_reset: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub fun_last_reset: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub energy_last_reset: DateTime<Utc>,
}

impl StatTimestamps {
    /// First run: every stat starts full.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            hunger_last_reset: now,
            fun_last_reset: now,
            energy_last_reset: now,
        }
    }

    pub fn get(&self, stat: Stat) -> DateTime<Utc> {
        match stat {
            Stat::Hunger => self.hunger_last_reset,
            Stat::Fun => self.fun_last_reset,
            Stat::Energy => self.energy_last_reset,
        }
    }

    pub fn set(&mut self, stat: Stat, at: DateTime<Utc>) {
        match stat {
            Stat::Hunger => self.hunger_last_reset = at,
            Stat::Fun => self.fun_last_reset = at,
            Stat::Energy => self.energy_last_reset = at,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hunger: u8,
    pub fun: u8,
    pub energy: u8,
}

impl Stats {
    pub fn get(&self, stat: Stat) -> u8 {
        match stat {
            Stat::Hunger => self.hunger,
            Stat::Fun => self.fun,
            Stat::Energy => self.energy,
        }
    }

    pub fn any_below(&self, threshold: u8) -> bool {
        Stat::ALL.iter().any(|s| self.get(*s) < threshold)
    }
}

/// Value of a single stat at `now`, in `[0, 100]`.
///
/// A reset instant in the future (clock skew) reads as full rather than
/// above 100.
pub fn calculate_stat_value(last_reset: DateTime<Utc>, now: DateTime<Utc>) -> u8 {
    let elapsed_hours = (now - last_reset).num_milliseconds() as f64 / MS_PER_HOUR;
    let value = 100.0 - (elapsed_hours / HOURS_TO_ZERO as f64) * 100.0;
    value.round().clamp(0.0, STAT_MAX as f64) as u8
}

pub fn compute_all_stats(timestamps: &StatTimestamps, now: DateTime<Utc>) -> Stats {
    Stats {
        hunger: calculate_stat_value(timestamps.hunger_last_reset, now),
        fun: calculate_stat_value(timestamps.fun_last_reset, now),
        energy: calculate_stat_value(timestamps.energy_last_reset, now),
    }
}

/// Back-dates `stat` so that it reads exactly `target` at `now`.
/// The other two stats keep their instants.
pub fn boost_stat(
    timestamps: &StatTimestamps,
    stat: Stat,
    target: u8,
    now: DateTime<Utc>,
) -> StatTimestamps {
    let target = target.min(STAT_MAX);
    let back = ChronoDuration::milliseconds(i64::from(STAT_MAX - target) * MS_PER_POINT);
    let mut out = *timestamps;
    out.set(stat, now - back);
    out
}

/// Adds a signed delta to the current value of `stat` and re-anchors it.
pub fn adjust_stat(
    timestamps: &StatTimestamps,
    stat: Stat,
    delta: i32,
    now: DateTime<Utc>,
) -> StatTimestamps {
    let current = i32::from(calculate_stat_value(timestamps.get(stat), now));
    let target = (current + delta).clamp(0, i32::from(STAT_MAX)) as u8;
    boost_stat(timestamps, stat, target, now)
}

pub fn reset_all_to_full(now: DateTime<Utc>) -> StatTimestamps {
    StatTimestamps::new(now)
}
