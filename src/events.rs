//! Random room events: flies to catch, poop to clean, spiders to swat.
//!
//! Spawning is gated per kind by a cooldown and a daily cap, then by a
//! per-poll coin flip. A pet left with a low stat for long enough gets a
//! poop without the coin flip. Each spawned [`RandomEvent`] is resolved
//! exactly once; resolving consumes it.

use crate::model::Rules;
use crate::stats::Stats;
use crate::ParseNameError;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Fly,
    Poop,
    Spider,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Fly, EventKind::Poop, EventKind::Spider];

    /// Order in which the random draw visits the kinds.
    pub const DRAW_ORDER: [EventKind; 3] = [EventKind::Fly, EventKind::Spider, EventKind::Poop];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Fly => "fly",
            EventKind::Poop => "poop",
            EventKind::Spider => "spider",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for EventKind {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fly" => Ok(EventKind::Fly),
            "poop" => Ok(EventKind::Poop),
            "spider" => Ok(EventKind::Spider),
            other => Err(ParseNameError::Event(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub reward_coins: u64,
    pub reward_fun: u8,
    pub cooldown_secs: i64,
    pub daily_max: u32,
    pub spawn_chance_per_tick: f64,
    /// Seconds the player has to react; 0 means the event waits forever.
    pub duration_secs: u32,
    pub penalty_fun: u8,
    pub penalty_energy: u8,
    pub rare_item_chance: f64,
}

impl EventConfig {
    pub fn standard(kind: EventKind) -> Self {
        match kind {
            EventKind::Fly => Self {
                reward_coins: 50,
                reward_fun: 0,
                cooldown_secs: 7_200,
                daily_max: 2,
                spawn_chance_per_tick: 0.0008,
                duration_secs: 10,
                penalty_fun: 0,
                penalty_energy: 0,
                rare_item_chance: 0.0,
            },
            EventKind::Poop => Self {
                reward_coins: 20,
                reward_fun: 5,
                cooldown_secs: 28_800,
                daily_max: 2,
                spawn_chance_per_tick: 0.0005,
                duration_secs: 0,
                penalty_fun: 0,
                penalty_energy: 0,
                rare_item_chance: 0.0,
            },
            EventKind::Spider => Self {
                reward_coins: 75,
                reward_fun: 0,
                cooldown_secs: 86_400,
                daily_max: 1,
                spawn_chance_per_tick: 0.00015,
                duration_secs: 4,
                penalty_fun: 15,
                penalty_energy: 10,
                // kept in the table; no item drop is awarded
                rare_item_chance: 0.10,
            },
        }
    }

    pub fn cooldown(&self) -> ChronoDuration {
        ChronoDuration::seconds(self.cooldown_secs)
    }
}

/// One value per event kind, serialized as `{fly, poop, spider}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerKind<T> {
    pub fly: T,
    pub poop: T,
    pub spider: T,
}

impl<T> PerKind<T> {
    pub fn get(&self, kind: EventKind) -> &T {
        match kind {
            EventKind::Fly => &self.fly,
            EventKind::Poop => &self.poop,
            EventKind::Spider => &self.spider,
        }
    }

    pub fn get_mut(&mut self, kind: EventKind) -> &mut T {
        match kind {
            EventKind::Fly => &mut self.fly,
            EventKind::Poop => &mut self.poop,
            EventKind::Spider => &mut self.spider,
        }
    }
}

mod per_kind_epoch_ms {
    use super::PerKind;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Raw(#[serde(with = "crate::epoch_ms_or_zero")] Option<DateTime<Utc>>);

    pub fn serialize<S: Serializer>(
        v: &PerKind<Option<DateTime<Utc>>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        PerKind {
            fly: Raw(v.fly),
            poop: Raw(v.poop),
            spider: Raw(v.spider),
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<PerKind<Option<DateTime<Utc>>>, D::Error> {
        let raw = PerKind::<Raw>::deserialize(d)?;
        Ok(PerKind {
            fly: raw.fly.0,
            poop: raw.poop.0,
            spider: raw.spider.0,
        })
    }
}

/// Cooldowns, daily counts and the neglect clock, persisted as
/// `{lastSpawn, todayCounts, lastResetDate, neglectTimer}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventState {
    #[serde(with = "per_kind_epoch_ms")]
    pub last_spawn: PerKind<Option<DateTime<Utc>>>,
    pub today_counts: PerKind<u32>,
    pub last_reset_date: NaiveDate,
    #[serde(with = "crate::epoch_ms_or_zero")]
    pub neglect_timer: Option<DateTime<Utc>>,
}

impl EventState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            last_spawn: PerKind::default(),
            today_counts: PerKind::default(),
            last_reset_date: today,
            neglect_timer: None,
        }
    }

    /// Zeroes the daily counts when `today` is not the stored date.
    pub fn roll_day(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        self.today_counts = PerKind::default();
        self.last_reset_date = today;
        true
    }

    /// Spawns of `kind` counted against `today`'s cap.
    pub fn count_today(&self, kind: EventKind, today: NaiveDate) -> u32 {
        if self.last_reset_date == today {
            *self.today_counts.get(kind)
        } else {
            0
        }
    }

    pub fn today_counts(&self, today: NaiveDate) -> PerKind<u32> {
        PerKind {
            fly: self.count_today(EventKind::Fly, today),
            poop: self.count_today(EventKind::Poop, today),
            spider: self.count_today(EventKind::Spider, today),
        }
    }

    pub fn can_spawn(&self, kind: EventKind, now: DateTime<Utc>, rules: &Rules) -> bool {
        let cfg = rules.event(kind);
        let cooled = match self.last_spawn.get(kind) {
            Some(last) => now - *last >= cfg.cooldown(),
            None => true,
        };
        cooled && self.count_today(kind, rules.local_date(now)) < cfg.daily_max
    }

    /// Starts the neglect clock at the first sighting of any stat under the
    /// threshold and clears it as soon as every stat is back above it.
    ///
    /// Call after anything that changes stats, not only when spawning.
    pub fn track_neglect(&mut self, stats: &Stats, now: DateTime<Utc>, rules: &Rules) {
        if stats.any_below(rules.neglect_threshold) {
            self.neglect_timer.get_or_insert(now);
        } else {
            self.neglect_timer = None;
        }
    }

    /// Whether neglect has lasted long enough to force a poop.
    pub fn neglect_poop_due(&self, now: DateTime<Utc>, rules: &Rules) -> bool {
        self.neglect_timer.is_some_and(|started| {
            now - started >= ChronoDuration::hours(rules.neglect_hours)
                && self.can_spawn(EventKind::Poop, now, rules)
        })
    }

    /// [`EventState::track_neglect`] then [`EventState::neglect_poop_due`].
    pub fn poop_from_neglect(&mut self, stats: &Stats, now: DateTime<Utc>, rules: &Rules) -> bool {
        self.track_neglect(stats, now, rules);
        self.neglect_poop_due(now, rules)
    }

    /// One poll of the spawner. Returns the kind to spawn, if any; the
    /// caller records it with [`EventState::record_spawn`].
    pub fn attempt_spawn<R: Rng + ?Sized>(
        &mut self,
        stats: &Stats,
        now: DateTime<Utc>,
        rules: &Rules,
        rng: &mut R,
    ) -> Option<EventKind> {
        if self.poop_from_neglect(stats, now, rules) {
            debug!("neglect poop due");
            return Some(EventKind::Poop);
        }

        EventKind::DRAW_ORDER.into_iter().find(|kind| {
            self.can_spawn(*kind, now, rules)
                && rng.gen::<f64>() < rules.event(*kind).spawn_chance_per_tick
        })
    }

    pub fn record_spawn(&mut self, kind: EventKind, now: DateTime<Utc>, rules: &Rules) {
        self.roll_day(rules.local_date(now));
        *self.last_spawn.get_mut(kind) = Some(now);
        *self.today_counts.get_mut(kind) += 1;
    }

    /// Time left on `kind`'s cooldown; zero when it may spawn again.
    pub fn time_until_next_spawn(
        &self,
        kind: EventKind,
        now: DateTime<Utc>,
        rules: &Rules,
    ) -> ChronoDuration {
        match self.last_spawn.get(kind) {
            Some(last) => (*last + rules.event(kind).cooldown() - now).max(ChronoDuration::zero()),
            None => ChronoDuration::zero(),
        }
    }
}

/// `"Available now!"`, `"3h 12m"` or `"45m"`.
pub fn format_remaining(d: ChronoDuration) -> String {
    if d <= ChronoDuration::zero() {
        return "Available now!".to_string();
    }
    let hours = d.num_hours();
    let minutes = d.num_minutes() % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomEvent {
    pub id: String,
    pub kind: EventKind,
    pub spawned_at: DateTime<Utc>,
    pub duration_secs: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventAction {
    /// Catch the fly, clean the poop, swat the spider.
    Tap,
    /// The on-screen countdown ran out.
    TimeUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Caught,
    Cleaned,
    Defeated,
    Expired,
    Bitten,
}

/// Currency and stat deltas for the host to apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEffect {
    pub coins: u64,
    pub fun: i32,
    pub energy: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventOutcome {
    pub event_id: String,
    pub kind: EventKind,
    pub resolution: Resolution,
    pub effect: EventEffect,
}

impl RandomEvent {
    pub fn create<R: Rng + ?Sized>(
        kind: EventKind,
        now: DateTime<Utc>,
        rules: &Rules,
        rng: &mut R,
    ) -> Self {
        Self {
            id: format!("{}_{}_{:08x}", kind, now.timestamp_millis(), rng.gen::<u32>()),
            kind,
            spawned_at: now,
            duration_secs: rules.event(kind).duration_secs,
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        if self.duration_secs == 0 {
            return None;
        }
        Some(self.spawned_at + ChronoDuration::seconds(i64::from(self.duration_secs)))
    }

    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        self.deadline().is_some_and(|d| now > d)
    }

    /// Settles the event. A `TimeUp` that arrives before the deadline, or
    /// for an event with no deadline, hands the event back untouched.
    pub fn resolve(
        self,
        action: EventAction,
        now: DateTime<Utc>,
        rules: &Rules,
    ) -> Result<EventOutcome, RandomEvent> {
        let cfg = rules.event(self.kind);
        let in_time = !self.is_timed_out(now);

        let (resolution, effect) = match (self.kind, action) {
            (EventKind::Poop, EventAction::Tap) => (
                Resolution::Cleaned,
                EventEffect {
                    coins: cfg.reward_coins,
                    fun: i32::from(cfg.reward_fun),
                    energy: 0,
                },
            ),
            (EventKind::Poop, EventAction::TimeUp) => return Err(self),
            (_, EventAction::TimeUp) if in_time => return Err(self),
            (EventKind::Fly, EventAction::Tap) if in_time => (
                Resolution::Caught,
                EventEffect {
                    coins: cfg.reward_coins,
                    ..EventEffect::default()
                },
            ),
            (EventKind::Fly, _) => (Resolution::Expired, EventEffect::default()),
            (EventKind::Spider, EventAction::Tap) if in_time => (
                Resolution::Defeated,
                EventEffect {
                    coins: cfg.reward_coins,
                    ..EventEffect::default()
                },
            ),
            (EventKind::Spider, _) => (
                Resolution::Bitten,
                EventEffect {
                    coins: 0,
                    fun: -i32::from(cfg.penalty_fun),
                    energy: -i32::from(cfg.penalty_energy),
                },
            ),
        };

        Ok(EventOutcome {
            event_id: self.id,
            kind: self.kind,
            resolution,
            effect,
        })
    }
}
