use crate::daily::{DailyBonusState, DailyProgress, DEFAULT_DAILY_GOAL};
use crate::events::{EventConfig, EventKind, EventState, RandomEvent};
use crate::notifications::NotificationList;
use crate::shop::Item;
use crate::stats::{reset_all_to_full, StatTimestamps};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SAVE_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rules {
    pub poll_interval_secs: u64,
    /// Offset used to decide which calendar day an instant falls on.
    pub day_offset_secs: i32,
    pub neglect_threshold: u8,
    pub neglect_hours: i64,
    pub alert_threshold: u8,
    pub alert_quiet_mins: i64,
    pub events: BTreeMap<EventKind, EventConfig>,
}

impl Default for Rules {
    fn default() -> Self {
        let events = EventKind::ALL
            .iter()
            .map(|k| (*k, EventConfig::standard(*k)))
            .collect();

        Self {
            poll_interval_secs: 60,
            day_offset_secs: 0,
            neglect_threshold: 30,
            neglect_hours: 12,
            alert_threshold: 30,
            alert_quiet_mins: 60,
            events,
        }
    }
}

impl Rules {
    pub fn with_day_offset(mut self, offset: FixedOffset) -> Self {
        self.day_offset_secs = offset.local_minus_utc();
        self
    }

    pub fn day_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.day_offset_secs).unwrap_or_else(|| Utc.fix())
    }

    /// Calendar date of `now` in the configured offset.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.day_offset()).date_naive()
    }

    pub fn event(&self, kind: EventKind) -> EventConfig {
        self.events
            .get(&kind)
            .copied()
            .unwrap_or_else(|| EventConfig::standard(kind))
    }
}

/// The part of the pet saved in `save.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    pub coins: u64,
    pub total_steps: u64,
    pub daily: DailyProgress,
    #[serde(default)]
    pub inventory: Vec<Item>,
}

impl Pet {
    pub fn new_default(today: NaiveDate) -> Self {
        Self {
            name: "Papi".to_string(),
            coins: 0,
            total_steps: 0,
            daily: DailyProgress::new(today, DEFAULT_DAILY_GOAL),
            inventory: Vec::new(),
        }
    }
}

/// Everything one session threads through the engines.
#[derive(Clone, Debug)]
pub struct GameState {
    pub pet: Pet,
    pub timestamps: StatTimestamps,
    pub events: EventState,
    pub bonus: DailyBonusState,
    pub notifications: NotificationList,
    /// The event on screen, if any. At most one is live at a time.
    pub active_event: Option<RandomEvent>,
}

impl GameState {
    pub fn new(now: DateTime<Utc>, rules: &Rules) -> Self {
        let today = rules.local_date(now);
        Self {
            pet: Pet::new_default(today),
            timestamps: reset_all_to_full(now),
            events: EventState::new(today),
            bonus: DailyBonusState::default(),
            notifications: NotificationList::default(),
            active_event: None,
        }
    }

    pub fn spend(&mut self, amount: u64) -> bool {
        if self.pet.coins < amount {
            return false;
        }
        self.pet.coins -= amount;
        true
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub last_seen_utc: DateTime<Utc>,
    pub pet: Pet,
}
