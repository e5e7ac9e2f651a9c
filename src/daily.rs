//! Once-a-day economy: the step goal reward and the free bonus items.

use crate::shop::{in_category, Category, Item};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAILY_GOAL: u64 = 10_000;
pub const MIN_DAILY_GOAL: u64 = 3_000;
pub const MAX_DAILY_GOAL: u64 = 30_000;
pub const DAILY_GOAL_REWARD: u64 = 300;

/// Today's walking, reset at local midnight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub daily_steps: u64,
    pub goal: u64,
    pub goal_reached: bool,
    pub reward_claimed: bool,
}

impl DailyProgress {
    pub fn new(today: NaiveDate, goal: u64) -> Self {
        Self {
            date: today,
            daily_steps: 0,
            goal: goal.clamp(MIN_DAILY_GOAL, MAX_DAILY_GOAL),
            goal_reached: false,
            reward_claimed: false,
        }
    }

    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.date == today {
            return false;
        }
        self.date = today;
        self.daily_steps = 0;
        self.goal_reached = false;
        self.reward_claimed = false;
        true
    }

    /// Adds walked steps. Returns true the one time per day the goal is
    /// crossed with its reward still unclaimed.
    pub fn add_steps(&mut self, steps: u64, today: NaiveDate) -> bool {
        self.roll_over(today);
        self.daily_steps = self.daily_steps.saturating_add(steps);
        let was_reached = self.goal_reached;
        self.goal_reached = self.daily_steps >= self.goal;

        let earned = !was_reached && self.goal_reached && !self.reward_claimed;
        if earned {
            self.reward_claimed = true;
        }
        earned
    }

    /// Changing the goal never pays out; the next `add_steps` does.
    pub fn set_goal(&mut self, goal: u64) {
        self.goal = goal.clamp(MIN_DAILY_GOAL, MAX_DAILY_GOAL);
        self.goal_reached = self.daily_steps >= self.goal;
    }
}

/// Persisted as `{lastBonusTimestamp}` in epoch milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBonusState {
    #[serde(with = "crate::epoch_ms_or_zero", default)]
    pub last_bonus_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todays_bonus_items: Option<Vec<Item>>,
}

impl DailyBonusState {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_bonus_timestamp {
            Some(last) => now - last >= ChronoDuration::hours(24),
            None => true,
        }
    }

    /// One random food and one random toy. Stamps `now` as the claim time;
    /// the caller checks [`DailyBonusState::is_due`] first.
    pub fn claim<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Vec<Item> {
        let items: Vec<Item> = [Category::Food, Category::Toys]
            .into_iter()
            .filter_map(|cat| in_category(cat).choose(&mut *rng).map(|e| e.to_item()))
            .collect();
        self.last_bonus_timestamp = Some(now);
        self.todays_bonus_items = Some(items.clone());
        items
    }

    pub fn time_until_next(&self, now: DateTime<Utc>) -> ChronoDuration {
        match self.last_bonus_timestamp {
            Some(last) => (last + ChronoDuration::hours(24) - now).max(ChronoDuration::zero()),
            None => ChronoDuration::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
    }

    #[test]
    fn test_goal_reward_once_per_day() {
        let mut p = DailyProgress::new(day(1), 10_000);
        assert!(!p.add_steps(6_000, day(1)));
        assert!(p.add_steps(4_000, day(1)));
        assert!(p.goal_reached);
        assert!(!p.add_steps(5_000, day(1)));
        assert_eq!(p.daily_steps, 15_000);
    }

    #[test]
    fn test_goal_resets_at_midnight() {
        let mut p = DailyProgress::new(day(1), 10_000);
        assert!(p.add_steps(12_000, day(1)));
        assert!(!p.add_steps(500, day(2)));
        assert_eq!(p.daily_steps, 500);
        assert!(!p.goal_reached);
        assert!(p.add_steps(9_500, day(2)));
    }

    #[test]
    fn test_lowering_goal_marks_reached_without_reward() {
        let mut p = DailyProgress::new(day(1), 10_000);
        p.add_steps(5_000, day(1));
        p.set_goal(4_000);
        assert!(p.goal_reached);
        assert!(!p.reward_claimed);
        assert!(!p.add_steps(100, day(1)));
    }

    #[test]
    fn test_goal_is_clamped() {
        let mut p = DailyProgress::new(day(1), 100);
        assert_eq!(p.goal, MIN_DAILY_GOAL);
        p.set_goal(1_000_000);
        assert_eq!(p.goal, MAX_DAILY_GOAL);
    }

    #[test]
    fn test_bonus_every_24_hours() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut b = DailyBonusState::default();
        assert!(b.is_due(now));

        let items = b.claim(now, &mut rng);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, Category::Food);
        assert_eq!(items[1].category, Category::Toys);
        assert!(items.iter().all(|i| i.effectiveness.is_some()));

        assert!(!b.is_due(now + ChronoDuration::hours(23)));
        assert_eq!(b.time_until_next(now + ChronoDuration::hours(23)), ChronoDuration::hours(1));
        assert!(b.is_due(now + ChronoDuration::hours(24)));
    }

    #[test]
    fn test_bonus_json_shape() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
        let b = DailyBonusState {
            last_bonus_timestamp: Some(now),
            todays_bonus_items: None,
        };
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["lastBonusTimestamp"], now.timestamp_millis());

        let empty: DailyBonusState = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, DailyBonusState::default());
    }
}
