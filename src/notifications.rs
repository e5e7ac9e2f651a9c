//! In-app notification inbox and the alert creators that feed it.
//!
//! The list is kept newest first and never grows past
//! [`MAX_NOTIFICATIONS`]. Creators for optional categories consult
//! [`NotificationSettings`] and return `None` when the category is muted.

use crate::stats::{Stat, Stats};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    HungerAlert,
    EnergyAlert,
    FunAlert,
    DailyGoal,
    FriendRequest,
    FriendActivity,
    Message,
    Evolution,
    ShopUpdate,
    DailyReward,
    LevelUp,
}

impl NotificationKind {
    pub fn alert_for(stat: Stat) -> Self {
        match stat {
            Stat::Hunger => NotificationKind::HungerAlert,
            Stat::Fun => NotificationKind::FunAlert,
            Stat::Energy => NotificationKind::EnergyAlert,
        }
    }
}

/// Independent switches; `all` is kept for the settings screen but does
/// not override the others.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub all: bool,
    pub friend_messages: bool,
    pub papi_status: bool,
    pub daily_reminders: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            all: true,
            friend_messages: true,
            papi_status: true,
            daily_reminders: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationList(Vec<Notification>);

impl NotificationList {
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn add(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        icon: &str,
        action_text: Option<&str>,
        now: DateTime<Utc>,
    ) -> Notification {
        let n = Notification {
            id: format!("notif_{}_{:09x}", now.timestamp_millis(), rand::random::<u32>()),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: now,
            read: false,
            icon: icon.to_string(),
            action_text: action_text.map(str::to_string),
        };
        self.0.insert(0, n.clone());
        self.0.truncate(MAX_NOTIFICATIONS);
        n
    }

    pub fn mark_read(&mut self, id: &str) {
        if let Some(n) = self.0.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.0 {
            n.read = true;
        }
    }

    pub fn delete(&mut self, id: &str) {
        self.0.retain(|n| n.id != id);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn unread_count(&self) -> usize {
        self.0.iter().filter(|n| !n.read).count()
    }

    pub fn stat_alert(
        &mut self,
        stat: Stat,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        if !settings.papi_status {
            return None;
        }
        let (title, message, icon, action) = match stat {
            Stat::Hunger => (
                "Papi is Hungry! 🍖",
                "Your Papi needs food! Feed them to keep them happy and healthy.",
                "🍖",
                "Feed Now",
            ),
            Stat::Energy => (
                "Papi is Tired! 😴",
                "Your Papi is running low on energy. Let them sleep to recharge!",
                "😴",
                "Sleep Now",
            ),
            Stat::Fun => (
                "Papi Needs Fun! 🎾",
                "Your Papi is getting bored! Play with them to boost their mood.",
                "🎾",
                "Play Now",
            ),
        };
        Some(self.add(
            NotificationKind::alert_for(stat),
            title,
            message,
            icon,
            Some(action),
            now,
        ))
    }

    pub fn daily_goal(&mut self, steps: u64, reward: u64, now: DateTime<Utc>) -> Notification {
        self.add(
            NotificationKind::DailyGoal,
            "Daily Goal Achieved! 🎉",
            format!(
                "Congratulations! You reached {} steps and earned {} coins!",
                crate::level::format_steps(steps),
                reward
            ),
            "🎉",
            None,
            now,
        )
    }

    pub fn friend_request(
        &mut self,
        friend: &str,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        if !settings.friend_messages {
            return None;
        }
        Some(self.add(
            NotificationKind::FriendRequest,
            "New Friend Request! 👋",
            format!("{friend} wants to be your friend!"),
            "👋",
            Some("View Request"),
            now,
        ))
    }

    pub fn friend_activity(
        &mut self,
        friend: &str,
        activity: &str,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        if !settings.friend_messages {
            return None;
        }
        Some(self.add(
            NotificationKind::FriendActivity,
            format!("{friend}'s Activity 🌟"),
            activity,
            "🌟",
            None,
            now,
        ))
    }

    pub fn message(
        &mut self,
        from: &str,
        preview: &str,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        if !settings.friend_messages {
            return None;
        }
        Some(self.add(
            NotificationKind::Message,
            format!("New Message from {from} 💌"),
            preview,
            "💌",
            Some("View Message"),
            now,
        ))
    }

    pub fn evolution(&mut self, stage: &str, now: DateTime<Utc>) -> Notification {
        self.add(
            NotificationKind::Evolution,
            "Papi Evolved! ✨",
            format!("Congratulations! Papi reached the {stage} stage!"),
            "✨",
            None,
            now,
        )
    }

    pub fn level_up(&mut self, level: u32, now: DateTime<Utc>) -> Notification {
        self.add(
            NotificationKind::LevelUp,
            "Level Up! 🎊",
            format!("Amazing! You reached level {level}!"),
            "🎊",
            None,
            now,
        )
    }

    pub fn shop_update(&mut self, item: &str, now: DateTime<Utc>) -> Notification {
        self.add(
            NotificationKind::ShopUpdate,
            "New Item in Shop! 🛍️",
            format!("{item} is now available in the shop!"),
            "🛍️",
            Some("Visit Shop"),
            now,
        )
    }

    pub fn daily_reward(
        &mut self,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        if !settings.daily_reminders {
            return None;
        }
        Some(self.add(
            NotificationKind::DailyReward,
            "Daily Reward Ready! 🎁",
            "Your daily reward is waiting for you! Log in to claim it.",
            "🎁",
            Some("Claim Now"),
            now,
        ))
    }

    /// Raises an alert for each stat under `threshold`, unless one of the
    /// same type went out within `quiet`.
    pub fn check_stat_alerts(
        &mut self,
        stats: &Stats,
        threshold: u8,
        quiet: ChronoDuration,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Vec<Notification> {
        let mut created = Vec::new();
        // same order the inbox has always raised them in
        for stat in [Stat::Hunger, Stat::Energy, Stat::Fun] {
            if stats.get(stat) >= threshold {
                continue;
            }
            let kind = NotificationKind::alert_for(stat);
            let recent = self
                .0
                .iter()
                .any(|n| n.kind == kind && now - n.timestamp < quiet);
            if recent {
                continue;
            }
            if let Some(n) = self.stat_alert(stat, settings, now) {
                created.push(n);
            }
        }
        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 2, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_newest_first_and_capped() {
        let mut list = NotificationList::default();
        for i in 0..60 {
            list.level_up(i, now() + ChronoDuration::seconds(i64::from(i)));
        }
        assert_eq!(list.len(), MAX_NOTIFICATIONS);
        let first = list.iter().next().unwrap();
        assert_eq!(first.message, "Amazing! You reached level 59!");
        let last = list.iter().last().unwrap();
        assert_eq!(last.message, "Amazing! You reached level 10!");
    }

    #[test]
    fn test_read_delete_clear() {
        let mut list = NotificationList::default();
        let a = list.level_up(1, now());
        let b = list.level_up(2, now());
        assert_eq!(list.unread_count(), 2);
        list.mark_read(&a.id);
        assert_eq!(list.unread_count(), 1);
        list.delete(&b.id);
        assert_eq!(list.len(), 1);
        list.level_up(3, now());
        list.mark_all_read();
        assert_eq!(list.unread_count(), 0);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_gates() {
        let mut list = NotificationList::default();
        let muted = NotificationSettings {
            all: true,
            friend_messages: false,
            papi_status: false,
            daily_reminders: false,
        };
        assert!(list.stat_alert(Stat::Hunger, &muted, now()).is_none());
        assert!(list.friend_request("Mimi", &muted, now()).is_none());
        assert!(list.friend_activity("Mimi", "walked 5k", &muted, now()).is_none());
        assert!(list.message("Mimi", "hi!", &muted, now()).is_none());
        assert!(list.daily_reward(&muted, now()).is_none());
        assert!(list.is_empty());

        let open = NotificationSettings::default();
        let req = list.friend_request("Mimi", &open, now()).unwrap();
        assert_eq!(req.message, "Mimi wants to be your friend!");
        assert_eq!(req.action_text.as_deref(), Some("View Request"));
    }

    #[test]
    fn test_stat_alerts_are_rate_limited() {
        let mut list = NotificationList::default();
        let settings = NotificationSettings::default();
        let stats = Stats { hunger: 20, fun: 90, energy: 10 };
        let quiet = ChronoDuration::hours(1);

        let first = list.check_stat_alerts(&stats, 30, quiet, &settings, now());
        let kinds: Vec<_> = first.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::HungerAlert, NotificationKind::EnergyAlert]);

        let again = list.check_stat_alerts(&stats, 30, quiet, &settings, now() + ChronoDuration::minutes(59));
        assert!(again.is_empty());

        let later = list.check_stat_alerts(&stats, 30, quiet, &settings, now() + ChronoDuration::minutes(61));
        assert_eq!(later.len(), 2);
    }

    #[test]
    fn test_json_shape() {
        let mut list = NotificationList::default();
        list.daily_goal(10_500, 300, now());
        let v = serde_json::to_value(&list).unwrap();
        let n = &v[0];
        assert_eq!(n["type"], "daily_goal");
        assert_eq!(n["timestamp"], now().timestamp_millis());
        assert_eq!(n["read"], false);
        assert_eq!(n["message"], "Congratulations! You reached 10,500 steps and earned 300 coins!");
        assert!(n.get("actionText").is_none());
    }
}
