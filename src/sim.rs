use crate::daily::DAILY_GOAL_REWARD;
use crate::events::{format_remaining, EventAction, EventKind, EventOutcome, RandomEvent};
use crate::evolution::{emotional_state, evolution_stage, EmotionalState, EvolutionStage};
use crate::level::{calculate_level, format_steps};
use crate::model::{GameState, Rules};
use crate::notifications::{Notification, NotificationKind, NotificationSettings};
use crate::shop::{self, Category, Item};
use crate::stats::{adjust_stat, boost_stat, compute_all_stats, Stat, Stats, STAT_MAX};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use std::fmt;
use tracing::{debug, info};

/// Hunger lost over a nap.
const SLEEP_HUNGER_COST: i32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    Walk(u64),
    Feed(Option<String>),
    Play(Option<String>),
    Sleep,
    Buy(String),
    /// Catch, clean or swat the live event.
    Tap,
    /// The live event's countdown ran out.
    TimeUp,
    ClaimBonus,
    SetGoal(u64),
    ReadAllNotifications,
    ClearNotifications,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Feedback {
    Walked { steps: u64, total_steps: u64 },
    GoalReached { daily_steps: u64, coins: u64 },
    LevelUp(u32),
    Evolved(EvolutionStage),
    Fed { item: String, amount: u8, hunger: u8 },
    Played { item: String, amount: u8, fun: u8 },
    Slept { energy: u8, hunger: u8 },
    NoItem(Category),
    UnknownItem(String),
    WrongCategory { item: String, expected: Category },
    Bought { item: String, price: u64 },
    NotEnoughCoins { price: u64, coins: u64 },
    Event(EventOutcome),
    EventStillActive(EventKind),
    NoEvent,
    BonusClaimed(Vec<Item>),
    BonusNotReady(ChronoDuration),
    GoalSet { goal: u64, reached: bool },
    NotificationsRead,
    NotificationsCleared,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Walked { steps, total_steps } => write!(
                f,
                "Walked {} steps ({} total)",
                format_steps(*steps),
                format_steps(*total_steps)
            ),
            Feedback::GoalReached { daily_steps, coins } => write!(
                f,
                "🎉 Daily goal achieved at {} steps! +{coins} coins",
                format_steps(*daily_steps)
            ),
            Feedback::LevelUp(level) => write!(f, "🎊 Level up! Level {level}"),
            Feedback::Evolved(stage) => write!(f, "✨ Papi evolved into the {stage} stage!"),
            Feedback::Fed { item, amount, hunger } => {
                write!(f, "Fed Papi with {item}! Hunger +{amount} (now {hunger})")
            }
            Feedback::Played { item, amount, fun } => {
                write!(f, "Played with {item}! Fun +{amount} (now {fun})")
            }
            Feedback::Slept { energy, hunger } => {
                write!(f, "Papi is sleeping! 💤 Energy {energy}, hunger {hunger}")
            }
            Feedback::NoItem(cat) => write!(f, "No {cat} in the inventory"),
            Feedback::UnknownItem(id) => write!(f, "Unknown item `{id}`"),
            Feedback::WrongCategory { item, expected } => {
                write!(f, "{item} is not {expected}")
            }
            Feedback::Bought { item, price } => write!(f, "Bought {item} for {price} coins"),
            Feedback::NotEnoughCoins { price, coins } => {
                write!(f, "Not enough coins: need {price}, have {coins}")
            }
            Feedback::Event(outcome) => {
                let e = outcome.effect;
                write!(f, "{} {:?}", outcome.kind, outcome.resolution)?;
                if e.coins > 0 {
                    write!(f, " +{} coins", e.coins)?;
                }
                if e.fun != 0 {
                    write!(f, " fun {:+}", e.fun)?;
                }
                if e.energy != 0 {
                    write!(f, " energy {:+}", e.energy)?;
                }
                Ok(())
            }
            Feedback::EventStillActive(kind) => write!(f, "The {kind} is still there"),
            Feedback::NoEvent => f.write_str("Nothing to tap"),
            Feedback::BonusClaimed(items) => {
                let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
                write!(f, "Daily bonus! 🎁 You received {}", names.join(" and "))
            }
            Feedback::BonusNotReady(left) => {
                write!(f, "Next bonus in {}", format_remaining(*left))
            }
            Feedback::GoalSet { goal, reached } => write!(
                f,
                "Daily goal set to {}{}",
                format_steps(*goal),
                if *reached { " (already reached)" } else { "" }
            ),
            Feedback::NotificationsRead => f.write_str("All notifications marked read"),
            Feedback::NotificationsCleared => f.write_str("Notifications cleared"),
        }
    }
}

/// What one poll observed and changed.
#[derive(Clone, Debug, PartialEq)]
pub struct PollReport {
    pub stats: Stats,
    pub mood: EmotionalState,
    pub spawned: Option<RandomEvent>,
    pub timed_out: Option<EventOutcome>,
    /// Notifications raised by this poll: stat alerts, then the bonus reminder.
    pub alerts: Vec<Notification>,
}

impl GameState {
    pub fn stats(&self, now: DateTime<Utc>) -> Stats {
        compute_all_stats(&self.timestamps, now)
    }

    /// Runs one player action. Care that lifts every stat back over the
    /// neglect threshold stops the neglect clock right away.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        action: PlayerAction,
        now: DateTime<Utc>,
        rules: &Rules,
        rng: &mut R,
    ) -> Vec<Feedback> {
        let feedback = self.act(action, now, rules, rng);
        let stats = self.stats(now);
        self.events.track_neglect(&stats, now, rules);
        feedback
    }

    fn act<R: Rng + ?Sized>(
        &mut self,
        action: PlayerAction,
        now: DateTime<Utc>,
        rules: &Rules,
        rng: &mut R,
    ) -> Vec<Feedback> {
        match action {
            PlayerAction::Walk(steps) => self.walk(steps, now, rules),
            PlayerAction::Feed(id) => vec![self.use_item(Category::Food, id, now)],
            PlayerAction::Play(id) => vec![self.use_item(Category::Toys, id, now)],
            PlayerAction::Sleep => {
                self.timestamps = boost_stat(&self.timestamps, Stat::Energy, STAT_MAX, now);
                self.timestamps =
                    adjust_stat(&self.timestamps, Stat::Hunger, -SLEEP_HUNGER_COST, now);
                let s = self.stats(now);
                vec![Feedback::Slept {
                    energy: s.energy,
                    hunger: s.hunger,
                }]
            }
            PlayerAction::Buy(id) => vec![self.buy(&id)],
            PlayerAction::Tap => vec![self.resolve_event(EventAction::Tap, now, rules)],
            PlayerAction::TimeUp => vec![self.resolve_event(EventAction::TimeUp, now, rules)],
            PlayerAction::ClaimBonus => {
                if !self.bonus.is_due(now) {
                    return vec![Feedback::BonusNotReady(self.bonus.time_until_next(now))];
                }
                let items = self.bonus.claim(now, rng);
                info!(count = items.len(), "daily bonus claimed");
                self.pet.inventory.extend(items.iter().cloned());
                vec![Feedback::BonusClaimed(items)]
            }
            PlayerAction::SetGoal(goal) => {
                self.pet.daily.roll_over(rules.local_date(now));
                self.pet.daily.set_goal(goal);
                vec![Feedback::GoalSet {
                    goal: self.pet.daily.goal,
                    reached: self.pet.daily.goal_reached,
                }]
            }
            PlayerAction::ReadAllNotifications => {
                self.notifications.mark_all_read();
                vec![Feedback::NotificationsRead]
            }
            PlayerAction::ClearNotifications => {
                self.notifications.clear();
                vec![Feedback::NotificationsCleared]
            }
        }
    }

    fn walk(&mut self, steps: u64, now: DateTime<Utc>, rules: &Rules) -> Vec<Feedback> {
        let old_level = calculate_level(self.pet.total_steps);
        let old_stage = evolution_stage(self.pet.total_steps);

        self.pet.total_steps = self.pet.total_steps.saturating_add(steps);
        let mut out = vec![Feedback::Walked {
            steps,
            total_steps: self.pet.total_steps,
        }];

        if self.pet.daily.add_steps(steps, rules.local_date(now)) {
            self.pet.coins = self.pet.coins.saturating_add(DAILY_GOAL_REWARD);
            let daily_steps = self.pet.daily.daily_steps;
            self.notifications
                .daily_goal(daily_steps, DAILY_GOAL_REWARD, now);
            info!(daily_steps, "daily goal reached");
            out.push(Feedback::GoalReached {
                daily_steps,
                coins: DAILY_GOAL_REWARD,
            });
        }

        let new_level = calculate_level(self.pet.total_steps);
        if new_level > old_level {
            self.notifications.level_up(new_level, now);
            info!(level = new_level, "level up");
            out.push(Feedback::LevelUp(new_level));
        }

        let new_stage = evolution_stage(self.pet.total_steps);
        if new_stage != old_stage {
            self.notifications.evolution(new_stage.name(), now);
            info!(stage = %new_stage, "evolved");
            out.push(Feedback::Evolved(new_stage));
        }
        out
    }

    fn use_item(&mut self, category: Category, id: Option<String>, now: DateTime<Utc>) -> Feedback {
        let pos = match &id {
            Some(id) => match self.pet.inventory.iter().position(|i| &i.id == id) {
                Some(pos) => pos,
                None => return Feedback::UnknownItem(id.clone()),
            },
            None => match self.pet.inventory.iter().position(|i| i.category == category) {
                Some(pos) => pos,
                None => return Feedback::NoItem(category),
            },
        };
        if self.pet.inventory[pos].category != category {
            return Feedback::WrongCategory {
                item: self.pet.inventory[pos].name.clone(),
                expected: category,
            };
        }

        let item = self.pet.inventory.remove(pos);
        let amount = item.effectiveness();
        let stat = match category {
            Category::Food => Stat::Hunger,
            Category::Toys => Stat::Fun,
        };
        self.timestamps = adjust_stat(&self.timestamps, stat, i32::from(amount), now);
        let value = self.stats(now).get(stat);
        debug!(item = %item.name, %stat, value, "item used");

        match category {
            Category::Food => Feedback::Fed {
                item: item.name,
                amount,
                hunger: value,
            },
            Category::Toys => Feedback::Played {
                item: item.name,
                amount,
                fun: value,
            },
        }
    }

    fn buy(&mut self, id: &str) -> Feedback {
        let Some(entry) = shop::find(id) else {
            return Feedback::UnknownItem(id.to_string());
        };
        if !self.spend(entry.price) {
            return Feedback::NotEnoughCoins {
                price: entry.price,
                coins: self.pet.coins,
            };
        }
        self.pet.inventory.push(entry.to_item());
        Feedback::Bought {
            item: entry.name.to_string(),
            price: entry.price,
        }
    }

    fn resolve_event(&mut self, action: EventAction, now: DateTime<Utc>, rules: &Rules) -> Feedback {
        let Some(event) = self.active_event.take() else {
            return Feedback::NoEvent;
        };
        match event.resolve(action, now, rules) {
            Ok(outcome) => {
                self.apply_outcome(&outcome, now);
                Feedback::Event(outcome)
            }
            Err(event) => {
                let kind = event.kind;
                self.active_event = Some(event);
                Feedback::EventStillActive(kind)
            }
        }
    }

    /// Credits coins and routes stat changes through the decay engine.
    pub fn apply_outcome(&mut self, outcome: &EventOutcome, now: DateTime<Utc>) {
        let e = outcome.effect;
        self.pet.coins = self.pet.coins.saturating_add(e.coins);
        if e.fun != 0 {
            self.timestamps = adjust_stat(&self.timestamps, Stat::Fun, e.fun, now);
        }
        if e.energy != 0 {
            self.timestamps = adjust_stat(&self.timestamps, Stat::Energy, e.energy, now);
        }
        info!(
            event = %outcome.kind,
            resolution = ?outcome.resolution,
            coins = e.coins,
            "event resolved"
        );
    }

    /// A reminder already went out for the bonus that is waiting now.
    fn bonus_reminder_sent(&self) -> bool {
        let since = self.bonus.last_bonus_timestamp;
        self.notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::DailyReward)
            .any(|n| since.map_or(true, |t| n.timestamp >= t))
    }

    /// The once-a-minute tick: settle overdue events, maybe spawn a new
    /// one, raise stat alerts.
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rules: &Rules,
        settings: &NotificationSettings,
        rng: &mut R,
    ) -> PollReport {
        let today = rules.local_date(now);
        self.events.roll_day(today);
        self.pet.daily.roll_over(today);

        let mut timed_out = None;
        if let Some(event) = self.active_event.take() {
            match event.resolve(EventAction::TimeUp, now, rules) {
                Ok(outcome) => {
                    self.apply_outcome(&outcome, now);
                    timed_out = Some(outcome);
                }
                Err(event) => self.active_event = Some(event),
            }
        }

        let stats = self.stats(now);
        // the clock runs whether or not an event is on screen
        self.events.track_neglect(&stats, now, rules);

        let mut spawned = None;
        if self.active_event.is_none() {
            if let Some(kind) = self.events.attempt_spawn(&stats, now, rules, rng) {
                self.events.record_spawn(kind, now, rules);
                let event = RandomEvent::create(kind, now, rules, rng);
                info!(id = %event.id, "event spawned");
                self.active_event = Some(event.clone());
                spawned = Some(event);
            }
        }

        let mut alerts = self.notifications.check_stat_alerts(
            &stats,
            rules.alert_threshold,
            ChronoDuration::minutes(rules.alert_quiet_mins),
            settings,
            now,
        );
        if self.bonus.is_due(now) && !self.bonus_reminder_sent() {
            alerts.extend(self.notifications.daily_reward(settings, now));
        }

        PollReport {
            stats,
            mood: emotional_state(&stats),
            spawned,
            timed_out,
            alerts,
        }
    }
}
