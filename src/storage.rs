//! One JSON file per engine, written tmp-then-rename.
//!
//! A missing or corrupt file is re-seeded from defaults instead of failing
//! the load.

use crate::config::Settings;
use crate::events::RandomEvent;
use crate::model::{GameState, Rules, SaveFile, SAVE_VERSION};
use crate::sim::PollReport;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub const STATS_FILE: &str = "stats.json";
pub const EVENTS_FILE: &str = "events.json";
pub const BONUS_FILE: &str = "daily_bonus.json";
pub const NOTIFICATIONS_FILE: &str = "notifications.json";
pub const SAVE_FILE: &str = "save.json";
pub const ACTIVE_EVENT_FILE: &str = "active_event.json";

/// Reads `path` as `T`, or `None` when it is absent or unreadable.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let s = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<T>(&s) {
        Ok(v) => Some(v),
        Err(err) => {
            warn!(path = %path.display(), %err, "corrupt state file, re-seeding");
            None
        }
    }
}

pub fn save_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, data)?;
    // rename replaces the old file in one step; readers never see it missing
    fs::rename(&tmp, path)
        .with_context(|| format!("could not move {} into place", path.display()))?;
    Ok(())
}

pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Loads every engine's state, seeding fresh values for whatever is
    /// missing. Also returns when the game was last saved.
    pub fn load_game(
        &self,
        now: DateTime<Utc>,
        rules: &Rules,
        settings: &Settings,
    ) -> (GameState, Option<DateTime<Utc>>) {
        let mut state = GameState::new(now, rules);
        state.pet.daily.set_goal(settings.daily_goal);

        let mut last_seen = None;
        if let Some(save) = load_json::<SaveFile>(&self.path(SAVE_FILE)) {
            if save.version == SAVE_VERSION {
                state.pet = save.pet;
                last_seen = Some(save.last_seen_utc);
            } else {
                warn!(version = save.version, "unsupported save version, starting over");
            }
        }
        if let Some(ts) = load_json(&self.path(STATS_FILE)) {
            state.timestamps = ts;
        }
        if let Some(ev) = load_json(&self.path(EVENTS_FILE)) {
            state.events = ev;
        }
        if let Some(bonus) = load_json(&self.path(BONUS_FILE)) {
            state.bonus = bonus;
        }
        if let Some(list) = load_json(&self.path(NOTIFICATIONS_FILE)) {
            state.notifications = list;
        }
        state.active_event = load_json::<Option<RandomEvent>>(&self.path(ACTIVE_EVENT_FILE)).flatten();
        debug!(dir = %self.dir.display(), ?last_seen, "game loaded");
        (state, last_seen)
    }

    pub fn save_game(&self, state: &GameState, now: DateTime<Utc>) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        save_atomic(&self.path(STATS_FILE), &state.timestamps)?;
        save_atomic(&self.path(EVENTS_FILE), &state.events)?;
        save_atomic(&self.path(BONUS_FILE), &state.bonus)?;
        save_atomic(&self.path(NOTIFICATIONS_FILE), &state.notifications)?;
        save_atomic(&self.path(ACTIVE_EVENT_FILE), &state.active_event)?;
        save_atomic(
            &self.path(SAVE_FILE),
            &SaveFile {
                version: SAVE_VERSION,
                last_seen_utc: now,
                pet: state.pet.clone(),
            },
        )?;
        Ok(())
    }

    /// Load, poll, save. Reading fresh each time keeps whatever another
    /// command saved since the previous tick.
    pub fn poll_saved<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rules: &Rules,
        settings: &Settings,
        rng: &mut R,
    ) -> Result<(GameState, PollReport)> {
        let (mut state, _) = self.load_game(now, rules, settings);
        let report = state.poll(now, rules, &settings.notifications, rng);
        self.save_game(&state, now)?;
        Ok((state, report))
    }
}
