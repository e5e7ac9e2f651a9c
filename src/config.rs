use crate::daily::DEFAULT_DAILY_GOAL;
use crate::notifications::NotificationSettings;
use crate::storage::save_atomic;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub daily_goal: u64,
    pub notifications: NotificationSettings,
    /// Fixed seed for event rolls; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            notifications: NotificationSettings::default(),
            seed: None,
        }
    }
}

pub struct Paths {
    pub dir: PathBuf,
    pub settings_path: PathBuf,
}

impl Paths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("could not create data directory {}", dir.display()))?;
        Ok(Self {
            settings_path: dir.join("settings.json"),
            dir,
        })
    }
}

pub fn project_paths(override_dir: Option<&Path>) -> Result<Paths> {
    if let Some(dir) = override_dir {
        return Paths::in_dir(dir);
    }
    let proj =
        ProjectDirs::from("com", "papi", "Papi").context("could not resolve project directories")?;
    Paths::in_dir(proj.data_local_dir())
}

pub fn load_settings(path: &Path) -> Settings {
    let Ok(s) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(err) => {
            warn!(path = %path.display(), %err, "unreadable settings, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    save_atomic(path, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::in_dir(dir.path().join("papi")).unwrap();
        assert_eq!(load_settings(&paths.settings_path), Settings::default());

        let s = Settings {
            daily_goal: 8_000,
            seed: Some(42),
            ..Settings::default()
        };
        save_settings_atomic(&paths.settings_path, &s).unwrap();
        assert_eq!(load_settings(&paths.settings_path), s);
        assert!(!paths.settings_path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"daily_goal": 5000}"#).unwrap();
        let s = load_settings(&path);
        assert_eq!(s.daily_goal, 5_000);
        assert!(s.notifications.papi_status);

        fs::write(&path, "not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }
}
