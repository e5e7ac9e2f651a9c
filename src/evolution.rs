//! Growth stages from cumulative steps, plus the mood shown on top of them.

use crate::stats::Stats;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BABY_MIN_STEPS: u64 = 10_001;
pub const TEENAGER_MIN_STEPS: u64 = 20_001;
pub const ADULT_MIN_STEPS: u64 = 30_001;

/// Mood thresholds for the negative states.
pub const LOW_STAT: u8 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvolutionStage {
    Birth,
    Baby,
    Teenager,
    Adult,
}

impl EvolutionStage {
    pub fn next(self) -> Option<EvolutionStage> {
        match self {
            EvolutionStage::Birth => Some(EvolutionStage::Baby),
            EvolutionStage::Baby => Some(EvolutionStage::Teenager),
            EvolutionStage::Teenager => Some(EvolutionStage::Adult),
            EvolutionStage::Adult => None,
        }
    }

    /// Inclusive step range of the stage; adult is open-ended.
    pub fn bounds(self) -> (u64, Option<u64>) {
        match self {
            EvolutionStage::Birth => (0, Some(BABY_MIN_STEPS - 1)),
            EvolutionStage::Baby => (BABY_MIN_STEPS, Some(TEENAGER_MIN_STEPS - 1)),
            EvolutionStage::Teenager => (TEENAGER_MIN_STEPS, Some(ADULT_MIN_STEPS - 1)),
            EvolutionStage::Adult => (ADULT_MIN_STEPS, None),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EvolutionStage::Birth => "birth",
            EvolutionStage::Baby => "baby",
            EvolutionStage::Teenager => "teenager",
            EvolutionStage::Adult => "adult",
        }
    }
}

impl fmt::Display for EvolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// What the pet looks like. `Evolved` is never stored; it only replaces
/// `Adult` while the daily goal is met.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStage {
    Birth,
    Baby,
    Teenager,
    Adult,
    Evolved,
}

impl From<EvolutionStage> for DisplayStage {
    fn from(stage: EvolutionStage) -> Self {
        match stage {
            EvolutionStage::Birth => DisplayStage::Birth,
            EvolutionStage::Baby => DisplayStage::Baby,
            EvolutionStage::Teenager => DisplayStage::Teenager,
            EvolutionStage::Adult => DisplayStage::Adult,
        }
    }
}

impl fmt::Display for DisplayStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayStage::Birth => "birth",
            DisplayStage::Baby => "baby",
            DisplayStage::Teenager => "teenager",
            DisplayStage::Adult => "adult",
            DisplayStage::Evolved => "evolved",
        };
        f.pad(s)
    }
}

pub fn evolution_stage(total_steps: u64) -> EvolutionStage {
    if total_steps >= ADULT_MIN_STEPS {
        EvolutionStage::Adult
    } else if total_steps >= TEENAGER_MIN_STEPS {
        EvolutionStage::Teenager
    } else if total_steps >= BABY_MIN_STEPS {
        EvolutionStage::Baby
    } else {
        EvolutionStage::Birth
    }
}

pub fn display_stage(total_steps: u64, daily_goal_reached: bool) -> DisplayStage {
    match evolution_stage(total_steps) {
        EvolutionStage::Adult if daily_goal_reached => DisplayStage::Evolved,
        stage => stage.into(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionProgress {
    pub current_stage: EvolutionStage,
    pub steps_in_stage: u64,
    pub steps_needed_for_stage: u64,
    pub percentage_in_stage: f64,
    pub next_stage: Option<EvolutionStage>,
    pub steps_to_next_stage: u64,
}

pub fn evolution_progress(total_steps: u64) -> EvolutionProgress {
    let current_stage = evolution_stage(total_steps);
    let (min, max) = current_stage.bounds();
    let steps_in_stage = total_steps - min;

    match max {
        // adult: no further bar, the caller shows the daily goal instead
        None => EvolutionProgress {
            current_stage,
            steps_in_stage,
            steps_needed_for_stage: 1,
            percentage_in_stage: 100.0,
            next_stage: None,
            steps_to_next_stage: 0,
        },
        Some(max) => {
            let steps_needed_for_stage = max - min;
            EvolutionProgress {
                current_stage,
                steps_in_stage,
                steps_needed_for_stage,
                percentage_in_stage: (steps_in_stage as f64 / steps_needed_for_stage as f64
                    * 100.0)
                    .clamp(0.0, 100.0),
                next_stage: current_stage.next(),
                steps_to_next_stage: max.saturating_sub(total_steps),
            }
        }
    }
}

/// Daily goal bar shown once the pet is an adult.
pub fn daily_goal_progress(daily_steps: u64, goal: u64) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    (daily_steps as f64 / goal as f64 * 100.0).min(100.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalState {
    Normal,
    Hungry,
    Sleepy,
    Sad,
    Full,
    Excited,
}

impl fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmotionalState::Normal => "normal",
            EmotionalState::Hungry => "hungry",
            EmotionalState::Sleepy => "sleepy",
            EmotionalState::Sad => "sad",
            EmotionalState::Full => "full",
            EmotionalState::Excited => "excited",
        };
        f.pad(s)
    }
}

/// First matching rule wins: excited, full, hungry, sleepy, sad, normal.
pub fn emotional_state(stats: &Stats) -> EmotionalState {
    if stats.fun >= 100 {
        return EmotionalState::Excited;
    }
    if stats.hunger >= 100 {
        return EmotionalState::Full;
    }
    if stats.hunger < LOW_STAT {
        return EmotionalState::Hungry;
    }
    if stats.energy < LOW_STAT {
        return EmotionalState::Sleepy;
    }
    if stats.fun < LOW_STAT {
        return EmotionalState::Sad;
    }
    EmotionalState::Normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(hunger: u8, fun: u8, energy: u8) -> Stats {
        Stats { hunger, fun, energy }
    }

    #[test]
    fn test_stage_boundaries() {
        assert_eq!(evolution_stage(0), EvolutionStage::Birth);
        assert_eq!(evolution_stage(10_000), EvolutionStage::Birth);
        assert_eq!(evolution_stage(10_001), EvolutionStage::Baby);
        assert_eq!(evolution_stage(20_000), EvolutionStage::Baby);
        assert_eq!(evolution_stage(20_001), EvolutionStage::Teenager);
        assert_eq!(evolution_stage(30_000), EvolutionStage::Teenager);
        assert_eq!(evolution_stage(30_001), EvolutionStage::Adult);
        assert_eq!(evolution_stage(u64::MAX), EvolutionStage::Adult);
    }

    #[test]
    fn test_evolved_only_for_adults_with_goal() {
        assert_eq!(display_stage(30_001, true), DisplayStage::Evolved);
        assert_eq!(display_stage(30_001, false), DisplayStage::Adult);
        assert_eq!(display_stage(25_000, true), DisplayStage::Teenager);
        assert_eq!(display_stage(0, true), DisplayStage::Birth);
    }

    #[test]
    fn test_progress_in_birth() {
        let p = evolution_progress(5_000);
        assert_eq!(p.current_stage, EvolutionStage::Birth);
        assert_eq!(p.steps_in_stage, 5_000);
        assert_eq!(p.steps_needed_for_stage, 10_000);
        assert!((p.percentage_in_stage - 50.0).abs() < 1e-9);
        assert_eq!(p.next_stage, Some(EvolutionStage::Baby));
        assert_eq!(p.steps_to_next_stage, 5_000);
    }

    #[test]
    fn test_progress_in_teenager() {
        let p = evolution_progress(20_001);
        assert_eq!(p.current_stage, EvolutionStage::Teenager);
        assert_eq!(p.steps_in_stage, 0);
        assert_eq!(p.steps_needed_for_stage, 9_999);
        assert_eq!(p.next_stage, Some(EvolutionStage::Adult));
        assert_eq!(p.steps_to_next_stage, 9_999);
    }

    #[test]
    fn test_adult_progress_is_pinned() {
        let p = evolution_progress(250_000);
        assert_eq!(p.current_stage, EvolutionStage::Adult);
        assert_eq!(p.percentage_in_stage, 100.0);
        assert_eq!(p.next_stage, None);
        assert_eq!(p.steps_to_next_stage, 0);
    }

    #[test]
    fn test_daily_goal_progress() {
        assert_eq!(daily_goal_progress(5_000, 10_000), 50.0);
        assert_eq!(daily_goal_progress(15_000, 10_000), 100.0);
        assert_eq!(daily_goal_progress(15_000, 0), 0.0);
    }

    #[test]
    fn test_emotional_priority() {
        assert_eq!(emotional_state(&stats(100, 100, 10)), EmotionalState::Excited);
        assert_eq!(emotional_state(&stats(100, 10, 10)), EmotionalState::Full);
        assert_eq!(emotional_state(&stats(20, 80, 90)), EmotionalState::Hungry);
        assert_eq!(emotional_state(&stats(20, 10, 10)), EmotionalState::Hungry);
        assert_eq!(emotional_state(&stats(50, 10, 10)), EmotionalState::Sleepy);
        assert_eq!(emotional_state(&stats(50, 10, 50)), EmotionalState::Sad);
        assert_eq!(emotional_state(&stats(50, 30, 30)), EmotionalState::Normal);
    }
}
