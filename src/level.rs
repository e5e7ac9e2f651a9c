//! Step-driven levels.
//!
//! Each level costs twice the steps of the previous one:
//! level 1 at 1,000 total steps, level 2 at 3,000, level 3 at 7,000, ...

use serde::{Deserialize, Serialize};

pub const BASE_STEPS: u64 = 1000;

/// Total steps needed to reach `level`, `BASE * (2^level - 1)`.
/// Saturates at `u64::MAX` for absurd levels.
pub fn steps_for_level(level: u32) -> u64 {
    if level == 0 {
        return 0;
    }
    BASE_STEPS.saturating_mul(2u64.saturating_pow(level).saturating_sub(1))
}

/// Steps between `current_level` and the one after it, `BASE * 2^current_level`.
pub fn steps_for_next_level(current_level: u32) -> u64 {
    BASE_STEPS.saturating_mul(2u64.saturating_pow(current_level))
}

/// `floor(log2(total_steps / BASE + 1))`, computed on integers so level
/// boundaries are exact.
pub fn calculate_level(total_steps: u64) -> u32 {
    if total_steps < BASE_STEPS {
        return 0;
    }
    // 2^n <= steps/BASE + 1  <=>  2^n <= floor((steps + BASE) / BASE)
    (total_steps.saturating_add(BASE_STEPS) / BASE_STEPS).ilog2()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub current_level: u32,
    pub next_level: u32,
    pub current_level_steps: u64,
    pub next_level_steps: u64,
    pub steps_in_current_level: u64,
    pub steps_needed_for_next: u64,
    pub progress_percentage: f64,
}

pub fn level_progress(total_steps: u64) -> LevelProgress {
    let current_level = calculate_level(total_steps);
    let next_level = current_level + 1;
    let current_level_steps = steps_for_level(current_level);
    let next_level_steps = steps_for_level(next_level);

    let steps_in_current_level = total_steps.saturating_sub(current_level_steps);
    let steps_needed_for_next = next_level_steps.saturating_sub(current_level_steps);

    let progress_percentage = if steps_needed_for_next == 0 {
        100.0
    } else {
        (steps_in_current_level as f64 / steps_needed_for_next as f64 * 100.0).clamp(0.0, 100.0)
    };

    LevelProgress {
        current_level,
        next_level,
        current_level_steps,
        next_level_steps,
        steps_in_current_level,
        steps_needed_for_next,
        progress_percentage,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub level: u32,
    pub total_steps: u64,
    pub steps_for_level: u64,
}

/// Milestones for levels `1..=count`.
pub fn level_milestones(count: u32) -> Vec<Milestone> {
    (1..=count)
        .map(|level| Milestone {
            level,
            total_steps: steps_for_level(level),
            steps_for_level: steps_for_next_level(level - 1),
        })
        .collect()
}

/// `12345` -> `"12,345"`.
pub fn format_steps(steps: u64) -> String {
    let digits = steps.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
