use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use papi::evolution::{
    emotional_state, evolution_progress, evolution_stage, EmotionalState, LOW_STAT,
};
use papi::level::{calculate_level, level_progress, steps_for_level};
use papi::stats::{
    adjust_stat, boost_stat, calculate_stat_value, compute_all_stats, Stat, StatTimestamps, Stats,
};
use proptest::prelude::*;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn arb_stat() -> impl Strategy<Value = Stat> {
    prop_oneof![Just(Stat::Hunger), Just(Stat::Fun), Just(Stat::Energy)]
}

prop_compose! {
    fn arb_stats()(hunger in 0u8..=100, fun in 0u8..=100, energy in 0u8..=100) -> Stats {
        Stats { hunger, fun, energy }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn stat_stays_in_range(offset_ms in -100_000_000i64..500_000_000i64) {
        let v = calculate_stat_value(epoch(), epoch() + ChronoDuration::milliseconds(offset_ms));
        prop_assert!(v <= 100);
    }

    #[test]
    fn stat_never_rises_with_time(a in 0i64..200_000_000, b in 0i64..200_000_000) {
        let (early, late) = (a.min(b), a.max(b));
        let v1 = calculate_stat_value(epoch(), epoch() + ChronoDuration::milliseconds(early));
        let v2 = calculate_stat_value(epoch(), epoch() + ChronoDuration::milliseconds(late));
        prop_assert!(v2 <= v1);
    }

    #[test]
    fn boost_lands_on_target(stat in arb_stat(), target in 0u8..=100, hours in 0i64..72) {
        let ts = StatTimestamps::new(epoch());
        let now = epoch() + ChronoDuration::hours(hours);
        let boosted = boost_stat(&ts, stat, target, now);
        prop_assert_eq!(compute_all_stats(&boosted, now).get(stat), target);
        for other in Stat::ALL.into_iter().filter(|s| *s != stat) {
            prop_assert_eq!(boosted.get(other), ts.get(other));
        }
    }

    #[test]
    fn adjust_is_clamped(stat in arb_stat(), delta in -300i32..300, hours in 0i64..30) {
        let ts = StatTimestamps::new(epoch());
        let now = epoch() + ChronoDuration::hours(hours);
        let before = i32::from(compute_all_stats(&ts, now).get(stat));
        let after = compute_all_stats(&adjust_stat(&ts, stat, delta, now), now).get(stat);
        prop_assert_eq!(i32::from(after), (before + delta).clamp(0, 100));
    }

    #[test]
    fn level_thresholds_are_exact(level in 1u32..50) {
        let at = steps_for_level(level);
        prop_assert_eq!(calculate_level(at), level);
        prop_assert_eq!(calculate_level(at - 1), level - 1);
    }

    #[test]
    fn level_is_monotone(a in 0u64..10_000_000_000, b in 0u64..10_000_000_000) {
        let (lo, hi) = (a.min(b), a.max(b));
        prop_assert!(calculate_level(lo) <= calculate_level(hi));
        let p = level_progress(hi);
        prop_assert!((0.0..=100.0).contains(&p.progress_percentage));
    }

    #[test]
    fn evolution_never_regresses(a in 0u64..100_000, b in 0u64..100_000) {
        let (lo, hi) = (a.min(b), a.max(b));
        prop_assert!(evolution_stage(lo) <= evolution_stage(hi));
        let p = evolution_progress(a);
        prop_assert!((0.0..=100.0).contains(&p.percentage_in_stage));
    }

    #[test]
    fn mood_follows_priority(stats in arb_stats()) {
        let mood = emotional_state(&stats);
        let expected = if stats.fun >= 100 {
            EmotionalState::Excited
        } else if stats.hunger >= 100 {
            EmotionalState::Full
        } else if stats.hunger < LOW_STAT {
            EmotionalState::Hungry
        } else if stats.energy < LOW_STAT {
            EmotionalState::Sleepy
        } else if stats.fun < LOW_STAT {
            EmotionalState::Sad
        } else {
            EmotionalState::Normal
        };
        prop_assert_eq!(mood, expected);
    }
}
