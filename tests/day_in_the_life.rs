use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use papi::config::Settings;
use papi::evolution::{display_stage, DisplayStage, EmotionalState};
use papi::model::{GameState, Rules};
use papi::notifications::{NotificationKind, NotificationSettings};
use papi::sim::{Feedback, PlayerAction};
use papi::storage::Store;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn wake_up() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 7, 0, 0).unwrap()
}

#[test]
fn walk_feed_and_come_back_tomorrow() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path());
    let rules = Rules::default();
    let settings = Settings::default();
    let mut rng = StdRng::seed_from_u64(11);

    let (mut state, last_seen) = store.load_game(wake_up(), &rules, &settings);
    assert!(last_seen.is_none());

    let fb = state.apply(PlayerAction::ClaimBonus, wake_up(), &rules, &mut rng);
    assert!(matches!(fb[0], Feedback::BonusClaimed(_)));

    let noon = wake_up() + ChronoDuration::hours(5);
    let fb = state.apply(PlayerAction::Walk(10_500), noon, &rules, &mut rng);
    assert!(fb.iter().any(|f| matches!(f, Feedback::GoalReached { .. })));
    assert_eq!(state.pet.coins, 300);
    assert_eq!(
        display_stage(state.pet.total_steps, state.pet.daily.goal_reached),
        DisplayStage::Baby
    );

    let fb = state.apply(PlayerAction::Feed(None), noon, &rules, &mut rng);
    assert!(matches!(fb[0], Feedback::Fed { .. }));
    let fb = state.apply(PlayerAction::Play(None), noon, &rules, &mut rng);
    assert!(matches!(fb[0], Feedback::Played { .. }));
    assert!(state.pet.inventory.is_empty());

    store.save_game(&state, noon).unwrap();

    // next morning, nobody has looked after Papi
    let tomorrow = wake_up() + ChronoDuration::hours(24);
    let (mut state, last_seen) = store.load_game(tomorrow, &rules, &settings);
    assert_eq!(last_seen, Some(noon));
    let report = state.poll(
        tomorrow,
        &rules,
        &NotificationSettings::default(),
        &mut StepRng::new(u64::MAX, 0),
    );
    assert_eq!(report.mood, EmotionalState::Hungry);
    assert!(report.spawned.is_none());
    assert!(!state.pet.daily.goal_reached);
    assert_eq!(state.pet.daily.daily_steps, 0);
    assert_eq!(state.pet.coins, 300);
    assert!(state
        .notifications
        .iter()
        .any(|n| n.kind == NotificationKind::HungerAlert));

    // a full day later the bonus is due again
    let fb = state.apply(PlayerAction::ClaimBonus, tomorrow, &rules, &mut rng);
    assert!(matches!(fb[0], Feedback::BonusClaimed(_)));
}

#[test]
fn shopping_runs_through_coins() {
    let rules = Rules::default();
    let mut rng = StepRng::new(u64::MAX, 0);
    let mut state = GameState::new(wake_up(), &rules);
    state.pet.coins = 130;

    let fb = state.apply(PlayerAction::Buy("toy3".into()), wake_up(), &rules, &mut rng);
    assert_eq!(
        fb,
        vec![Feedback::Bought {
            item: "Space Rocket".into(),
            price: 130
        }]
    );
    let fb = state.apply(PlayerAction::Buy("food5".into()), wake_up(), &rules, &mut rng);
    assert_eq!(fb, vec![Feedback::NotEnoughCoins { price: 40, coins: 0 }]);
    let fb = state.apply(PlayerAction::Buy("caviar".into()), wake_up(), &rules, &mut rng);
    assert_eq!(fb, vec![Feedback::UnknownItem("caviar".into())]);
}

#[test]
fn neglect_brings_poop_and_cleaning_pays() {
    let rules = Rules::default();
    let notify = NotificationSettings::default();
    let mut never = StepRng::new(u64::MAX, 0);
    let mut state = GameState::new(wake_up(), &rules);

    // every stat drops under 30 at hour 17; poll hourly from then on
    let mut poop_at = None;
    for hour in 17..40 {
        let now = wake_up() + ChronoDuration::hours(hour);
        let report = state.poll(now, &rules, &notify, &mut never);
        if report.spawned.is_some() {
            poop_at = Some(hour);
            break;
        }
    }
    assert_eq!(poop_at, Some(29));

    let now = wake_up() + ChronoDuration::hours(29);
    let fb = state.apply(PlayerAction::Tap, now, &rules, &mut never);
    assert!(matches!(fb[0], Feedback::Event(_)));
    assert_eq!(state.pet.coins, 20);
}
