use anyhow::Result;
use chrono::{DateTime, Local, Offset, Utc};
use clap::{Parser, Subcommand};
use papi::config::{load_settings, project_paths, save_settings_atomic, Settings};
use papi::events::{format_remaining, EventKind};
use papi::evolution::{daily_goal_progress, display_stage, emotional_state, evolution_progress};
use papi::level::{format_steps, level_milestones, level_progress};
use papi::model::{GameState, Rules};
use papi::sim::{Feedback, PlayerAction, PollReport};
use papi::storage::Store;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "papi")]
#[command(about = "A virtual pet that grows with your steps")]
struct Cli {
    /// Directory holding the save files (defaults to the platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show stats, mood, level and today's progress
    Status,
    /// Record walked steps
    Walk { steps: u64 },
    /// Feed an item from the inventory (first food if omitted)
    Feed { item: Option<String> },
    /// Play with a toy from the inventory (first toy if omitted)
    Play { item: Option<String> },
    /// Put Papi to sleep: full energy, a little hungrier
    Sleep,
    /// Buy an item from the shop
    Buy { item: Option<String> },
    /// Catch, clean or swat the current event
    Tap,
    /// Let the current event's countdown run out
    Expire,
    /// Run one poll now
    Tick,
    /// Keep polling until interrupted
    Watch {
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Stop after this many polls
        #[arg(long)]
        polls: Option<u64>,
    },
    /// Claim the daily bonus items
    Bonus,
    /// Set the daily step goal
    Goal { steps: u64 },
    /// List notifications
    Notifications {
        #[arg(long)]
        read_all: bool,
        #[arg(long, conflicts_with = "read_all")]
        clear: bool,
    },
    /// Level milestones
    Levels {
        #[arg(long, default_value_t = 20)]
        count: u32,
    },
}

struct Session {
    settings: Settings,
    settings_path: PathBuf,
    rules: Rules,
    state: GameState,
    store: Store,
    rng: StdRng,
}

impl Session {
    fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let paths = project_paths(data_dir.as_deref())?;
        let settings = load_settings(&paths.settings_path);
        let rules = Rules::default().with_day_offset(Local::now().offset().fix());
        let store = Store::new(&paths.dir);

        let now = Utc::now();
        let (state, last_seen) = store.load_game(now, &rules, &settings);
        if let Some(last_seen) = last_seen {
            debug!(away = %format_remaining(now - last_seen), "welcome back");
        }

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            settings,
            settings_path: paths.settings_path,
            rules,
            state,
            store,
            rng,
        })
    }

    fn apply(&mut self, action: PlayerAction) -> Vec<Feedback> {
        self.state
            .apply(action, Utc::now(), &self.rules, &mut self.rng)
    }

    fn poll(&mut self) -> PollReport {
        self.state.poll(
            Utc::now(),
            &self.rules,
            &self.settings.notifications,
            &mut self.rng,
        )
    }

    /// Polls against the files on disk so other commands run meanwhile
    /// are not overwritten.
    fn poll_saved(&mut self) -> Result<PollReport> {
        let (state, report) =
            self.store
                .poll_saved(Utc::now(), &self.rules, &self.settings, &mut self.rng)?;
        self.state = state;
        Ok(report)
    }

    fn save(&self) -> Result<()> {
        self.store.save_game(&self.state, Utc::now())
    }
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut session = Session::open(cli.data_dir)?;

    // catch up on whatever happened while the app was closed
    let report = session.poll();
    print_report(&report, false);
    session.save()?;

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => print_status(&session.state, &session.rules, Utc::now()),
        Command::Walk { steps } => print_feedback(&session.apply(PlayerAction::Walk(steps))),
        Command::Feed { item } => print_feedback(&session.apply(PlayerAction::Feed(item))),
        Command::Play { item } => print_feedback(&session.apply(PlayerAction::Play(item))),
        Command::Sleep => print_feedback(&session.apply(PlayerAction::Sleep)),
        Command::Buy { item: None } => print_shop(session.state.pet.coins),
        Command::Buy { item: Some(id) } => print_feedback(&session.apply(PlayerAction::Buy(id))),
        Command::Tap => print_feedback(&session.apply(PlayerAction::Tap)),
        Command::Expire => print_feedback(&session.apply(PlayerAction::TimeUp)),
        Command::Tick => print_report(&session.poll(), true),
        Command::Watch {
            interval_secs,
            polls,
        } => {
            let secs = interval_secs
                .unwrap_or(session.rules.poll_interval_secs)
                .max(1);
            info!(interval_secs = secs, "watching");
            let mut done = 0u64;
            while polls.map_or(true, |n| done < n) {
                std::thread::sleep(Duration::from_secs(secs));
                let report = session.poll_saved()?;
                print_report(&report, false);
                done += 1;
            }
            // every tick already saved
            return Ok(());
        }
        Command::Bonus => print_feedback(&session.apply(PlayerAction::ClaimBonus)),
        Command::Goal { steps } => {
            let fb = session.apply(PlayerAction::SetGoal(steps));
            session.settings.daily_goal = session.state.pet.daily.goal;
            save_settings_atomic(&session.settings_path, &session.settings)?;
            print_feedback(&fb);
        }
        Command::Notifications { read_all, clear } => {
            print_notifications(&session.state);
            if read_all {
                print_feedback(&session.apply(PlayerAction::ReadAllNotifications));
            }
            if clear {
                print_feedback(&session.apply(PlayerAction::ClearNotifications));
            }
        }
        Command::Levels { count } => {
            for m in level_milestones(count) {
                println!("Level {:>3}  {:>12} steps", m.level, format_steps(m.total_steps));
            }
        }
    }

    session.save()
}

fn print_feedback(feedback: &[Feedback]) {
    for f in feedback {
        println!("{f}");
    }
}

fn print_report(report: &PollReport, verbose: bool) {
    if let Some(outcome) = &report.timed_out {
        println!("{}", Feedback::Event(outcome.clone()));
    }
    if let Some(event) = &report.spawned {
        let hint = match event.kind {
            EventKind::Fly => "catch it with `papi tap`!",
            EventKind::Poop => "clean it up with `papi tap`",
            EventKind::Spider => "swat it with `papi tap`, quick!",
        };
        println!("A {} appeared: {hint}", event.kind);
    }
    for n in &report.alerts {
        println!("{} {}", n.icon, n.title);
    }
    if verbose {
        let s = report.stats;
        println!(
            "hunger {:>3}  fun {:>3}  energy {:>3}  mood {}",
            s.hunger, s.fun, s.energy, report.mood
        );
    }
}

fn print_status(state: &GameState, rules: &Rules, now: DateTime<Utc>) {
    let pet = &state.pet;
    let stats = state.stats(now);
    let level = level_progress(pet.total_steps);
    let evo = evolution_progress(pet.total_steps);

    println!(
        "{} the {}  ({})",
        pet.name,
        display_stage(pet.total_steps, pet.daily.goal_reached),
        emotional_state(&stats)
    );
    println!(
        "hunger {:>3}  fun {:>3}  energy {:>3}",
        stats.hunger, stats.fun, stats.energy
    );
    println!(
        "level {}  {:.0}% to level {} ({} steps to go)",
        level.current_level,
        level.progress_percentage,
        level.next_level,
        format_steps(level.next_level_steps.saturating_sub(pet.total_steps))
    );
    match evo.next_stage {
        Some(next) => println!(
            "{:.0}% of the way to {next} ({} steps to go)",
            evo.percentage_in_stage,
            format_steps(evo.steps_to_next_stage)
        ),
        None => println!("fully grown"),
    }
    println!(
        "today {} / {} steps ({:.0}%){}",
        format_steps(pet.daily.daily_steps),
        format_steps(pet.daily.goal),
        daily_goal_progress(pet.daily.daily_steps, pet.daily.goal),
        if pet.daily.goal_reached { " ✓" } else { "" }
    );
    println!("coins {}", pet.coins);
    if !pet.inventory.is_empty() {
        let names: Vec<&str> = pet.inventory.iter().map(|i| i.name.as_str()).collect();
        println!("inventory: {}", names.join(", "));
    }
    if let Some(event) = &state.active_event {
        println!("active: {} since {}", event.kind, event.spawned_at.format("%H:%M:%S"));
    }
    let counts = state.events.today_counts(rules.local_date(now));
    for kind in EventKind::ALL {
        let cfg = rules.event(kind);
        println!(
            "{kind:<6} {}/{} today, next {}",
            counts.get(kind),
            cfg.daily_max,
            format_remaining(state.events.time_until_next_spawn(kind, now, rules))
        );
    }
    println!(
        "bonus: {}",
        format_remaining(state.bonus.time_until_next(now))
    );
    let unread = state.notifications.unread_count();
    if unread > 0 {
        println!("{unread} unread notification(s)");
    }
}

fn print_shop(coins: u64) {
    for e in papi::shop::CATALOG.iter() {
        println!(
            "{:<6} {:<14} {:<5} {:>4} coins  +{}",
            e.id, e.name, e.category, e.price, e.effectiveness
        );
    }
    println!("you have {coins} coins");
}

fn print_notifications(state: &GameState) {
    if state.notifications.is_empty() {
        println!("no notifications");
        return;
    }
    for n in state.notifications.iter() {
        let mark = if n.read { ' ' } else { '•' };
        println!(
            "{mark} {} {} {}  {}",
            n.timestamp.with_timezone(&Local).format("%m-%d %H:%M"),
            n.icon,
            n.title,
            n.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_defaults_to_twenty() {
        let cli = Cli::try_parse_from(["papi", "levels"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Levels { count: 20 })));
    }

    #[test]
    fn test_data_dir_and_watch_flags() {
        let cli = Cli::try_parse_from([
            "papi",
            "--data-dir",
            "/tmp/papi",
            "watch",
            "--interval-secs",
            "5",
            "--polls",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/papi")));
        assert!(matches!(
            cli.command,
            Some(Command::Watch {
                interval_secs: Some(5),
                polls: Some(3)
            })
        ));
    }
}
