//! End-to-end flow over a real (in-memory) database: completions across day
//! boundaries feed streaks, challenges, achievements and analytics.

use knockwood_core::storage::Config;
use knockwood_core::{Clock, Database, Event, FixedClock, HabitService, ShareKind};

fn service_at(clock: &FixedClock) -> HabitService<Database> {
    HabitService::new(
        Box::new(clock.clone()),
        Database::open_memory().unwrap(),
        Config::default(),
    )
}

#[test]
fn a_week_of_completions_builds_a_perfect_week() {
    let clock = FixedClock::on_day(2026, 5, 1);
    let mut service = service_at(&clock);

    let mut all_events = Vec::new();
    for day in 0..7 {
        if day > 0 {
            clock.advance_days(1);
        }
        all_events.extend(
            service
                .record_completion("touch-wood", Some(4), None)
                .unwrap(),
        );
    }

    assert_eq!(service.progress().streak().current, 7);
    let unlocked: Vec<&str> = service
        .achievements()
        .achievements()
        .iter()
        .filter(|a| a.unlocked)
        .map(|a| a.id.as_str())
        .collect();
    assert!(unlocked.contains(&"first-knock"));
    assert!(unlocked.contains(&"three-day-spark"));
    assert!(unlocked.contains(&"week-of-wood"));
    assert!(unlocked.contains(&"perfect-week"));
    assert!(unlocked.contains(&"sunny-stretch"), "mood 4 average all week");

    // One refresh event per day boundary (the first day included).
    let refreshes = all_events
        .iter()
        .filter(|e| matches!(e, Event::DailyChallengesRefreshed { .. }))
        .count();
    assert_eq!(refreshes, 7);

    // Analytics saw every rated completion and found a positive run.
    assert_eq!(service.analytics().entries().len(), 7);
    assert!(!service.analytics().streaks().is_empty());
}

#[test]
fn missed_day_resets_streak_but_keeps_best() {
    let clock = FixedClock::on_day(2026, 5, 1);
    let mut service = service_at(&clock);

    for _ in 0..3 {
        service.record_completion("touch-wood", None, None).unwrap();
        clock.advance_days(1);
    }
    assert_eq!(service.progress().streak().current, 3);

    clock.advance_days(1); // skip a day
    service.record_completion("touch-wood", None, None).unwrap();
    assert_eq!(service.progress().streak().current, 1);
    assert_eq!(service.progress().streak().best, 3);
}

#[test]
fn state_round_trips_through_sqlite() {
    let clock = FixedClock::on_day(2026, 5, 1);
    let mut service = service_at(&clock);
    service.record_completion("touch-wood", Some(5), None).unwrap();
    service.record_completion("lucky-coin", None, None).unwrap();
    service.share(ShareKind::Streak { days: 1 });
    let db = service.into_store();

    let service = HabitService::new(Box::new(clock.clone()), db, Config::default());
    assert_eq!(service.progress().lifetime_count(), 2);
    assert_eq!(service.social().share_count(), 1);
    assert_eq!(service.analytics().entries().len(), 1);
    assert_eq!(service.challenges().last_refresh(), Some(clock.today()));
}

#[test]
fn variety_counts_distinct_rituals_only() {
    let clock = FixedClock::on_day(2026, 5, 1);
    let mut service = service_at(&clock);

    service.record_completion("touch-wood", None, None).unwrap();
    service.record_completion("touch-wood", None, None).unwrap();
    service.record_completion("lucky-coin", None, None).unwrap();

    if let Some(variety) = service
        .challenges()
        .active()
        .iter()
        .find(|c| c.challenge_type == knockwood_core::ChallengeType::Variety)
    {
        // Three completions but only two distinct rituals.
        assert_eq!(variety.progress, 2);
    }
}
