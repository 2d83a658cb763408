use buddy_core::chart::clock::ProgressTick;
use buddy_core::db::open_db;
use buddy_core::{
    spawn_snapshot_refresh, AggregationSource, ChartConfig, ChartEvent, ChartTarget, Contact,
    ContactRepository, CounterValues, DashboardSnapshot, Gender, GenderCounts, MonthlyHistogram,
    RenderContext, SqliteContactRepository, Viewport,
};
use chrono::NaiveDate;
use std::sync::mpsc;
use std::time::{Duration, Instant};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
}

fn snapshot(male: u32, female: u32, march: u32) -> DashboardSnapshot {
    let mut buckets = [0; 12];
    buckets[2] = march;
    DashboardSnapshot {
        gender: GenderCounts::new(male, female),
        months: MonthlyHistogram::from_buckets(buckets),
        total_contacts: male + female,
        ..DashboardSnapshot::empty(1, today())
    }
}

fn loaded(snapshot: DashboardSnapshot) -> ChartEvent {
    ChartEvent::SnapshotLoaded(Box::new(snapshot))
}

#[test]
fn fresh_context_is_settled_and_empty() {
    let context = RenderContext::new(ChartConfig::default());
    assert!(context.is_settled());
    assert!(context.upcoming().is_none());
    assert_eq!(context.counters(), CounterValues::default());
}

#[test]
fn snapshot_starts_every_run_from_zero() {
    let mut context = RenderContext::new(ChartConfig::default());
    let start = Instant::now();
    let outcome = context.handle_at(loaded(snapshot(3, 1, 4)), start);

    assert!(outcome.redraw);
    assert_eq!(outcome.started.len(), 5);
    assert!(!context.is_settled());
    assert_eq!(context.pie().state().progress(), 0.0);
    assert_eq!(*context.bars().state().data(), snapshot(3, 1, 4).months);
    assert_eq!(context.counters(), CounterValues::default());
}

#[test]
fn frames_drive_every_chart_to_completion() {
    let mut context = RenderContext::new(ChartConfig::default());
    let start = Instant::now();
    context.handle_at(loaded(snapshot(3, 1, 4)), start);

    // Bars are still inside their 300 ms start delay.
    context.handle_at(ChartEvent::Frame(start + Duration::from_millis(200)), start);
    assert_eq!(context.bars().state().progress(), 0.0);
    assert!(context.pie().state().progress() > 0.0);

    context.handle_at(ChartEvent::Frame(start + Duration::from_secs(3)), start);
    assert!(context.is_settled());
    assert_eq!(
        context.counters(),
        CounterValues {
            male: 3,
            female: 1,
            total: 4
        }
    );

    let pie = context.redraw_pie(Viewport::new(400.0, 400.0));
    let bars = context.redraw_bars(Viewport::new(800.0, 500.0));
    assert!(!pie.is_empty());
    assert_eq!(bars.len(), 12 + 1 + 1 + 12 + 1);
}

#[test]
fn newer_snapshot_supersedes_older_run_and_stale_ticks() {
    let mut context = RenderContext::new(ChartConfig::default());
    let start = Instant::now();

    let first = context.handle_at(loaded(snapshot(3, 1, 4)), start);
    let (_, first_pie_run) = first.started[0];
    context.handle_at(ChartEvent::Frame(start + Duration::from_millis(400)), start);

    let second = context.handle_at(
        loaded(snapshot(1, 1, 1)),
        start + Duration::from_millis(500),
    );
    let (target, second_pie_run) = second.started[0];
    assert_eq!(target, ChartTarget::GenderPie);
    assert!(second_pie_run.generation > first_pie_run.generation);

    // A late final tick of the first run must not paint the new data.
    let stale = ProgressTick {
        generation: first_pie_run.generation,
        progress: 1.0,
    };
    let outcome = context.handle_at(
        ChartEvent::Tick {
            target: ChartTarget::GenderPie,
            tick: stale,
        },
        start,
    );
    assert!(!outcome.redraw);
    assert_eq!(context.pie().state().progress(), 0.0);

    context.handle_at(ChartEvent::Frame(start + Duration::from_secs(5)), start);
    assert!(context.is_settled());
    assert_eq!(*context.pie().state().data(), GenderCounts::new(1, 1));
    assert_eq!(context.counters().total, 2);
}

#[test]
fn external_ticks_for_current_run_are_applied() {
    let mut context = RenderContext::new(ChartConfig::default());
    let start = Instant::now();
    let outcome = context.handle_at(loaded(snapshot(2, 2, 0)), start);

    for (target, run) in outcome.started {
        let tick = run.tick_at(start + Duration::from_secs(5)).unwrap();
        assert!(context.handle_at(ChartEvent::Tick { target, tick }, start).redraw);
    }
    assert!(context.is_settled());
    assert_eq!(context.counters().male, 2);
}

#[test]
fn drain_applies_events_in_arrival_order() {
    let (tx, rx) = mpsc::channel();
    let mut context = RenderContext::new(ChartConfig::default());

    tx.send(loaded(snapshot(1, 0, 1))).unwrap();
    tx.send(loaded(snapshot(5, 5, 5))).unwrap();
    assert!(context.drain(&rx));
    assert!(!context.drain(&rx));

    assert_eq!(context.snapshot().unwrap().total_contacts, 10);
}

#[test]
fn background_refresh_and_runners_settle_the_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buddybook.db");
    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteContactRepository::new(&conn);
        repo.create_contact(&Contact::new(1, "Ada", Gender::Female).born("1990-07-04"))
            .unwrap();
        repo.create_contact(&Contact::new(1, "Bo", Gender::Male).born("1985-03-12"))
            .unwrap();
    }

    let fast = r#"{
        "bar": {"animation": {"duration_ms": 40, "start_delay_ms": 10}},
        "pie": {"animation": {"duration_ms": 40}},
        "counters": {
            "gender_animation": {"duration_ms": 40},
            "total_animation": {"duration_ms": 40}
        }
    }"#;
    let (tx, rx) = mpsc::channel();
    let mut context = RenderContext::new(ChartConfig::from_json(fast).unwrap())
        .with_tick_source(tx.clone(), Duration::from_millis(5));

    spawn_snapshot_refresh(path, 1, today(), AggregationSource::StoreCounts, tx)
        .join()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !(context.snapshot().is_some() && context.is_settled()) {
        assert!(Instant::now() < deadline, "context never settled");
        if let Ok(event) = rx.recv_timeout(Duration::from_millis(50)) {
            context.handle(event);
        }
    }

    let upcoming = context.upcoming().unwrap();
    assert_eq!(upcoming.contact.name, "Ada");
    assert_eq!(upcoming.days_until, 0);
    assert_eq!(context.counters().total, 2);
}

#[test]
fn failed_refresh_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a database file.
    let (tx, rx) = mpsc::channel();
    spawn_snapshot_refresh(
        dir.path().to_path_buf(),
        1,
        today(),
        AggregationSource::Contacts,
        tx,
    )
    .join()
    .unwrap();

    assert!(rx.try_recv().is_err());
}
