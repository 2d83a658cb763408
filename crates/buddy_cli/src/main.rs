//! Command-line birthday report.
//!
//! # Responsibility
//! - Verify `buddy_core` linkage without the Flutter runtime.
//! - Print one owner's dashboard as plain text.
//!
//! Usage: `buddy_cli [DB_PATH] [OWNER_ID]`. Without a path, an in-memory
//! store is seeded with sample buddies.

use buddy_core::report::histogram::MONTH_ABBREVIATIONS;
use buddy_core::{
    open_db, open_db_in_memory, spawn_snapshot_refresh, AggregationSource, ChartConfig,
    ChartEvent, ContactDraft, ContactService, DashboardService, DashboardSnapshot, Gender,
    OwnerId, RenderContext, SqliteContactRepository,
};
use chrono::Local;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::{Duration, Instant};

const DEFAULT_OWNER: OwnerId = 1;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const SAMPLE_BUDDIES: [(&str, Gender, &str); 5] = [
    ("Ada", Gender::Female, "1990-07-04"),
    ("Bo", Gender::Male, "1985-03-12"),
    ("Cy", Gender::Male, "2001-03-30"),
    ("Dee", Gender::Female, "1979-12-24"),
    ("Eli", Gender::Other, ""),
];

fn main() -> ExitCode {
    println!("buddy_core ping={}", buddy_core::ping());
    println!("buddy_core version={}", buddy_core::core_version());

    let mut args = std::env::args().skip(1);
    let db_path = args.next().map(PathBuf::from);
    let owner = match args.next().map(|raw| raw.parse::<OwnerId>()) {
        None => DEFAULT_OWNER,
        Some(Ok(owner)) => owner,
        Some(Err(err)) => {
            eprintln!("invalid owner id: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match db_path {
        Some(path) => report_from_file(path, owner),
        None => report_from_sample(owner),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the snapshot on a worker thread and animates it on this one.
fn report_from_file(path: PathBuf, owner: OwnerId) -> Result<(), String> {
    // Open once up front so a bad path is reported instead of silently logged.
    open_db(&path).map_err(|err| format!("failed to open `{}`: {err}", path.display()))?;

    let (tx, rx) = mpsc::channel();
    let mut context = RenderContext::new(ChartConfig::default())
        .with_tick_source(tx.clone(), FRAME_INTERVAL);
    let today = Local::now().date_naive();
    spawn_snapshot_refresh(path, owner, today, AggregationSource::StoreCounts, tx)
        .join()
        .map_err(|_| "snapshot refresh worker panicked".to_string())?;

    context.drain(&rx);
    let Some(snapshot) = context.snapshot().cloned() else {
        return Err("snapshot refresh failed; see logs".to_string());
    };
    while !context.is_settled() {
        if let Ok(event) = rx.recv_timeout(FRAME_INTERVAL * 4) {
            context.handle(event);
        } else {
            context.advance(Instant::now());
        }
    }

    print_snapshot(&snapshot);
    let counters = context.counters();
    println!(
        "counters male={} female={} total={}",
        counters.male, counters.female, counters.total
    );
    Ok(())
}

fn report_from_sample(owner: OwnerId) -> Result<(), String> {
    let conn = open_db_in_memory().map_err(|err| err.to_string())?;
    let contacts = ContactService::new(SqliteContactRepository::new(&conn));
    for (name, gender, birthdate) in SAMPLE_BUDDIES {
        let mut draft = ContactDraft::new(name, gender);
        draft.birthdate = Some(birthdate.to_string());
        contacts
            .add_contact(owner, draft)
            .map_err(|err| err.to_string())?;
    }

    let snapshot = DashboardService::new(SqliteContactRepository::new(&conn))
        .load_snapshot(owner, Local::now().date_naive(), AggregationSource::Contacts)
        .map_err(|err| err.to_string())?;

    let mut context = RenderContext::new(ChartConfig::default());
    let started = Instant::now();
    context.handle_at(ChartEvent::SnapshotLoaded(Box::new(snapshot.clone())), started);
    // Sample well past the longest run so every clock lands on 1.0.
    context.handle_at(ChartEvent::Frame(started + Duration::from_secs(5)), started);

    print_snapshot(&snapshot);
    let counters = context.counters();
    println!(
        "counters male={} female={} total={}",
        counters.male, counters.female, counters.total
    );
    Ok(())
}

fn print_snapshot(snapshot: &DashboardSnapshot) {
    println!("owner={} today={}", snapshot.owner, snapshot.today);
    match &snapshot.upcoming {
        Some(upcoming) => println!("{} ({})", upcoming.headline(), upcoming.next_occurrence),
        None => println!("no upcoming birthdays"),
    }
    println!(
        "gender male={} female={}",
        snapshot.gender.male, snapshot.gender.female
    );
    for (label, count) in MONTH_ABBREVIATIONS.iter().zip(snapshot.months.buckets()) {
        println!("{label:>4} {:<3} {}", count, "#".repeat(*count as usize));
    }
}
