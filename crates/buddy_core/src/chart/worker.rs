//! Background tick sources and data-refresh workers.
//!
//! Workers never touch chart state. They only send `ChartEvent`s to the
//! rendering context, and they stop on their own once the receiving side
//! hangs up.

use crate::chart::clock::AnimationRun;
use crate::chart::context::{ChartEvent, ChartTarget};
use crate::db::open_db;
use crate::model::contact::OwnerId;
use crate::repo::contact_repo::SqliteContactRepository;
use crate::service::dashboard_service::{AggregationSource, DashboardService};
use chrono::NaiveDate;
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Timer-driven tick source for one animation run.
pub struct AnimationRunner;

impl AnimationRunner {
    /// Emits generation-tagged ticks for `run` every `frame_interval` until
    /// progress reaches 1.0 or the channel closes.
    ///
    /// A superseded runner keeps ticking until it finishes; its ticks are
    /// discarded by the receiving chart.
    pub fn spawn(
        target: ChartTarget,
        run: AnimationRun,
        frame_interval: Duration,
        events: Sender<ChartEvent>,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            let mut last_progress: Option<f32> = None;
            loop {
                thread::sleep(frame_interval);
                let Some(tick) = run.tick_at(Instant::now()) else {
                    continue;
                };
                if last_progress.is_some_and(|last| tick.progress <= last) {
                    continue;
                }
                last_progress = Some(tick.progress);

                if events.send(ChartEvent::Tick { target, tick }).is_err() || tick.is_final() {
                    return;
                }
            }
        })
    }
}

/// Loads a dashboard snapshot off the rendering context.
///
/// Opens its own connection to `db_path`. On failure the error is logged and
/// no event is sent; the screen keeps showing the previous snapshot.
pub fn spawn_snapshot_refresh(
    db_path: PathBuf,
    owner: OwnerId,
    today: NaiveDate,
    source: AggregationSource,
    events: Sender<ChartEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let conn = match open_db(&db_path) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=snapshot_refresh module=chart status=error error_code=db_open_failed error={}",
                    err
                );
                return;
            }
        };

        let service = DashboardService::new(SqliteContactRepository::new(&conn));
        match service.load_snapshot(owner, today, source) {
            Ok(snapshot) => {
                let delivered = events
                    .send(ChartEvent::SnapshotLoaded(Box::new(snapshot)))
                    .is_ok();
                info!(
                    "event=snapshot_refresh module=chart status=ok delivered={}",
                    delivered
                );
            }
            Err(err) => error!(
                "event=snapshot_refresh module=chart status=error error_code=load_failed error={}",
                err
            ),
        }
    })
}
