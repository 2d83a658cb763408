//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose buddy CRUD and the report dashboard to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - A dashboard snapshot is loaded once per animation run. Frames only
//!   advance progress of the run they name; a buddy write for the owner
//!   restarts the run from 0 against fresh data.

use buddy_core::chart::clock::{AnimationRun, ProgressTick};
use buddy_core::service::contact_service::ContactServiceResult;
use buddy_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner, AggregationSource, ChartConfig, ChartEvent, ChartTarget, Contact,
    ContactDraft, ContactService, DashboardService, DashboardSnapshot, Gender, OwnerId,
    RenderContext, SqliteContactRepository, Viewport,
};
use chrono::Local;
use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const DB_FILE_NAME: &str = "buddybook.sqlite3";
const DB_PATH_ENV: &str = "BUDDYBOOK_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CHART_CONFIG: OnceLock<ChartConfig> = OnceLock::new();
static DASHBOARDS: OnceLock<Mutex<HashMap<OwnerId, DashboardSession>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Safe to call repeatedly with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Applies a JSON chart style override for dashboards started afterwards.
///
/// Only the first successful call takes effect; rendering frames never fills
/// in the defaults on its own. Returns an empty string on
/// success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_charts(config_json: String) -> String {
    let config = match ChartConfig::from_json(&config_json) {
        Ok(config) => config,
        Err(err) => return format!("invalid chart config: {err}"),
    };
    match CHART_CONFIG.set(config) {
        Ok(()) => String::new(),
        Err(_) => "chart config already applied".to_string(),
    }
}

/// Buddy row as shown in list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuddyItem {
    pub buddy_id: String,
    pub name: String,
    /// `Male|Female|Other`.
    pub gender: String,
    /// `YYYY-MM-DD`, or empty when unknown.
    pub birthdate: String,
    pub phone: String,
    pub email: String,
}

/// Generic action envelope for buddy writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuddyActionResponse {
    pub ok: bool,
    pub buddy_id: Option<String>,
    pub message: String,
}

impl BuddyActionResponse {
    fn success(message: impl Into<String>, buddy_id: Uuid) -> Self {
        Self {
            ok: true,
            buddy_id: Some(buddy_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            buddy_id: None,
            message: message.into(),
        }
    }
}

/// List envelope for buddy reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuddyListResponse {
    pub ok: bool,
    pub items: Vec<BuddyItem>,
    pub message: String,
}

/// Handle of one dashboard animation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRun {
    pub ok: bool,
    /// Pass back to `dashboard_frame`; frames naming an older run are rejected.
    pub generation: u64,
    pub message: String,
}

impl DashboardRun {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            generation: 0,
            message: message.into(),
        }
    }
}

/// One dashboard frame at a host-chosen animation progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFrame {
    pub ok: bool,
    pub message: String,
    /// Run this frame belongs to. Differs from the requested one when
    /// `restarted` is set.
    pub generation: u64,
    /// The owner's data changed; the run restarted at progress 0 and the host
    /// must reset its ticker and use `generation` from now on.
    pub restarted: bool,
    /// JSON array of draw commands for the gender donut.
    pub pie_commands_json: String,
    /// JSON array of draw commands for the monthly bars.
    pub bar_commands_json: String,
    pub male_count: u32,
    pub female_count: u32,
    pub total_count: u32,
    /// Proximity indicator text; empty when nobody has a usable birthdate.
    pub upcoming_headline: String,
}

impl DashboardFrame {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            generation: 0,
            restarted: false,
            pie_commands_json: "[]".to_string(),
            bar_commands_json: "[]".to_string(),
            male_count: 0,
            female_count: 0,
            total_count: 0,
            upcoming_headline: String::new(),
        }
    }
}

/// Render-side state of one owner's dashboard.
struct DashboardSession {
    context: RenderContext,
    runs: Vec<(ChartTarget, AnimationRun)>,
    generation: u64,
    /// A buddy write landed after the current snapshot was loaded.
    data_changed: bool,
}

impl DashboardSession {
    fn new(config: ChartConfig) -> Self {
        Self {
            context: RenderContext::new(config),
            runs: Vec::new(),
            generation: 0,
            data_changed: false,
        }
    }

    /// Swaps in `snapshot` and restarts every chart from 0.
    fn restart(&mut self, snapshot: DashboardSnapshot) -> u64 {
        let outcome = self
            .context
            .handle(ChartEvent::SnapshotLoaded(Box::new(snapshot)));
        self.runs = outcome.started;
        self.generation = self.context.pie().state().generation().value();
        self.data_changed = false;
        self.generation
    }

    /// Feeds host progress to every run of the current generation. Regressing
    /// progress is dropped by the charts and the previous frame repeats.
    fn apply_progress(&mut self, progress: f32) {
        for (target, run) in &self.runs {
            let tick = ProgressTick {
                generation: run.generation,
                progress,
            };
            self.context.handle(ChartEvent::Tick {
                target: *target,
                tick,
            });
        }
    }

    fn frame(
        &self,
        restarted: bool,
        pie_viewport: Viewport,
        bar_viewport: Viewport,
    ) -> Result<DashboardFrame, String> {
        let encode = |err: serde_json::Error| format!("dashboard_frame encode failed: {err}");
        let pie_commands_json =
            serde_json::to_string(&self.context.redraw_pie(pie_viewport)).map_err(encode)?;
        let bar_commands_json =
            serde_json::to_string(&self.context.redraw_bars(bar_viewport)).map_err(encode)?;
        let counters = self.context.counters();

        Ok(DashboardFrame {
            ok: true,
            message: String::new(),
            generation: self.generation,
            restarted,
            pie_commands_json,
            bar_commands_json,
            male_count: counters.male,
            female_count: counters.female,
            total_count: counters.total,
            upcoming_headline: self
                .context
                .upcoming()
                .map(|upcoming| upcoming.headline())
                .unwrap_or_default(),
        })
    }
}

/// Creates a buddy for `owner_id`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; validation errors come back in `message`.
#[flutter_rust_bridge::frb(sync)]
pub fn buddy_add(
    owner_id: i64,
    name: String,
    gender: String,
    birthdate: String,
    phone: String,
    email: String,
) -> BuddyActionResponse {
    let draft = match build_draft(name, &gender, birthdate, phone, email) {
        Ok(draft) => draft,
        Err(message) => return BuddyActionResponse::failure(message),
    };
    match with_contact_service(|service| service.add_contact(owner_id, draft)) {
        Ok(contact) => {
            mark_dashboard_stale(contact.owner_id);
            BuddyActionResponse::success("Buddy added.", contact.uuid)
        }
        Err(err) => BuddyActionResponse::failure(format!("buddy_add failed: {err}")),
    }
}

/// Replaces every editable field of an existing buddy.
#[flutter_rust_bridge::frb(sync)]
pub fn buddy_update(
    buddy_id: String,
    name: String,
    gender: String,
    birthdate: String,
    phone: String,
    email: String,
) -> BuddyActionResponse {
    let id = match parse_buddy_id(&buddy_id) {
        Ok(id) => id,
        Err(message) => return BuddyActionResponse::failure(message),
    };
    let draft = match build_draft(name, &gender, birthdate, phone, email) {
        Ok(draft) => draft,
        Err(message) => return BuddyActionResponse::failure(message),
    };
    match with_contact_service(|service| service.update_contact(id, draft)) {
        Ok(contact) => {
            mark_dashboard_stale(contact.owner_id);
            BuddyActionResponse::success("Buddy updated.", contact.uuid)
        }
        Err(err) => BuddyActionResponse::failure(format!("buddy_update failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn buddy_delete(buddy_id: String) -> BuddyActionResponse {
    let id = match parse_buddy_id(&buddy_id) {
        Ok(id) => id,
        Err(message) => return BuddyActionResponse::failure(message),
    };
    let deleted = with_contact_service(|service| {
        let owner = service.get_contact(id)?.map(|contact| contact.owner_id);
        service.delete_contact(id)?;
        Ok(owner)
    });
    match deleted {
        Ok(owner) => {
            if let Some(owner) = owner {
                mark_dashboard_stale(owner);
            }
            BuddyActionResponse::success("Buddy deleted.", id)
        }
        Err(err) => BuddyActionResponse::failure(format!("buddy_delete failed: {err}")),
    }
}

/// Lists an owner's buddies by name; a non-blank `query` filters by name or
/// phone substring.
#[flutter_rust_bridge::frb(sync)]
pub fn buddy_list(owner_id: i64, query: Option<String>) -> BuddyListResponse {
    let result = with_contact_service(|service| match query.as_deref() {
        Some(text) => service.search_contacts(owner_id, text),
        None => service.list_contacts(owner_id),
    });
    match result {
        Ok(contacts) => {
            let items: Vec<BuddyItem> = contacts.into_iter().map(to_buddy_item).collect();
            let message = if items.is_empty() {
                "No buddies.".to_string()
            } else {
                format!("Found {} buddy(ies).", items.len())
            };
            BuddyListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => BuddyListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("buddy_list failed: {err}"),
        },
    }
}

/// Dashboard snapshot for today as JSON, or an empty string on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_snapshot_json(owner_id: i64) -> String {
    let snapshot = match load_snapshot(owner_id) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(
                "event=dashboard_ffi module=ffi status=error error_code=load_failed error={}",
                err
            );
            return String::new();
        }
    };
    serde_json::to_string(&snapshot).unwrap_or_default()
}

/// Loads the owner's snapshot and starts a new animation run at progress 0.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Supersedes any earlier run of the same owner.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_start(owner_id: i64) -> DashboardRun {
    let started = with_dashboards(|sessions| {
        let snapshot = load_snapshot(owner_id)?;
        let session = sessions
            .entry(owner_id)
            .or_insert_with(|| DashboardSession::new(chart_config()));
        Ok(session.restart(snapshot))
    });
    match started {
        Ok(generation) => {
            info!(
                "event=dashboard_run module=ffi status=ok owner_id={} generation={} restarted=false",
                owner_id, generation
            );
            DashboardRun {
                ok: true,
                generation,
                message: String::new(),
            }
        }
        Err(err) => DashboardRun::failure(format!("dashboard_start failed: {err}")),
    }
}

/// Renders both charts and the counters of run `generation` at `progress`
/// in `[0, 1]`.
///
/// # FFI contract
/// - Sync call; only touches the DB when the run has to restart.
/// - Out-of-range or non-finite progress is clamped.
/// - Frames for an unknown or superseded run fail with `ok = false`.
/// - Never panics; a failed frame carries empty command arrays.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_frame(
    owner_id: i64,
    generation: u64,
    progress: f64,
    pie_width: f64,
    pie_height: f64,
    bar_width: f64,
    bar_height: f64,
) -> DashboardFrame {
    let progress = clamp_progress(progress);
    let pie_viewport = Viewport::new(pie_width as f32, pie_height as f32);
    let bar_viewport = Viewport::new(bar_width as f32, bar_height as f32);

    let frame = with_dashboards(|sessions| {
        let session = sessions
            .get_mut(&owner_id)
            .ok_or_else(|| "no dashboard run; call dashboard_start first".to_string())?;
        if session.generation != generation {
            return Err(format!(
                "stale dashboard run {generation}; current run is {}",
                session.generation
            ));
        }

        let restarted = session.data_changed;
        if restarted {
            let current = session.restart(load_snapshot(owner_id)?);
            info!(
                "event=dashboard_run module=ffi status=ok owner_id={} generation={} restarted=true",
                owner_id, current
            );
        } else {
            session.apply_progress(progress);
        }
        session.frame(restarted, pie_viewport, bar_viewport)
    });
    frame.unwrap_or_else(|err| DashboardFrame::failure(format!("dashboard_frame failed: {err}")))
}

fn clamp_progress(progress: f64) -> f32 {
    if progress.is_finite() {
        progress.clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

fn build_draft(
    name: String,
    gender: &str,
    birthdate: String,
    phone: String,
    email: String,
) -> Result<ContactDraft, String> {
    let gender = Gender::parse(gender.trim())
        .ok_or_else(|| format!("unsupported gender `{gender}`; expected Male|Female|Other"))?;
    let mut draft = ContactDraft::new(name, gender);
    draft.birthdate = Some(birthdate);
    draft.phone = phone;
    draft.email = Some(email);
    Ok(draft)
}

fn parse_buddy_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid buddy_id `{raw}`: {err}"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_contact_service<T>(
    f: impl FnOnce(&ContactService<SqliteContactRepository<'_>>) -> ContactServiceResult<T>,
) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let service = ContactService::new(SqliteContactRepository::new(&conn));
    f(&service).map_err(|err| err.to_string())
}

fn load_snapshot(owner_id: OwnerId) -> Result<DashboardSnapshot, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let service = DashboardService::new(SqliteContactRepository::new(&conn));
    service
        .load_snapshot(owner_id, Local::now().date_naive(), AggregationSource::Contacts)
        .map_err(|err| err.to_string())
}

fn chart_config() -> ChartConfig {
    CHART_CONFIG.get().cloned().unwrap_or_default()
}

fn with_dashboards<T>(
    f: impl FnOnce(&mut HashMap<OwnerId, DashboardSession>) -> Result<T, String>,
) -> Result<T, String> {
    let mut sessions = DASHBOARDS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .map_err(|_| "dashboard state poisoned".to_string())?;
    f(&mut sessions)
}

/// Makes the owner's next dashboard frame reload and restart.
fn mark_dashboard_stale(owner_id: OwnerId) {
    let marked = with_dashboards(|sessions| {
        if let Some(session) = sessions.get_mut(&owner_id) {
            session.data_changed = true;
        }
        Ok(())
    });
    if let Err(err) = marked {
        warn!(
            "event=dashboard_ffi module=ffi status=error error_code=mark_stale_failed error={}",
            err
        );
    }
}

fn to_buddy_item(contact: Contact) -> BuddyItem {
    BuddyItem {
        buddy_id: contact.uuid.to_string(),
        name: contact.name,
        gender: contact.gender.as_str().to_string(),
        birthdate: contact.birthdate.unwrap_or_default(),
        phone: contact.phone,
        email: contact.email.unwrap_or_default(),
    }
}
