//! Single binary web server: the bracket engine's REST surface.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//!
//! Stages live in memory; match records are created once by the external
//! draw (POST /api/stages) and then only mutated through the store's
//! compare-and-swap write path.

use actix_web::{
    get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_live_web::{
    resolve_advancement, resolve_goal_limit, Match, MatchBackend, MatchError, MatchId, MatchStore,
    MatchUpdate, PairingId, Role, RoundGating, Stage, StageId, StageType, TournamentConfig,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-stage entry: stage metadata, config, the match store, and last
/// activity time (for auto-cleanup).
struct StageEntry {
    name: String,
    stage_type: StageType,
    config: TournamentConfig,
    store: MatchStore,
    last_activity: Instant,
}

/// In-memory state: stages by id. Entries are removed after long inactivity.
type AppState = Data<RwLock<HashMap<StageId, StageEntry>>>;

/// Inactivity threshold: stages not touched for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Seed shape for a match coming from the external draw: no score, no token.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchSeed {
    id: MatchId,
    #[serde(default)]
    round: u32,
    #[serde(default)]
    pairing1_id: Option<PairingId>,
    #[serde(default)]
    pairing2_id: Option<PairingId>,
    #[serde(default)]
    court_id: Option<i64>,
    #[serde(default)]
    start_at: Option<DateTime<Utc>>,
}

impl MatchSeed {
    fn into_match(self) -> Match {
        let mut m = Match::new(self.id, self.round);
        m.pairing1_id = self.pairing1_id;
        m.pairing2_id = self.pairing2_id;
        m.court_id = self.court_id;
        m.start_at = self.start_at;
        m
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateStageBody {
    id: StageId,
    name: String,
    stage_type: StageType,
    #[serde(default)]
    matches: Vec<MatchSeed>,
    #[serde(default)]
    config: TournamentConfig,
}

#[derive(Deserialize)]
struct ResultBody {
    #[serde(flatten)]
    update: MatchUpdate,
    #[serde(default)]
    role: Role,
}

#[derive(Deserialize, Default)]
struct UndoBody {
    #[serde(default)]
    role: Role,
}

/// Path segment: stage id (e.g. /api/stages/{id}/matches)
#[derive(Deserialize)]
struct StagePath {
    id: StageId,
}

/// Path segments: stage id and match id.
#[derive(Deserialize)]
struct StageMatchPath {
    id: StageId,
    match_id: MatchId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoundFlags {
    round: u32,
    complete: bool,
    locked: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BracketView {
    stage: Stage,
    rounds: Vec<RoundFlags>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchResponse {
    ok: bool,
    r#match: Match,
}

fn error_response(err: &MatchError) -> HttpResponse {
    let body = |code: &str| serde_json::json!({ "ok": false, "error": code, "message": err.to_string() });
    match err {
        MatchError::Conflict => HttpResponse::Conflict().json(body("MATCH_CONFLICT")),
        MatchError::DisputeActive => HttpResponse::Conflict().json(body("MATCH_DISPUTED")),
        MatchError::UndoExpired => HttpResponse::Conflict().json(body("UNDO_EXPIRED")),
        MatchError::UndoUnavailable => HttpResponse::NotFound().json(body("UNDO_NOT_FOUND")),
        MatchError::NotFound(_) => HttpResponse::NotFound().json(body("MATCH_NOT_FOUND")),
        MatchError::Unauthorized => HttpResponse::Forbidden().json(body("FORBIDDEN")),
        MatchError::RoundLocked { .. } => HttpResponse::BadRequest().json(body("ROUND_LOCKED")),
        MatchError::Validation(_) => HttpResponse::BadRequest().json(body("INVALID_REQUEST")),
        MatchError::Transport(_) => HttpResponse::InternalServerError().json(body("INTERNAL")),
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn no_stage() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "ok": false, "error": "STAGE_NOT_FOUND" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-live-web",
    })
}

/// Load a stage's matches from the external draw. Matches start Pending with
/// no score; re-posting an existing stage id replaces it.
#[post("/api/stages")]
async fn api_create_stage(state: AppState, body: Json<CreateStageBody>) -> HttpResponse {
    let body = body.into_inner();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let matches: Vec<Match> = body.matches.into_iter().map(MatchSeed::into_match).collect();
    log::info!("stage {} loaded with {} matches", body.id, matches.len());
    g.insert(
        body.id,
        StageEntry {
            name: body.name,
            stage_type: body.stage_type,
            config: body.config,
            store: MatchStore::new(matches),
            last_activity: Instant::now(),
        },
    );
    let entry = &g[&body.id];
    match entry.store.matches() {
        Ok(matches) => HttpResponse::Ok().json(serde_json::json!({ "ok": true, "matches": matches })),
        Err(err) => error_response(&err),
    }
}

/// Raw, unresolved match list. Callers resolve advancement locally.
#[get("/api/stages/{id}/matches")]
async fn api_stage_matches(state: AppState, path: Path<StagePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_stage(),
    };
    entry.last_activity = Instant::now();
    match entry.store.matches() {
        Ok(matches) => HttpResponse::Ok().json(serde_json::json!({ "ok": true, "matches": matches })),
        Err(err) => error_response(&err),
    }
}

/// Resolved advancement view plus per-round completion/lock flags. This is
/// what a polling live view renders directly.
#[get("/api/stages/{id}/bracket")]
async fn api_stage_bracket(state: AppState, path: Path<StagePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_stage(),
    };
    entry.last_activity = Instant::now();
    let raw = match entry.store.matches() {
        Ok(matches) => matches,
        Err(err) => return error_response(&err),
    };
    let resolved = if entry.stage_type == StageType::Playoff {
        resolve_advancement(&raw)
    } else {
        raw
    };
    let gating = RoundGating::with_policy(&resolved, entry.config.reopen_policy);
    let rounds = gating
        .rounds()
        .into_iter()
        .map(|round| RoundFlags {
            round,
            complete: gating.is_round_complete(round),
            locked: gating.is_round_locked(round),
        })
        .collect();
    let mut stage = Stage::new(path.id, entry.name.clone(), entry.stage_type);
    stage.matches = resolved;
    HttpResponse::Ok().json(BracketView { stage, rounds })
}

/// Apply a score/status mutation under compare-and-swap. Conflicts come back
/// as 409 so the caller can refetch and retry once; validation as 400.
#[post("/api/stages/{id}/matches/{match_id}/result")]
async fn api_match_result(
    state: AppState,
    path: Path<StageMatchPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_stage(),
    };
    entry.last_activity = Instant::now();

    // Locked rounds reject ordinary score edits before any write is
    // attempted; forced overrides and dispute transitions pass through.
    if body.update.score.is_some() && !body.update.force {
        let raw = match entry.store.matches() {
            Ok(matches) => matches,
            Err(err) => return error_response(&err),
        };
        let resolved = if entry.stage_type == StageType::Playoff {
            resolve_advancement(&raw)
        } else {
            raw
        };
        let round = resolved
            .iter()
            .find(|m| m.id == path.match_id)
            .map(|m| m.round)
            .unwrap_or(0);
        if round > 0 {
            let gating = RoundGating::with_policy(&resolved, entry.config.reopen_policy);
            if gating.is_round_locked(round) {
                return error_response(&MatchError::RoundLocked { round });
            }
        }
    }

    match entry
        .store
        .post_result(path.match_id, body.update, body.role, Utc::now())
    {
        Ok(m) => HttpResponse::Ok().json(MatchResponse { ok: true, r#match: m }),
        Err(err) => error_response(&err),
    }
}

/// Revert the most recent mutation of a match, inside the undo window.
#[post("/api/stages/{id}/matches/{match_id}/undo")]
async fn api_match_undo(
    state: AppState,
    path: Path<StageMatchPath>,
    body: Option<Json<UndoBody>>,
) -> HttpResponse {
    let role = body.map(|b| b.role).unwrap_or_default();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_stage(),
    };
    entry.last_activity = Instant::now();
    if !role.can_mutate() {
        return error_response(&MatchError::Unauthorized);
    }
    match entry.store.post_undo(path.match_id, Utc::now()) {
        Ok(m) => HttpResponse::Ok().json(MatchResponse { ok: true, r#match: m }),
        Err(err) => error_response(&err),
    }
}

/// Tournament configuration (goal limits, reopen policy), read separately
/// from match data.
#[get("/api/stages/{id}/config")]
async fn api_get_config(state: AppState, path: Path<StagePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_stage(),
    };
    entry.last_activity = Instant::now();
    HttpResponse::Ok().json(serde_json::json!({ "ok": true, "config": entry.config }))
}

#[put("/api/stages/{id}/config")]
async fn api_put_config(
    state: AppState,
    path: Path<StagePath>,
    body: Json<TournamentConfig>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_stage(),
    };
    entry.last_activity = Instant::now();
    entry.config = body.into_inner();
    log::info!(
        "stage {}: goal limit default now {}",
        path.id,
        resolve_goal_limit(0, &entry.config.goal_limits)
    );
    HttpResponse::Ok().json(serde_json::json!({ "ok": true, "config": entry.config }))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<StageId, StageEntry>::new()));

    // Background task: every 30 minutes, remove stages inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive stage(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_stage)
            .service(api_stage_matches)
            .service(api_stage_bracket)
            .service(api_match_result)
            .service(api_match_undo)
            .service(api_get_config)
            .service(api_put_config)
    })
    .bind(bind)?
    .run()
    .await
}
