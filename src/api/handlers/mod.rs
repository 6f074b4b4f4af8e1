use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::AppState;
use crate::models::*;
use crate::service::OverlayView;
use crate::timer::TimerStatus;
use crate::tournament::{
    BracketView, CurrentMatch, MatchNode, MatchResult, StateConflict, TournamentError,
    TournamentSnapshot, ValidationError,
};

// ============================================================
// Error Handling
// ============================================================

/// Map a rejected tournament operation to a client error.
///
/// Bad input is a 400 (404 when it names a contestant or match that does not
/// exist); an operation that is invalid in the current state is a 409. The
/// service has already logged the rejection with the action name.
fn tournament_error(e: TournamentError) -> (StatusCode, String) {
    let status = match &e {
        TournamentError::Validation(
            ValidationError::NotFound(_) | ValidationError::NoSuchMatch { .. },
        ) => StatusCode::NOT_FOUND,
        TournamentError::Validation(_) => StatusCode::BAD_REQUEST,
        TournamentError::Conflict(_) => StatusCode::CONFLICT,
    };
    tracing::debug!("Responding {} to rejected operation: {}", status, e);
    (status, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Snapshot polling
// ============================================================

pub async fn get_data(State(state): State<AppState>) -> Json<TournamentSnapshot> {
    Json(state.service.snapshot())
}

pub async fn get_version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.service.version(),
    })
}

/// Overlay poll. Answers 304 when the caller already holds this version.
pub async fn get_snapshot(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Response {
    let overlay: OverlayView = state.service.overlay();
    if query.since == Some(overlay.snapshot.version) {
        return StatusCode::NOT_MODIFIED.into_response();
    }
    Json(overlay).into_response()
}

// ============================================================
// Roster
// ============================================================

pub async fn list_robots(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.read(|t| t.roster().list().to_vec()))
}

pub async fn add_robot(
    State(state): State<AppState>,
    Json(input): Json<AddContestantInput>,
) -> Result<(StatusCode, Json<Vec<String>>), (StatusCode, String)> {
    state
        .service
        .mutate("add_contestant", |t| {
            t.add_contestant(&input.name)?;
            Ok(t.roster().list().to_vec())
        })
        .map(|roster| (StatusCode::CREATED, Json(roster)))
        .map_err(tournament_error)
}

pub async fn replace_robots(
    State(state): State<AppState>,
    Json(input): Json<ReplaceRosterInput>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    state
        .service
        .mutate("replace_roster", |t| {
            t.replace_roster(&input.names)?;
            Ok(t.roster().list().to_vec())
        })
        .map(Json)
        .map_err(tournament_error)
}

pub async fn delete_robot(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    state
        .service
        .mutate("remove_contestant", |t| {
            t.remove_contestant(&name)?;
            Ok(t.roster().list().to_vec())
        })
        .map(Json)
        .map_err(tournament_error)
}

pub async fn generate_test_robots(
    State(state): State<AppState>,
    Query(input): Query<GenerateRosterInput>,
) -> Result<Json<GenerateRosterResponse>, (StatusCode, String)> {
    let count = input.count.unwrap_or(DEFAULT_TEST_ROSTER_SIZE);
    let robots = state
        .service
        .mutate("generate_test_roster", |t| {
            t.generate_test_roster(count).map(<[String]>::to_vec)
        })
        .map_err(tournament_error)?;

    Ok(Json(GenerateRosterResponse {
        success: true,
        message: format!("{} Test-Roboter generiert", robots.len()),
        robots,
    }))
}

// ============================================================
// Bracket and seeding
// ============================================================

pub async fn get_bracket(State(state): State<AppState>) -> Json<Option<BracketView>> {
    Json(state.service.read(|t| t.bracket().map(|b| b.view())))
}

pub async fn get_bracket_tree(
    State(state): State<AppState>,
) -> Result<Json<MatchNode>, (StatusCode, String)> {
    state
        .service
        .read(|t| t.tree())
        .map(Json)
        .map_err(tournament_error)
}

/// Build a bracket sized to `size`, or to the roster when no size is given.
pub async fn build_bracket(
    State(state): State<AppState>,
    Json(input): Json<BuildBracketInput>,
) -> Result<(StatusCode, Json<BracketView>), (StatusCode, String)> {
    state
        .service
        .mutate("build_bracket", |t| {
            let size = input.size.unwrap_or_else(|| t.roster().len());
            t.build_bracket(size).map(|b| b.view())
        })
        .map(|view| (StatusCode::CREATED, Json(view)))
        .map_err(tournament_error)
}

pub async fn reset_bracket(
    State(state): State<AppState>,
) -> Result<Json<TournamentSnapshot>, (StatusCode, String)> {
    state
        .service
        .mutate("reset_bracket", |t| {
            t.reset_bracket()?;
            Ok(t.snapshot())
        })
        .map(Json)
        .map_err(tournament_error)
}

pub async fn clear_results(
    State(state): State<AppState>,
) -> Result<Json<TournamentSnapshot>, (StatusCode, String)> {
    state
        .service
        .mutate("clear_results", |t| {
            t.clear_results()?;
            Ok(t.snapshot())
        })
        .map(Json)
        .map_err(tournament_error)
}

pub async fn assign_slot(
    State(state): State<AppState>,
    Json(input): Json<AssignSlotInput>,
) -> Result<Json<TournamentSnapshot>, (StatusCode, String)> {
    state
        .service
        .mutate("assign", |t| {
            t.assign(input.slot, &input.name)?;
            Ok(t.snapshot())
        })
        .map(Json)
        .map_err(tournament_error)
}

pub async fn clear_slot(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
) -> Result<Json<TournamentSnapshot>, (StatusCode, String)> {
    state
        .service
        .mutate("unassign", |t| {
            t.unassign(slot)?;
            Ok(t.snapshot())
        })
        .map(Json)
        .map_err(tournament_error)
}

pub async fn random_assignment(
    State(state): State<AppState>,
) -> Result<Json<TournamentSnapshot>, (StatusCode, String)> {
    state
        .service
        .mutate("assign_random", |t| {
            t.assign_random()?;
            Ok(t.snapshot())
        })
        .map(Json)
        .map_err(tournament_error)
}

pub async fn start_tournament(
    State(state): State<AppState>,
) -> Result<Json<TournamentSnapshot>, (StatusCode, String)> {
    state
        .service
        .mutate("start", |t| {
            t.start()?;
            Ok(t.snapshot())
        })
        .map(Json)
        .map_err(tournament_error)
}

// ============================================================
// Matches
// ============================================================

pub async fn get_match(State(state): State<AppState>) -> Json<Option<CurrentMatch>> {
    Json(state.service.read(|t| t.current_match()))
}

pub async fn record_winner(
    State(state): State<AppState>,
    Json(input): Json<RecordWinnerInput>,
) -> Result<Json<MatchResult>, (StatusCode, String)> {
    state
        .service
        .mutate("record_winner", |t| {
            let bracket = t.bracket().ok_or(StateConflict::NoBracket)?;
            let at = input.match_ref(bracket)?;
            t.record_winner(at, &input.winner)
        })
        .map(Json)
        .map_err(tournament_error)
}

pub async fn undo_winner(
    State(state): State<AppState>,
    Json(input): Json<UndoWinnerInput>,
) -> Result<Json<TournamentSnapshot>, (StatusCode, String)> {
    state
        .service
        .mutate("undo_winner", |t| {
            let bracket = t.bracket().ok_or(StateConflict::NoBracket)?;
            let at = input.match_ref(bracket)?;
            t.undo_winner(at)?;
            Ok(t.snapshot())
        })
        .map(Json)
        .map_err(tournament_error)
}

// ============================================================
// Timer
// ============================================================

pub async fn get_timer(State(state): State<AppState>) -> Json<TimerStatus> {
    Json(state.service.timer_status())
}

pub async fn start_timer(State(state): State<AppState>) -> Json<TimerStatus> {
    Json(state.timer.start())
}

pub async fn pause_timer(State(state): State<AppState>) -> Json<TimerStatus> {
    Json(state.timer.pause())
}

pub async fn reset_timer(State(state): State<AppState>) -> Json<TimerStatus> {
    Json(state.timer.reset())
}

// ============================================================
// Overlay and settings
// ============================================================

pub async fn get_overlay_mode(State(state): State<AppState>) -> Json<OverlayModeResponse> {
    Json(OverlayModeResponse {
        mode: state.service.read(|t| t.settings().overlay_mode),
    })
}

pub async fn set_overlay_mode(
    State(state): State<AppState>,
    Json(input): Json<SetOverlayModeInput>,
) -> Result<Json<OverlayModeResponse>, (StatusCode, String)> {
    state
        .service
        .mutate("set_overlay_mode", |t| t.set_overlay_mode(input.mode))
        .map(|()| Json(OverlayModeResponse { mode: input.mode }))
        .map_err(tournament_error)
}

pub async fn set_title(
    State(state): State<AppState>,
    Json(input): Json<SetTitleInput>,
) -> Result<Json<TournamentSettings>, (StatusCode, String)> {
    state
        .service
        .mutate("set_title", |t| {
            t.set_title(&input.title)?;
            Ok(t.settings().clone())
        })
        .map(Json)
        .map_err(tournament_error)
}

/// Wipe the whole event, including the match timer.
pub async fn reset_all(State(state): State<AppState>) -> Json<VersionResponse> {
    let version = state.service.reset_all();
    state.timer.reset();
    tracing::info!(version, "Tournament reset");
    Json(VersionResponse { version })
}
