mod handlers;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::service::TournamentService;
use crate::timer::MatchTimer;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub service: TournamentService,
    /// The same timer the service reads, kept concrete so handlers can drive it.
    pub timer: Arc<MatchTimer>,
}

pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        // Snapshot polling
        .route("/data", get(handlers::get_data))
        .route("/version", get(handlers::get_version))
        .route("/snapshot", get(handlers::get_snapshot))
        // Roster
        .route(
            "/robots",
            get(handlers::list_robots)
                .post(handlers::add_robot)
                .put(handlers::replace_robots),
        )
        .route("/robots/generate-test-data", post(handlers::generate_test_robots))
        .route("/robots/{name}", delete(handlers::delete_robot))
        // Bracket and seeding
        .route(
            "/bracket",
            get(handlers::get_bracket).post(handlers::build_bracket),
        )
        .route("/bracket/tree", get(handlers::get_bracket_tree))
        .route("/bracket/reset", post(handlers::reset_bracket))
        .route("/bracket/clear-results", post(handlers::clear_results))
        .route("/bracket/assign", post(handlers::assign_slot))
        .route("/bracket/slots/{slot}", delete(handlers::clear_slot))
        .route("/bracket/random", post(handlers::random_assignment))
        .route("/bracket/start", post(handlers::start_tournament))
        // Matches
        .route("/match", get(handlers::get_match))
        .route("/match/winner", post(handlers::record_winner))
        .route("/match/undo", post(handlers::undo_winner))
        // Timer
        .route("/timer", get(handlers::get_timer))
        .route("/timer/start", post(handlers::start_timer))
        .route("/timer/pause", post(handlers::pause_timer))
        .route("/timer/reset", post(handlers::reset_timer))
        // Overlay and settings
        .route(
            "/overlay/mode",
            get(handlers::get_overlay_mode).post(handlers::set_overlay_mode),
        )
        .route("/settings/title", post(handlers::set_title))
        .route("/reset", post(handlers::reset_all))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
        .with_state(state)
}

/// The overlay runs as a browser source on another origin, so CORS is open
/// unless an explicit origin list is configured.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let Some(origins) = &config.cors_origins else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
