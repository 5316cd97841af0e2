use crate::api::{handlers, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health_check))
        // Course catalog
        .route("/course/search", get(handlers::search_courses))
        .route("/course/add", post(handlers::add_course))
        .route("/course/remove", delete(handlers::remove_course))
        // Timetables
        .route("/timetable/search", get(handlers::search_timetables))
        .route("/timetable/add", post(handlers::add_timetable))
        .route("/timetable/remove", delete(handlers::remove_timetable))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
