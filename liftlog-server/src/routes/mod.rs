pub mod account;
pub mod exercises;
pub mod plans;
pub mod reports;
pub mod sessions;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::AppState;
use crate::config::Config;

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(index))
        .route("/api/auth/signup", post(account::signup))
        .route("/api/auth/login", post(account::login))
        .route("/api/auth/logout", post(account::logout))
        .route("/api/exercises", get(exercises::list_exercises))
        .route("/api/exercises/{exercise_id}", get(exercises::get_exercise))
        .route(
            "/api/workout-plans",
            get(plans::list_plans).post(plans::create_plan),
        )
        .route(
            "/api/workout-plans/{plan_id}",
            get(plans::get_plan)
                .patch(plans::update_plan)
                .delete(plans::delete_plan),
        )
        .route("/api/workout-sessions", get(sessions::list_sessions))
        .route(
            "/api/workout-sessions/{plan_id}",
            post(sessions::create_session),
        )
        .route(
            "/api/workout-sessions/{plan_id}/{session_id}",
            get(sessions::get_session)
                .patch(sessions::update_session)
                .delete(sessions::delete_session),
        )
        .route(
            "/api/reports/workout-plan/{plan_id}",
            get(reports::plan_report),
        )
        .layer(cors)
        .with_state(state)
}

async fn index() -> &'static str {
    "Workout Tracker API is running."
}

fn cors_layer(config: &Config) -> CorsLayer {
    // A literal `*` entry would panic tower-http's credentialed CORS setup.
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
