//! HTTP route handlers for the Plantheon API.
//!
//! Every endpoint lives under `/api/v1`. Each sub-module handles one entity:
//!
//! - `health`: liveness, readiness, version and metrics
//! - `auth`: registration and login
//! - `users`: the caller's profile
//! - `diseases`: the disease catalog and bulk import
//! - `activities`: the shared activity calendar
//! - `posts` / `comments`: the social feed
//! - `scan_history`: the caller's diagnosis history

pub mod activities;
pub mod auth;
pub mod comments;
pub mod diseases;
pub mod health;
pub mod posts;
pub mod scan_history;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    rate_limit::endpoint_rate_limit_middleware, security_headers::security_headers_middleware,
    validation::validate_request_middleware,
};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/readyz", get(health::readyz))
        .route("/version", get(health::version))
        .route("/metrics", get(health::metrics))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Users
        .route("/users/profile", get(users::get_profile).put(users::update_profile))
        // Diseases
        .route("/diseases", get(diseases::list_diseases).post(diseases::create_disease))
        .route("/diseases/all", get(diseases::all_diseases))
        .route("/diseases/count", get(diseases::count_diseases))
        .route("/diseases/import", post(diseases::import_diseases))
        .route("/diseases/import-excel", post(diseases::import_diseases))
        .route(
            "/diseases/{key}",
            get(diseases::get_disease).put(diseases::update_disease).delete(diseases::delete_disease),
        )
        // Activities
        .route("/activities", get(activities::list_activities).post(activities::create_activity))
        .route("/activities/all", get(activities::all_activities))
        .route("/activities/count", get(activities::count_activities))
        .route("/activities/by-day", get(activities::activities_by_day))
        .route("/activities/calendar", get(activities::month_calendar))
        .route(
            "/activities/{id}",
            get(activities::get_activity).put(activities::update_activity).delete(activities::delete_activity),
        )
        // Posts and comments
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/{id}", get(posts::get_post).put(posts::update_post).delete(posts::delete_post))
        .route("/posts/{id}/like", post(posts::like_post))
        .route("/posts/{id}/unlike", post(posts::unlike_post))
        .route("/posts/{id}/share", post(posts::share_post))
        .route("/posts/{id}/comments", post(comments::create_comment))
        // Scan history
        .route(
            "/scan-history",
            get(scan_history::list_scan_history)
                .post(scan_history::create_scan_history)
                .delete(scan_history::clear_scan_history),
        )
        .route(
            "/scan-history/{id}",
            get(scan_history::get_scan_history).delete(scan_history::delete_scan_history),
        )
}

/// Builds the complete application router with its middleware stack.
///
/// The rate limiter is keyed on the full request path, so it sits outside the
/// `/api/v1` nest.
pub fn router(state: AppState) -> Router {
    let cfg = state.config.clone();
    let max_body = cfg.server.max_body_bytes;

    Router::new()
        .nest(API_PREFIX, api_routes())
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(max_body))
        .layer(from_fn_with_state(cfg.clone(), validate_request_middleware))
        .layer(from_fn_with_state(state, endpoint_rate_limit_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(cfg, security_headers_middleware))
        .layer(CorsLayer::permissive())
}
