//! Route definitions for the DairyFlow API

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes
        .nest("/auth", auth_routes(state))
        // Protected routes - admin accounts (superadmin)
        .nest("/admins", admin_routes(state))
        // Protected routes - farmer registry
        .nest("/farmers", farmer_routes(state))
        // Protected routes - feed stock
        .nest("/stock", stock_routes(state))
        // Protected routes - feed requests
        .nest("/requests", request_routes(state))
        // Protected routes - reports
        .nest("/reports", report_routes(state))
}

/// Authentication routes; only login is public
fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/profile", get(handlers::profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/login", post(handlers::login))
        .merge(protected)
}

/// Admin account routes (protected)
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_admins).post(handlers::create_admin))
        .route(
            "/:admin_id",
            get(handlers::get_admin)
                .put(handlers::update_admin)
                .delete(handlers::delete_admin),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Farmer routes (protected)
fn farmer_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farmers).post(handlers::create_farmer))
        .route("/stats", get(handlers::farmer_stats))
        .route(
            "/:farmer_id",
            get(handlers::get_farmer)
                .put(handlers::update_farmer)
                .delete(handlers::delete_farmer),
        )
        .route("/:farmer_id/toggle-status", patch(handlers::toggle_farmer_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Stock routes (protected)
fn stock_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock).post(handlers::create_stock))
        .route("/low-stock", get(handlers::low_stock))
        .route("/stats", get(handlers::stock_stats))
        .route(
            "/:stock_id",
            get(handlers::get_stock)
                .put(handlers::update_stock)
                .delete(handlers::delete_stock),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Feed request routes (protected)
fn request_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_requests).post(handlers::create_request))
        .route("/pending", get(handlers::list_pending_requests))
        .route("/:request_id", get(handlers::get_request))
        .route("/:request_id/approve", patch(handlers::approve_request))
        .route("/:request_id/reject", patch(handlers::reject_request))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Report routes (protected)
fn report_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_report))
        .route("/farmer/:farmer_id", get(handlers::get_farmer_statement))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}
