//! Realty API Library
//!
//! Owners, their rental properties and the leases tenants submit on them,
//! with lease validation and property availability kept consistent on every
//! write.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod notifications;
pub mod openapi;
pub mod queries;
pub mod services;
pub mod validation;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// Routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    let owners = Router::new()
        .route(
            "/",
            get(handlers::owners::list_owners).post(handlers::owners::create_owner),
        )
        .route(
            "/:id",
            get(handlers::owners::get_owner)
                .put(handlers::owners::update_owner)
                .delete(handlers::owners::delete_owner),
        )
        .route("/:id/dashboard", get(handlers::owners::owner_dashboard))
        .route("/:id/leases", get(handlers::owners::owner_lease_requests));

    let properties = Router::new()
        .route(
            "/",
            get(handlers::properties::list_properties).post(handlers::properties::create_property),
        )
        .route(
            "/selectable",
            get(handlers::properties::selectable_properties),
        )
        .route(
            "/reconcile",
            post(handlers::properties::reconcile_properties),
        )
        .route(
            "/:id",
            get(handlers::properties::get_property)
                .put(handlers::properties::update_property)
                .delete(handlers::properties::delete_property),
        );

    let leases = Router::new()
        .route(
            "/",
            get(handlers::leases::list_leases).post(handlers::leases::submit_lease),
        )
        .route(
            "/:id",
            get(handlers::leases::get_lease)
                .put(handlers::leases::update_lease)
                .delete(handlers::leases::delete_lease),
        );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/tenant/dashboard",
            get(handlers::dashboards::tenant_dashboard),
        )
        .nest("/owners", owners)
        .nest("/properties", properties)
        .nest("/leases", leases)
}

/// CORS from configured origins; permissive in development when none are set.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.is_development() {
        info!("Using permissive CORS because explicit origins were not configured");
        CorsLayer::permissive()
    } else {
        // Same-origin only.
        CorsLayer::new()
    }
}

/// The full application router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .route("/", get(|| async { "realty-api up" }))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
