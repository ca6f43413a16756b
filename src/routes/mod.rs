pub mod api;
pub mod characters;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Request bodies above this size are rejected outright.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service catalog
        .route("/", get(index))
        // Character CRUD
        .route("/api/characters", get(api::list_characters))
        .route("/api/characters", post(characters::create_character))
        .route("/api/characters/{id}", get(api::get_character))
        .route("/api/characters/{id}", put(characters::replace_character))
        .route("/api/characters/{id}", patch(characters::patch_character))
        .route("/api/characters/{id}", delete(characters::delete_character))
        // Aggregates and search
        .route("/api/stats", get(api::get_stats))
        .route("/api/search", get(api::search_characters))
        // Health check
        .route("/api/health", get(api::health))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Naruto Universe CRUD REST API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "API for managing characters from the Naruto universe",
        "endpoints": {
            "characters": {
                "GET /api/characters": "List characters (filters, sorting, pagination)",
                "GET /api/characters/{id}": "Fetch a single character",
                "POST /api/characters": "Create a new character",
                "PUT /api/characters/{id}": "Fully replace a character",
                "PATCH /api/characters/{id}": "Partially update a character",
                "DELETE /api/characters/{id}": "Delete a character"
            },
            "utilities": {
                "GET /api/stats": "Aggregate statistics",
                "GET /api/search": "Free-text search",
                "GET /api/health": "API health"
            }
        },
        "available_filters": [
            "village", "clan", "rank", "element", "gender", "status", "min_age", "max_age"
        ],
        "examples": {
            "filter_by_village": "/api/characters?village=Konohagakure",
            "search_by_name": "/api/characters?search=naruto",
            "pagination": "/api/characters?page=1&limit=10",
            "sorting": "/api/characters?sort=name&order=asc"
        }
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Endpoint not found",
            "data": null,
            "available_endpoints": [
                "GET /",
                "GET /api/characters",
                "GET /api/characters/{id}",
                "POST /api/characters",
                "PUT /api/characters/{id}",
                "PATCH /api/characters/{id}",
                "DELETE /api/characters/{id}",
                "GET /api/stats",
                "GET /api/search",
                "GET /api/health"
            ]
        })),
    )
}
