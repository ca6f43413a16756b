use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    CharacterResponse, HealthInfo, HealthResponse, ListResponse, SearchResponse, StatsResponse,
};
use crate::query::{self, ListParams, ListQuery, SearchParams};
use crate::state::AppState;
use crate::stats;
use crate::validation;

/// GET /api/characters - List characters with filtering, sorting, and pagination.
pub async fn list_characters(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListResponse>> {
    let list_query = ListQuery::parse(params)?;
    let snapshot = state.store.list_all()?;
    let (records, meta, filters_applied) = query::apply(snapshot, &list_query);

    Ok(Json(ListResponse {
        success: true,
        message: "Characters retrieved successfully".to_string(),
        data: records,
        meta,
        filters_applied,
    }))
}

/// GET /api/characters/{id} - Fetch a single character.
pub async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CharacterResponse>> {
    let id = validation::parse_id(&id)?;
    let character = state
        .store
        .find_by_id(id)?
        .ok_or_else(ApiError::character_not_found)?;

    Ok(Json(CharacterResponse {
        success: true,
        message: "Character found".to_string(),
        data: character,
    }))
}

/// GET /api/stats - Aggregate statistics over the whole catalog.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let snapshot = state.store.list_all()?;

    Ok(Json(StatsResponse {
        success: true,
        message: "Statistics retrieved".to_string(),
        data: stats::summarize(&snapshot),
    }))
}

/// GET /api/search?q= - Free-text search across the catalog, techniques included.
pub async fn search_characters(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let raw = params.q.unwrap_or_default();
    let term = raw.trim();
    if term.chars().count() < 2 {
        return Err(ApiError::BadRequest(
            "The search term must be at least 2 characters".to_string(),
        ));
    }

    let snapshot = state.store.list_all()?;
    let results = query::search(snapshot, term);

    Ok(Json(SearchResponse {
        success: true,
        message: format!("Found {} results", results.len()),
        data: results,
        search_term: raw,
    }))
}

/// GET /api/health - Liveness probe with uptime and record count.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let total_characters = state.store.count()?;

    Ok(Json(HealthResponse {
        success: true,
        message: "API running correctly".to_string(),
        data: HealthInfo {
            status: "OK",
            timestamp: Utc::now(),
            uptime: state.uptime_secs(),
            version: env!("CARGO_PKG_VERSION"),
            total_characters,
        },
    }))
}
