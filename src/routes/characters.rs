use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::{CharacterResponse, DeleteResponse, DeletedCharacter, PatchResponse};
use crate::state::AppState;
use crate::validation::{self, FieldError};

/// POST /api/characters - Create a character.
pub async fn create_character(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<CharacterResponse>)> {
    let draft = validation::parse_create(&body)?;
    let character = state.store.create(draft)?;
    tracing::info!("created character {} ({})", character.id, character.name);

    Ok((
        StatusCode::CREATED,
        Json(CharacterResponse {
            success: true,
            message: "Character created successfully".to_string(),
            data: character,
        }),
    ))
}

/// PUT /api/characters/{id} - Fully replace a character. Optional fields
/// omitted from the body are cleared, not retained.
pub async fn replace_character(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<CharacterResponse>> {
    let (id, draft) = match (validation::parse_id(&id), validation::parse_create(&body)) {
        (Ok(id), Ok(draft)) => (id, draft),
        (id, draft) => return Err(combine(id.err(), draft.err())),
    };
    let character = state.store.replace(id, draft)?;
    tracing::info!("replaced character {id}");

    Ok(Json(CharacterResponse {
        success: true,
        message: "Character updated successfully".to_string(),
        data: character,
    }))
}

/// PATCH /api/characters/{id} - Partially update a character.
pub async fn patch_character(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<PatchResponse>> {
    let (id, patch) = match (validation::parse_id(&id), validation::parse_patch(&body)) {
        (Ok(id), Ok(patch)) => (id, patch),
        (id, patch) => return Err(combine(id.err(), patch.err())),
    };
    let (character, updated_fields) = state.store.update(id, &patch)?;
    tracing::info!("patched character {id}");

    Ok(Json(PatchResponse {
        success: true,
        message: "Character partially updated".to_string(),
        data: character,
        updated_fields,
    }))
}

/// DELETE /api/characters/{id} - Remove a character.
pub async fn delete_character(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = validation::parse_id(&id)?;
    let character = state.store.delete(id)?;
    tracing::info!("deleted character {} ({})", character.id, character.name);

    Ok(Json(DeleteResponse {
        success: true,
        message: "Character deleted successfully".to_string(),
        data: DeletedCharacter {
            id: character.id,
            name: character.name,
            deleted_at: Utc::now(),
        },
    }))
}

/// Merge path-id and body violations into one 400 response, id first.
fn combine(id: Option<FieldError>, body: Option<Vec<FieldError>>) -> ApiError {
    let mut errors = Vec::new();
    if let Some(error) = id {
        errors.push(error);
    }
    if let Some(body_errors) = body {
        errors.extend(body_errors);
    }
    ApiError::Validation(errors)
}
