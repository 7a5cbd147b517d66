use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use models::{MapObject, MapObjectPatch, NewMapObject};
use tracing::debug;

use crate::errors::JsonApiError;
use crate::routes::AppState;

/// List all submitted map objects in submission order.
pub async fn list_requests(State(state): State<AppState>) -> Json<Vec<MapObject>> {
    Json(state.store.list_all().await)
}

/// Submit a new map object; it is stored as pending.
pub async fn create_request(
    State(state): State<AppState>,
    payload: Result<Json<NewMapObject>, JsonRejection>,
) -> Result<(StatusCode, Json<MapObject>), JsonApiError> {
    let Json(input) = payload.map_err(reject_body)?;
    let created = state.store.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Merge `status` (and optionally description, category, color) into a record.
pub async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MapObjectPatch>, JsonRejection>,
) -> Result<Json<MapObject>, JsonApiError> {
    let Json(patch) = payload.map_err(reject_body)?;
    let id = parse_id(&id).ok_or_else(|| JsonApiError::not_found(format!("map object {id} not found")))?;
    let updated = state.store.update(id, patch).await?;
    Ok(Json(updated))
}

/// Remove a record. Always 204: unknown (or unparseable) ids match nothing.
pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    match parse_id(&id) {
        Some(id) => {
            state.store.delete(id).await?;
        }
        None => debug!(%id, "delete with non-numeric id ignored"),
    }
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Body problems are the caller's fault: 400, except oversized bodies which keep 413.
fn reject_body(rejection: JsonRejection) -> JsonApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return JsonApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large", Some(rejection.body_text()));
    }
    JsonApiError::bad_request(rejection.body_text())
}
