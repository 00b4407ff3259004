use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::{StoreError, COLLECTION};
use crate::error::ApiError;
use crate::handlers::body::EventBody;
use crate::models::event::{strip_id, Event};
use crate::AppState;

const LIST_FAILED: &str = "Erro ao obter eventos";
const ADD_FAILED: &str = "Erro ao adicionar evento";
const UPDATE_FAILED: &str = "Erro ao atualizar evento";
const DELETE_FAILED: &str = "Erro ao excluir evento";

pub const UPDATED: &str = "Evento atualizado com sucesso.";
pub const DELETED: &str = "Evento excluído com sucesso.";

// GET /content
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let documents = state
        .store
        .list(COLLECTION)
        .await
        .map_err(|e| ApiError::store(LIST_FAILED, e))?;

    Ok(Json(documents.into_iter().map(Event::from_document).collect()))
}

// POST /contents
pub async fn create_event(
    State(state): State<AppState>,
    EventBody(payload): EventBody,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    tracing::debug!("POST /contents called");
    let fields = strip_id(payload);

    let id = state
        .store
        .add(COLLECTION, fields.clone())
        .await
        .map_err(|e| ApiError::store(ADD_FAILED, e))?;

    tracing::info!("Event {} added", id);
    Ok((StatusCode::CREATED, Json(Event::new(id, fields))))
}

// PUT /content/:id
pub async fn update_event(
    Path(id): Path<String>,
    State(state): State<AppState>,
    EventBody(payload): EventBody,
) -> Result<&'static str, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::MissingId);
    }

    ensure_exists(&state, &id, UPDATE_FAILED).await?;

    match state.store.update(COLLECTION, &id, strip_id(payload)).await {
        Ok(()) => {
            tracing::info!("Event {} updated", id);
            Ok(UPDATED)
        }
        // Removed between the existence check and the write.
        Err(StoreError::NotFound(_)) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::store(UPDATE_FAILED, e)),
    }
}

// DELETE /content/:id
pub async fn delete_event(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<&'static str, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::MissingId);
    }

    ensure_exists(&state, &id, DELETE_FAILED).await?;

    match state.store.delete(COLLECTION, &id).await {
        Ok(()) => {
            tracing::info!("Event {} deleted", id);
            Ok(DELETED)
        }
        Err(StoreError::NotFound(_)) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::store(DELETE_FAILED, e)),
    }
}

/// PUT/DELETE on `/content` or `/content/` with no id segment.
pub async fn missing_event_id() -> ApiError {
    ApiError::MissingId
}

async fn ensure_exists(state: &AppState, id: &str, failure: &'static str) -> Result<(), ApiError> {
    match state.store.get(COLLECTION, id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => Err(ApiError::store(failure, e)),
    }
}
