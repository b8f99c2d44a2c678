//! List / add / view / edit / delete endpoints shared by every collection.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::Entity;
use crate::AppState;

/// Routes for one collection: `/{collection}` and `/{collection}/{id}`.
pub fn collection_routes<E: Entity>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/{}", E::COLLECTION),
            get(list_records::<E>).post(create_record::<E>),
        )
        .route(
            &format!("/{}/{{id}}", E::COLLECTION),
            get(get_record::<E>)
                .put(update_record::<E>)
                .delete(delete_record::<E>),
        )
}

/// GET /api/{collection}
pub async fn list_records<E: Entity>(State(state): State<AppState>) -> ApiResult<Vec<E>> {
    let (records, revision_id) = state.store.list::<E>().await;
    success(records, revision_id)
}

/// GET /api/{collection}/{id}
pub async fn get_record<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<E> {
    let (record, revision_id) = state.store.get::<E>(&id).await;

    match record {
        Some(record) => success(record, revision_id),
        None => error(
            AppError::NotFound(format!("{} {} not found", E::LABEL, id)),
            revision_id,
        ),
    }
}

/// POST /api/{collection}
pub async fn create_record<E: Entity>(
    State(state): State<AppState>,
    Json(request): Json<E::Create>,
) -> ApiResult<E> {
    match state.store.create::<E>(request).await {
        Ok(record) => success(record, state.store.revision_id().await),
        Err(e) => error(e, state.store.revision_id().await),
    }
}

/// PUT /api/{collection}/{id}
pub async fn update_record<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<E::Update>,
) -> ApiResult<E> {
    match state.store.update::<E>(&id, request).await {
        Ok(record) => success(record, state.store.revision_id().await),
        Err(e) => error(e, state.store.revision_id().await),
    }
}

/// DELETE /api/{collection}/{id}
pub async fn delete_record<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    match state.store.delete::<E>(&id).await {
        Ok(()) => success((), state.store.revision_id().await),
        Err(e) => error(e, state.store.revision_id().await),
    }
}
