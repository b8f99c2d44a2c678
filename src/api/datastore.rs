//! Datastore API endpoints.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::models::{Collections, Datastore, RevisionInfo};
use crate::AppState;

/// GET /api/datastore - Get the full datastore.
pub async fn get_datastore(State(state): State<AppState>) -> ApiResult<Datastore> {
    let datastore = state.store.datastore().await;
    let revision_id = datastore.revision_id;
    success(datastore, revision_id)
}

/// PUT /api/datastore - Replace every collection with the uploaded ones.
pub async fn import_datastore(
    State(state): State<AppState>,
    Json(collections): Json<Collections>,
) -> ApiResult<Datastore> {
    match state.store.import(collections).await {
        Ok(datastore) => {
            let revision_id = datastore.revision_id;
            success(datastore, revision_id)
        }
        Err(e) => error(e, state.store.revision_id().await),
    }
}

/// GET /api/datastore/revision - Get the current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let info = state.store.revision_info().await;
    let revision_id = info.revision_id;
    success(info, revision_id)
}
