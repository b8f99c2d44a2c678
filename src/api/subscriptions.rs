//! Subscription endpoints beyond plain CRUD.

use axum::extract::{Path, State};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Entity, Subscription, SubscriptionContents};
use crate::AppState;

/// GET /api/subscriptions/{id}/contents - Referenced courses and ebooks.
pub async fn subscription_contents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SubscriptionContents> {
    let (contents, revision_id) = state
        .store
        .read(|collections| {
            Subscription::collection(collections)
                .iter()
                .find(|s| s.id == id)
                .map(|s| SubscriptionContents::resolve(s, collections))
        })
        .await;

    match contents {
        Some(contents) => {
            if !contents.missing_course_ids.is_empty() || !contents.missing_ebook_ids.is_empty() {
                tracing::debug!(
                    subscription_id = %id,
                    missing_courses = contents.missing_course_ids.len(),
                    missing_ebooks = contents.missing_ebook_ids.len(),
                    "Subscription references deleted items"
                );
            }
            success(contents, revision_id)
        }
        None => error(
            AppError::NotFound(format!("Subscription {} not found", id)),
            revision_id,
        ),
    }
}
