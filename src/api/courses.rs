//! Course view endpoints beyond plain CRUD.

use axum::extract::{Path, State};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Course, CourseSummary, Entity};
use crate::AppState;

/// GET /api/courses/{id}/summary - Section, lesson and duration totals.
pub async fn course_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CourseSummary> {
    let (summary, revision_id) = state
        .store
        .read(|c| {
            Course::collection(c)
                .iter()
                .find(|course| course.id == id)
                .map(Course::summary)
        })
        .await;

    match summary {
        Some(summary) => success(summary, revision_id),
        None => error(
            AppError::NotFound(format!("Course {} not found", id)),
            revision_id,
        ),
    }
}
