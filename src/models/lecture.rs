//! Standalone video lecture, optionally attached to a course.

use serde::{Deserialize, Serialize};

use super::entity::{require, require_if_present, Entity};
use super::Collections;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: String,
    pub title: String,
    pub video_url: String,
    /// Not enforced: the course may since have been deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub is_preview: bool,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLectureRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub is_preview: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLectureRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub is_preview: Option<bool>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl Entity for Lecture {
    const COLLECTION: &'static str = "lectures";
    const LABEL: &'static str = "Lecture";

    type Create = CreateLectureRequest;
    type Update = UpdateLectureRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn validate(request: &Self::Create) -> Result<(), AppError> {
        require("Lecture title", &request.title)?;
        require("Video", &request.video_url)
    }

    fn create(id: String, now: String, request: Self::Create) -> Self {
        Self {
            id,
            title: request.title.trim().to_string(),
            video_url: request.video_url,
            course_id: request.course_id,
            description: request.description,
            duration_seconds: request.duration_seconds,
            is_preview: request.is_preview,
            updated_at: now,
            version: 1,
        }
    }

    fn expected_version(request: &Self::Update) -> Option<i64> {
        request.expected_version
    }

    fn apply(&mut self, request: Self::Update) -> Result<(), AppError> {
        require_if_present("Lecture title", request.title.as_ref())?;
        require_if_present("Video", request.video_url.as_ref())?;

        if let Some(title) = request.title {
            self.title = title.trim().to_string();
        }
        if let Some(video_url) = request.video_url {
            self.video_url = video_url;
        }
        self.course_id = request.course_id.or(self.course_id.take());
        self.description = request.description.or(self.description.take());
        self.duration_seconds = request.duration_seconds.unwrap_or(self.duration_seconds);
        self.is_preview = request.is_preview.unwrap_or(self.is_preview);
        Ok(())
    }

    fn stamp(&mut self, updated_at: String, version: i64) {
        self.updated_at = updated_at;
        self.version = version;
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.lectures
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.lectures
    }
}
