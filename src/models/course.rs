//! Course model with its nested curriculum of sections and lessons.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entity::{new_id, non_negative, require, require_if_present, Entity};
use super::Collections;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// Publication state; drafts are hidden from learners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LessonKind {
    #[default]
    Video,
    Article,
    Quiz,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: LessonKind,
    /// Taken from the video's metadata when the lesson is a video.
    #[serde(default)]
    pub duration_seconds: u64,
    /// Video URL, article body or quiz reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub is_preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Image URL or data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub curriculum: Vec<Section>,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub level: Option<CourseLevel>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub status: Option<CourseStatus>,
    #[serde(default)]
    pub curriculum: Vec<Section>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub level: Option<CourseLevel>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub status: Option<CourseStatus>,
    /// Replaces the whole curriculum when present.
    #[serde(default)]
    pub curriculum: Option<Vec<Section>>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Aggregate numbers shown on the course view page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_id: String,
    pub section_count: usize,
    pub lesson_count: usize,
    pub preview_lesson_count: usize,
    pub total_duration_seconds: u64,
    pub duration: String,
}

impl Course {
    pub fn summary(&self) -> CourseSummary {
        let lessons = || self.curriculum.iter().flat_map(|s| s.lessons.iter());
        // Durations come from the client; clamp instead of overflowing.
        let total = lessons().fold(0u64, |acc, l| acc.saturating_add(l.duration_seconds));

        CourseSummary {
            course_id: self.id.clone(),
            section_count: self.curriculum.len(),
            lesson_count: lessons().count(),
            preview_lesson_count: lessons().filter(|l| l.is_preview).count(),
            total_duration_seconds: total,
            duration: format_duration(total),
        }
    }
}

/// `H:MM:SS` when at least an hour, `M:SS` otherwise.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Titles are required; explicit section and lesson ids must not repeat.
fn validate_curriculum(curriculum: &[Section]) -> Result<(), AppError> {
    let mut section_ids = HashSet::new();
    let mut lesson_ids = HashSet::new();
    for section in curriculum {
        require("Section title", &section.title)?;
        unique_nested_id("section", &section.id, &mut section_ids)?;
        for lesson in &section.lessons {
            require("Lesson title", &lesson.title)?;
            unique_nested_id("lesson", &lesson.id, &mut lesson_ids)?;
        }
    }
    Ok(())
}

fn unique_nested_id<'a>(
    kind: &str,
    id: &'a str,
    seen: &mut HashSet<&'a str>,
) -> Result<(), AppError> {
    let id = id.trim();
    if !id.is_empty() && !seen.insert(id) {
        return Err(AppError::Validation(format!(
            "Duplicate {} id {} in curriculum",
            kind, id
        )));
    }
    Ok(())
}

/// Give new sections and lessons an id, keep existing ones.
fn assign_ids(curriculum: &mut [Section]) {
    for section in curriculum {
        if section.id.trim().is_empty() {
            section.id = new_id();
        }
        for lesson in &mut section.lessons {
            if lesson.id.trim().is_empty() {
                lesson.id = new_id();
            }
        }
    }
}

fn validate_prices(price: Option<f64>, discount_price: Option<f64>) -> Result<(), AppError> {
    non_negative("Price", price)?;
    non_negative("Discount price", discount_price)?;
    if let (Some(price), Some(discount)) = (price, discount_price) {
        if discount > price {
            return Err(AppError::Validation(
                "Discount price cannot exceed price".to_string(),
            ));
        }
    }
    Ok(())
}

impl Entity for Course {
    const COLLECTION: &'static str = "courses";
    const LABEL: &'static str = "Course";

    type Create = CreateCourseRequest;
    type Update = UpdateCourseRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn validate(request: &Self::Create) -> Result<(), AppError> {
        require("Course title", &request.title)?;
        require("Category", &request.category)?;
        validate_prices(request.price, request.discount_price)?;
        validate_curriculum(&request.curriculum)
    }

    fn create(id: String, now: String, request: Self::Create) -> Self {
        let mut curriculum = request.curriculum;
        assign_ids(&mut curriculum);

        Self {
            id,
            title: request.title.trim().to_string(),
            category: request.category,
            subtitle: request.subtitle,
            description: request.description,
            instructor: request.instructor,
            price: request.price,
            discount_price: request.discount_price,
            level: request.level.unwrap_or_default(),
            language: request.language,
            thumbnail: request.thumbnail,
            status: request.status.unwrap_or_default(),
            curriculum,
            updated_at: now,
            version: 1,
        }
    }

    fn expected_version(request: &Self::Update) -> Option<i64> {
        request.expected_version
    }

    fn apply(&mut self, request: Self::Update) -> Result<(), AppError> {
        require_if_present("Course title", request.title.as_ref())?;
        require_if_present("Category", request.category.as_ref())?;

        let price = request.price.or(self.price);
        let discount_price = request.discount_price.or(self.discount_price);
        validate_prices(price, discount_price)?;

        if let Some(mut curriculum) = request.curriculum {
            validate_curriculum(&curriculum)?;
            assign_ids(&mut curriculum);
            self.curriculum = curriculum;
        }
        if let Some(title) = request.title {
            self.title = title.trim().to_string();
        }
        if let Some(category) = request.category {
            self.category = category;
        }
        self.subtitle = request.subtitle.or(self.subtitle.take());
        self.description = request.description.or(self.description.take());
        self.instructor = request.instructor.or(self.instructor.take());
        self.price = price;
        self.discount_price = discount_price;
        self.level = request.level.unwrap_or(self.level);
        self.language = request.language.or(self.language.take());
        self.thumbnail = request.thumbnail.or(self.thumbnail.take());
        self.status = request.status.unwrap_or(self.status);
        Ok(())
    }

    fn stamp(&mut self, updated_at: String, version: i64) {
        self.updated_at = updated_at;
        self.version = version;
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.courses
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.courses
    }
}
