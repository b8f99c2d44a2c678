//! Datastore model: every collection plus revision metadata.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Category, Course, Ebook, Entity, Job, Lecture, Subscription, User};
use crate::errors::AppError;

/// All entity collections, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Collections {
    pub categories: Vec<Category>,
    pub courses: Vec<Course>,
    pub lectures: Vec<Lecture>,
    pub jobs: Vec<Job>,
    pub ebooks: Vec<Ebook>,
    pub users: Vec<User>,
    pub subscriptions: Vec<Subscription>,
}

impl Collections {
    /// Storage keys of every collection.
    pub const KEYS: [&'static str; 7] = [
        Category::COLLECTION,
        Course::COLLECTION,
        Lecture::COLLECTION,
        Job::COLLECTION,
        Ebook::COLLECTION,
        User::COLLECTION,
        Subscription::COLLECTION,
    ];

    /// Reject blank or repeated ids within any single collection.
    pub fn check_unique_ids(&self) -> Result<(), AppError> {
        unique_ids(&self.categories)?;
        unique_ids(&self.courses)?;
        unique_ids(&self.lectures)?;
        unique_ids(&self.jobs)?;
        unique_ids(&self.ebooks)?;
        unique_ids(&self.users)?;
        unique_ids(&self.subscriptions)
    }
}

fn unique_ids<E: Entity>(items: &[E]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.id().trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{} without an id in {}",
                E::LABEL,
                E::COLLECTION
            )));
        }
        if !seen.insert(item.id()) {
            return Err(AppError::Validation(format!(
                "Duplicate {} id {} in {}",
                E::LABEL,
                item.id(),
                E::COLLECTION
            )));
        }
    }
    Ok(())
}

/// The root datastore containing all application data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    #[serde(flatten)]
    pub collections: Collections,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
