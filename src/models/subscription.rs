//! Subscription plan bundling courses and ebooks.

use serde::{Deserialize, Serialize};

use super::entity::{non_negative, require, require_if_present, Entity};
use super::{Collections, Course, Ebook};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    /// Plain references; deleting a course leaves them dangling.
    #[serde(default)]
    pub course_ids: Vec<String>,
    #[serde(default)]
    pub ebook_ids: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub active: bool,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub course_ids: Vec<String>,
    #[serde(default)]
    pub ebook_ids: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub course_ids: Option<Vec<String>>,
    #[serde(default)]
    pub ebook_ids: Option<Vec<String>>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// A subscription's references resolved against the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionContents {
    pub subscription_id: String,
    pub courses: Vec<Course>,
    pub ebooks: Vec<Ebook>,
    pub missing_course_ids: Vec<String>,
    pub missing_ebook_ids: Vec<String>,
}

impl SubscriptionContents {
    pub fn resolve(subscription: &Subscription, collections: &Collections) -> Self {
        let (courses, missing_course_ids) = lookup(&subscription.course_ids, &collections.courses);
        let (ebooks, missing_ebook_ids) = lookup(&subscription.ebook_ids, &collections.ebooks);

        Self {
            subscription_id: subscription.id.clone(),
            courses,
            ebooks,
            missing_course_ids,
            missing_ebook_ids,
        }
    }
}

fn lookup<E: Entity>(ids: &[String], items: &[E]) -> (Vec<E>, Vec<String>) {
    let mut found = Vec::new();
    let mut missing = Vec::new();
    for id in ids {
        match items.iter().find(|item| item.id() == id) {
            Some(item) => found.push(item.clone()),
            None => missing.push(id.clone()),
        }
    }
    (found, missing)
}

/// Keep first occurrence order, drop blanks and repeats.
fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim().to_string();
        if !id.is_empty() && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

fn require_price(price: Option<f64>) -> Result<f64, AppError> {
    non_negative("Price", price)?;
    price.ok_or_else(|| AppError::Validation("Price is required".to_string()))
}

impl Entity for Subscription {
    const COLLECTION: &'static str = "subscriptions";
    const LABEL: &'static str = "Subscription";

    type Create = CreateSubscriptionRequest;
    type Update = UpdateSubscriptionRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn validate(request: &Self::Create) -> Result<(), AppError> {
        require("Plan name", &request.name)?;
        require_price(request.price).map(|_| ())
    }

    fn create(id: String, now: String, request: Self::Create) -> Self {
        Self {
            id,
            name: request.name.trim().to_string(),
            price: request.price.unwrap_or_default(),
            description: request.description,
            duration_days: request.duration_days,
            course_ids: dedup_ids(request.course_ids),
            ebook_ids: dedup_ids(request.ebook_ids),
            features: request.features,
            active: request.active,
            updated_at: now,
            version: 1,
        }
    }

    fn expected_version(request: &Self::Update) -> Option<i64> {
        request.expected_version
    }

    fn apply(&mut self, request: Self::Update) -> Result<(), AppError> {
        require_if_present("Plan name", request.name.as_ref())?;
        non_negative("Price", request.price)?;

        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(course_ids) = request.course_ids {
            self.course_ids = dedup_ids(course_ids);
        }
        if let Some(ebook_ids) = request.ebook_ids {
            self.ebook_ids = dedup_ids(ebook_ids);
        }
        if let Some(features) = request.features {
            self.features = features;
        }
        self.price = request.price.unwrap_or(self.price);
        self.description = request.description.or(self.description.take());
        self.duration_days = request.duration_days.or(self.duration_days);
        self.active = request.active.unwrap_or(self.active);
        Ok(())
    }

    fn stamp(&mut self, updated_at: String, version: i64) {
        self.updated_at = updated_at;
        self.version = version;
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.subscriptions
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.subscriptions
    }
}
