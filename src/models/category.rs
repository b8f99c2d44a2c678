//! Course and ebook category.

use serde::{Deserialize, Serialize};

use super::entity::{require, require_if_present, Entity};
use super::Collections;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";
    const LABEL: &'static str = "Category";

    type Create = CreateCategoryRequest;
    type Update = UpdateCategoryRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn validate(request: &Self::Create) -> Result<(), AppError> {
        require("Category name", &request.name)
    }

    fn create(id: String, now: String, request: Self::Create) -> Self {
        Self {
            id,
            name: request.name.trim().to_string(),
            description: request.description,
            icon: request.icon,
            updated_at: now,
            version: 1,
        }
    }

    fn expected_version(request: &Self::Update) -> Option<i64> {
        request.expected_version
    }

    fn apply(&mut self, request: Self::Update) -> Result<(), AppError> {
        require_if_present("Category name", request.name.as_ref())?;

        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        self.description = request.description.or(self.description.take());
        self.icon = request.icon.or(self.icon.take());
        Ok(())
    }

    fn stamp(&mut self, updated_at: String, version: i64) {
        self.updated_at = updated_at;
        self.version = version;
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.categories
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.categories
    }
}
