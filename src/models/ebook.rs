//! E-book model.

use serde::{Deserialize, Serialize};

use super::entity::{non_negative, require, require_if_present, Entity};
use super::Collections;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ebook {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// PDF as URL or data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_file: Option<String>,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEbookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub pdf_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEbookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub pdf_file: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl Entity for Ebook {
    const COLLECTION: &'static str = "ebooks";
    const LABEL: &'static str = "Ebook";

    type Create = CreateEbookRequest;
    type Update = UpdateEbookRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn validate(request: &Self::Create) -> Result<(), AppError> {
        require("Ebook title", &request.title)?;
        require("Author", &request.author)?;
        non_negative("Price", request.price)
    }

    fn create(id: String, now: String, request: Self::Create) -> Self {
        Self {
            id,
            title: request.title.trim().to_string(),
            author: request.author.trim().to_string(),
            description: request.description,
            category: request.category,
            price: request.price,
            pages: request.pages,
            cover_image: request.cover_image,
            pdf_file: request.pdf_file,
            updated_at: now,
            version: 1,
        }
    }

    fn expected_version(request: &Self::Update) -> Option<i64> {
        request.expected_version
    }

    fn apply(&mut self, request: Self::Update) -> Result<(), AppError> {
        require_if_present("Ebook title", request.title.as_ref())?;
        require_if_present("Author", request.author.as_ref())?;
        non_negative("Price", request.price)?;

        if let Some(title) = request.title {
            self.title = title.trim().to_string();
        }
        if let Some(author) = request.author {
            self.author = author.trim().to_string();
        }
        self.description = request.description.or(self.description.take());
        self.category = request.category.or(self.category.take());
        self.price = request.price.or(self.price);
        self.pages = request.pages.or(self.pages);
        self.cover_image = request.cover_image.or(self.cover_image.take());
        self.pdf_file = request.pdf_file.or(self.pdf_file.take());
        Ok(())
    }

    fn stamp(&mut self, updated_at: String, version: i64) {
        self.updated_at = updated_at;
        self.version = version;
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.ebooks
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.ebooks
    }
}
