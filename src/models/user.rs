//! User record managed from the admin dashboard.

use serde::{Deserialize, Serialize};

use super::entity::{email, require, require_if_present, Entity};
use super::Collections;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    #[default]
    Student,
    Instructor,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";

    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn validate(request: &Self::Create) -> Result<(), AppError> {
        require("Name", &request.name)?;
        email("Email", &request.email)
    }

    fn create(id: String, now: String, request: Self::Create) -> Self {
        Self {
            id,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            phone: request.phone,
            role: request.role.unwrap_or_default(),
            active: request.active,
            avatar: request.avatar,
            updated_at: now,
            version: 1,
        }
    }

    fn expected_version(request: &Self::Update) -> Option<i64> {
        request.expected_version
    }

    fn apply(&mut self, request: Self::Update) -> Result<(), AppError> {
        require_if_present("Name", request.name.as_ref())?;
        if let Some(address) = &request.email {
            email("Email", address)?;
        }

        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(address) = request.email {
            self.email = address.trim().to_lowercase();
        }
        self.phone = request.phone.or(self.phone.take());
        self.role = request.role.unwrap_or(self.role);
        self.active = request.active.unwrap_or(self.active);
        self.avatar = request.avatar.or(self.avatar.take());
        Ok(())
    }

    fn stamp(&mut self, updated_at: String, version: i64) {
        self.updated_at = updated_at;
        self.version = version;
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.users
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.users
    }
}
