//! Job posting model.

use serde::{Deserialize, Serialize};

use super::entity::{require, require_if_present, Entity};
use super::Collections;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: EmploymentType,
    /// Free-form, e.g. "40k - 55k".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub active: bool,
    pub updated_at: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub apply_url: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub apply_url: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Drop blank bullet points the form leaves behind.
fn clean_requirements(requirements: Vec<String>) -> Vec<String> {
    requirements
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

impl Entity for Job {
    const COLLECTION: &'static str = "jobs";
    const LABEL: &'static str = "Job";

    type Create = CreateJobRequest;
    type Update = UpdateJobRequest;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn validate(request: &Self::Create) -> Result<(), AppError> {
        require("Job title", &request.title)?;
        require("Company", &request.company)
    }

    fn create(id: String, now: String, request: Self::Create) -> Self {
        Self {
            id,
            title: request.title.trim().to_string(),
            company: request.company.trim().to_string(),
            location: request.location,
            employment_type: request.employment_type.unwrap_or_default(),
            salary: request.salary,
            description: request.description,
            requirements: clean_requirements(request.requirements),
            apply_url: request.apply_url,
            deadline: request.deadline,
            active: request.active,
            updated_at: now,
            version: 1,
        }
    }

    fn expected_version(request: &Self::Update) -> Option<i64> {
        request.expected_version
    }

    fn apply(&mut self, request: Self::Update) -> Result<(), AppError> {
        require_if_present("Job title", request.title.as_ref())?;
        require_if_present("Company", request.company.as_ref())?;

        if let Some(title) = request.title {
            self.title = title.trim().to_string();
        }
        if let Some(company) = request.company {
            self.company = company.trim().to_string();
        }
        if let Some(requirements) = request.requirements {
            self.requirements = clean_requirements(requirements);
        }
        self.location = request.location.or(self.location.take());
        self.employment_type = request.employment_type.unwrap_or(self.employment_type);
        self.salary = request.salary.or(self.salary.take());
        self.description = request.description.or(self.description.take());
        self.apply_url = request.apply_url.or(self.apply_url.take());
        self.deadline = request.deadline.or(self.deadline.take());
        self.active = request.active.unwrap_or(self.active);
        Ok(())
    }

    fn stamp(&mut self, updated_at: String, version: i64) {
        self.updated_at = updated_at;
        self.version = version;
    }

    fn collection(collections: &Collections) -> &Vec<Self> {
        &collections.jobs
    }

    fn collection_mut(collections: &mut Collections) -> &mut Vec<Self> {
        &mut collections.jobs
    }
}
