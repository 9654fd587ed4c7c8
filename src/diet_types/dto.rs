use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{DietType, DietTypeChanges, NewDietType};
use crate::error::{nullable, ApiResult, FieldErrors, Validate};

#[derive(Debug, Deserialize)]
pub struct CreateDietTypeRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_restricted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDietTypeRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub is_restricted: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DietTypeResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_restricted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Validate for CreateDietTypeRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "This field may not be blank.");
        }
        errors.into_result()
    }
}

impl Validate for UpdateDietTypeRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            errors.add("name", "This field may not be blank.");
        }
        errors.into_result()
    }
}

impl From<CreateDietTypeRequest> for NewDietType {
    fn from(r: CreateDietTypeRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            description: r.description,
            is_restricted: r.is_restricted,
        }
    }
}

impl From<UpdateDietTypeRequest> for DietTypeChanges {
    fn from(r: UpdateDietTypeRequest) -> Self {
        Self {
            name: r.name.map(|n| n.trim().to_string()),
            description: r.description,
            is_restricted: r.is_restricted,
        }
    }
}

impl From<DietType> for DietTypeResponse {
    fn from(d: DietType) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            is_restricted: d.is_restricted,
            created_at: d.created_at,
        }
    }
}
