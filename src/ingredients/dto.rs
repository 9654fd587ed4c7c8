use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Ingredient, IngredientChanges, NewIngredient};
use crate::error::{nullable, nullable_rfc3339, ApiResult, FieldErrors, Validate};

const MAX_UNIT_LEN: usize = 20;

#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub price_per_unit: Decimal,
    pub unit: String,
    pub store_name: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub valid_from: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub price_per_unit: Option<Decimal>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub store_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_rfc3339")]
    pub valid_from: Option<Option<OffsetDateTime>>,
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub price_per_unit: Decimal,
    pub unit: String,
    pub store_name: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub valid_from: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Ingredient> for IngredientResponse {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            price_per_unit: i.price_per_unit,
            unit: i.unit,
            store_name: i.store_name,
            valid_from: i.valid_from,
            created_at: i.created_at,
        }
    }
}

fn check_price(errors: &mut FieldErrors, price: Decimal) {
    if price.is_sign_negative() {
        errors.add("price_per_unit", "Ensure this value is greater than or equal to 0.");
    }
    errors.check_decimal("price_per_unit", price, 10, 2);
}

fn check_unit(errors: &mut FieldErrors, unit: &str) {
    let unit = unit.trim();
    if unit.is_empty() {
        errors.add("unit", "This field may not be blank.");
    } else if unit.chars().count() > MAX_UNIT_LEN {
        errors.add(
            "unit",
            format!("Ensure this field has no more than {MAX_UNIT_LEN} characters."),
        );
    }
}

impl Validate for CreateIngredientRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "This field may not be blank.");
        }
        check_price(&mut errors, self.price_per_unit);
        check_unit(&mut errors, &self.unit);
        errors.into_result()
    }
}

impl Validate for UpdateIngredientRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            errors.add("name", "This field may not be blank.");
        }
        if let Some(price) = self.price_per_unit {
            check_price(&mut errors, price);
        }
        if let Some(unit) = &self.unit {
            check_unit(&mut errors, unit);
        }
        errors.into_result()
    }
}

impl From<CreateIngredientRequest> for NewIngredient {
    fn from(r: CreateIngredientRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            price_per_unit: r.price_per_unit,
            unit: r.unit.trim().to_string(),
            store_name: r.store_name,
            valid_from: r.valid_from,
        }
    }
}

impl From<UpdateIngredientRequest> for IngredientChanges {
    fn from(r: UpdateIngredientRequest) -> Self {
        Self {
            name: r.name.map(|n| n.trim().to_string()),
            price_per_unit: r.price_per_unit,
            unit: r.unit.map(|u| u.trim().to_string()),
            store_name: r.store_name,
            valid_from: r.valid_from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn rejects_negative_price_and_long_unit() {
        let req = CreateIngredientRequest {
            name: "Salt".into(),
            price_per_unit: Decimal::new(-1, 2),
            unit: "a-unit-name-that-is-far-too-long".into(),
            store_name: None,
            valid_from: None,
        };
        match req.validate().unwrap_err() {
            ApiError::Validation(fields) => {
                assert!(fields.get("price_per_unit").is_some());
                assert!(fields.get("unit").is_some());
                assert!(fields.get("name").is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decodes_string_price_and_rfc3339_date() {
        let req: CreateIngredientRequest = serde_json::from_str(
            r#"{"name":"Egg","price_per_unit":"0.50","unit":"piece","valid_from":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.price_per_unit, Decimal::new(50, 2));
        assert!(req.valid_from.is_some());
        assert!(req.validate().is_ok());
    }
}
