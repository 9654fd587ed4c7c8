use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Meal, MealChanges, MealIngredient, MealIngredientLine, NewMeal};
use crate::error::{nullable, ApiResult, FieldErrors, Validate};

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    pub description: Option<String>,
    pub diet_type_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub diet_type_id: Option<Option<Uuid>>,
}

/// Body of `POST /meals/:id/ingredients`.
#[derive(Debug, Deserialize)]
pub struct AddIngredientRequest {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub diet_type_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct MealIngredientResponse {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One ingredient of a meal with what it contributes to the price.
#[derive(Debug, Serialize)]
pub struct MealIngredientLineResponse {
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub price_per_unit: Decimal,
    pub quantity: Decimal,
    pub cost: Decimal,
}

impl Validate for CreateMealRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "This field may not be blank.");
        }
        errors.into_result()
    }
}

impl Validate for UpdateMealRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            errors.add("name", "This field may not be blank.");
        }
        errors.into_result()
    }
}

impl Validate for AddIngredientRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if self.quantity <= Decimal::ZERO {
            errors.add("quantity", "Ensure this value is greater than 0.");
        }
        errors.check_decimal("quantity", self.quantity, 5, 2);
        errors.into_result()
    }
}

impl From<CreateMealRequest> for NewMeal {
    fn from(r: CreateMealRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            description: r.description,
            diet_type_id: r.diet_type_id,
        }
    }
}

impl From<UpdateMealRequest> for MealChanges {
    fn from(r: UpdateMealRequest) -> Self {
        Self {
            name: r.name.map(|n| n.trim().to_string()),
            description: r.description,
            diet_type_id: r.diet_type_id,
        }
    }
}

impl From<Meal> for MealResponse {
    fn from(m: Meal) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            diet_type_id: m.diet_type_id,
            created_at: m.created_at,
        }
    }
}

impl From<MealIngredient> for MealIngredientResponse {
    fn from(l: MealIngredient) -> Self {
        Self {
            id: l.id,
            meal_id: l.meal_id,
            ingredient_id: l.ingredient_id,
            quantity: l.quantity,
            created_at: l.created_at,
        }
    }
}

impl From<MealIngredientLine> for MealIngredientLineResponse {
    fn from(l: MealIngredientLine) -> Self {
        Self {
            cost: l.price_per_unit * l.quantity,
            ingredient_id: l.ingredient_id,
            name: l.name,
            unit: l.unit,
            price_per_unit: l.price_per_unit,
            quantity: l.quantity,
        }
    }
}
