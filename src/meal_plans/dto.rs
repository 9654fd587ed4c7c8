use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{MealPlan, MealPlanChanges, PlanMeal};
use crate::error::{ApiResult, FieldErrors, Validate};

/// `user_id` defaults to the caller; only staff may name someone else.
#[derive(Debug, Deserialize)]
pub struct CreateMealPlanRequest {
    pub user_id: Option<Uuid>,
    pub duration: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealPlanRequest {
    pub duration: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AddPlanMealRequest {
    pub meal_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub duration: i32,
    pub total_price: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct PlanMealResponse {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub meal_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn check_duration(errors: &mut FieldErrors, duration: i32) {
    if duration <= 0 {
        errors.add("duration", "Ensure this value is greater than 0.");
    }
}

impl Validate for CreateMealPlanRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        check_duration(&mut errors, self.duration);
        errors.into_result()
    }
}

impl Validate for UpdateMealPlanRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = FieldErrors::new();
        if let Some(duration) = self.duration {
            check_duration(&mut errors, duration);
        }
        errors.into_result()
    }
}

impl Validate for AddPlanMealRequest {
    fn validate(&self) -> ApiResult<()> {
        Ok(())
    }
}

impl From<UpdateMealPlanRequest> for MealPlanChanges {
    fn from(r: UpdateMealPlanRequest) -> Self {
        Self { duration: r.duration }
    }
}

impl From<MealPlan> for MealPlanResponse {
    fn from(p: MealPlan) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            duration: p.duration,
            total_price: p.total_price,
            created_at: p.created_at,
        }
    }
}

impl From<PlanMeal> for PlanMealResponse {
    fn from(l: PlanMeal) -> Self {
        Self {
            id: l.id,
            plan_id: l.plan_id,
            meal_id: l.meal_id,
            created_at: l.created_at,
        }
    }
}
