use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal, // cached sum of ingredient costs
    pub diet_type_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMeal {
    pub name: String,
    pub description: Option<String>,
    pub diet_type_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct MealChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub diet_type_id: Option<Option<Uuid>>,
}

/// Row of the meal/ingredient join table.
#[derive(Debug, Clone, FromRow)]
pub struct MealIngredient {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub created_at: OffsetDateTime,
}

/// A meal's ingredient link joined with the ingredient it points at.
#[derive(Debug, Clone, FromRow)]
pub struct MealIngredientLine {
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub price_per_unit: Decimal,
    pub quantity: Decimal,
}
