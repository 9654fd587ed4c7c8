use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub price_per_unit: Decimal,
    pub unit: String,
    pub store_name: Option<String>,
    pub valid_from: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub price_per_unit: Decimal,
    pub unit: String,
    pub store_name: Option<String>,
    pub valid_from: Option<OffsetDateTime>,
}

/// Partial update; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct IngredientChanges {
    pub name: Option<String>,
    pub price_per_unit: Option<Decimal>,
    pub unit: Option<String>,
    pub store_name: Option<Option<String>>,
    pub valid_from: Option<Option<OffsetDateTime>>,
}
