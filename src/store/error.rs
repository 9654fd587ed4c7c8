use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// A foreign key pointed at a row that does not exist.
    #[error("referenced row does not exist ({0})")]
    MissingReference(String),

    /// A value does not fit its NUMERIC column; carries the column name.
    #[error("value is out of range for {0}")]
    OutOfRange(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Conflict keyed by the constraint name used in the schema.
    pub fn conflict(constraint: &str) -> Self {
        Self::Conflict(conflict_message(constraint).to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            if db.is_unique_violation() {
                return Self::conflict(&constraint);
            }
            if db.is_foreign_key_violation() {
                return Self::MissingReference(reference_field(&constraint).to_string());
            }
            if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
                return Self::OutOfRange("price".into());
            }
        }
        Self::Database(err)
    }
}

const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

const REFERENCE_COLUMNS: [&str; 6] = [
    "diet_type_id",
    "ingredient_id",
    "identity_id",
    "meal_id",
    "plan_id",
    "user_id",
];

/// Postgres names foreign keys `<table>_<column>_fkey`; recover the column.
fn reference_field(constraint: &str) -> &str {
    REFERENCE_COLUMNS
        .into_iter()
        .find(|col| {
            constraint
                .strip_suffix("_fkey")
                .is_some_and(|rest| rest.ends_with(&format!("_{col}")))
        })
        .unwrap_or(constraint)
}

fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "unique_favorite" => "meal is already a favorite of this user",
        "unique_meal_ingredient" => "ingredient is already part of this meal",
        "unique_meal_plan" => "meal is already part of this plan",
        "auth_identities_username_key" => "username is already taken",
        _ => "duplicate record",
    }
}
