use rust_decimal::Decimal;
use serde::Serialize;

/// Body of the `calculate_price` endpoints.
#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub price: Decimal,
}
