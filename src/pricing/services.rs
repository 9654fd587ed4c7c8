//! Price aggregation. A meal costs the sum of `price_per_unit * quantity`
//! over its ingredient links; a plan costs the sum of its meals' stored prices.
//!
//! Computed figures are exact. Both are cached on their rows (`meals.price`,
//! `meal_plans.total_price`), rounded to cents only as they are written.
//! Managers call [`PricingEngine::refresh_meal`] or
//! [`PricingEngine::refresh_plan`] after every mutation that can move them; the
//! `reprice_all_*` jobs rebuild every cached value from scratch.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::meals::repo_types::{Meal, MealIngredientLine};
use crate::store::{Store, MEAL_PRICE, PLAN_TOTAL};

/// Money columns hold exactly two decimal places.
pub fn to_money(value: Decimal) -> Decimal {
    let mut money = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    money.rescale(2);
    money
}

/// Σ price_per_unit × quantity, unrounded; zero for an empty meal.
pub fn meal_price(lines: &[MealIngredientLine]) -> Decimal {
    lines
        .iter()
        .map(|l| l.price_per_unit * l.quantity)
        .sum::<Decimal>()
}

/// Σ meal.price as currently stored; ingredient costs are not revisited.
pub fn plan_price(meals: &[Meal]) -> Decimal {
    meals.iter().map(|m| m.price).sum::<Decimal>()
}

pub struct PricingEngine {
    store: Arc<dyn Store>,
}

impl PricingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn compute_meal_price(&self, meal_id: Uuid) -> ApiResult<Decimal> {
        if self.store.get_meal(meal_id).await?.is_none() {
            return Err(ApiError::NotFound("meal"));
        }
        let lines = self.store.list_meal_ingredients(meal_id).await?;
        Ok(meal_price(&lines))
    }

    pub async fn compute_plan_price(&self, plan_id: Uuid) -> ApiResult<Decimal> {
        if self.store.get_meal_plan(plan_id).await?.is_none() {
            return Err(ApiError::NotFound("meal plan"));
        }
        let meals = self.store.list_plan_meals(plan_id).await?;
        Ok(plan_price(&meals))
    }

    /// Checks that `meal_id` priced at `price` still fits its column, and that
    /// every plan containing it would too. Errors are reported on `field`.
    pub async fn check_meal_price(
        &self,
        meal_id: Uuid,
        price: Decimal,
        field: &str,
    ) -> ApiResult<()> {
        self.check_meal_prices(&[(meal_id, price)], field).await
    }

    /// [`Self::check_meal_price`] for several meals repriced at once.
    pub async fn check_meal_prices(
        &self,
        projected: &[(Uuid, Decimal)],
        field: &str,
    ) -> ApiResult<()> {
        let mut cached = Vec::with_capacity(projected.len());
        for &(meal_id, price) in projected {
            if !MEAL_PRICE.fits(price) {
                return Err(ApiError::invalid(
                    field,
                    format!("meal price would exceed {}", MEAL_PRICE.max()),
                ));
            }
            cached.push((meal_id, to_money(price)));
        }
        let mut plans = Vec::new();
        for &(meal_id, _) in projected {
            for plan_id in self.store.plans_containing_meal(meal_id).await? {
                if !plans.contains(&plan_id) {
                    plans.push(plan_id);
                }
            }
        }
        for plan_id in plans {
            let meals = self.store.list_plan_meals(plan_id).await?;
            let total: Decimal = meals
                .iter()
                .map(|m| {
                    cached
                        .iter()
                        .find(|(id, _)| *id == m.id)
                        .map_or(m.price, |(_, price)| *price)
                })
                .sum();
            self.check_plan_total(total, field)?;
        }
        Ok(())
    }

    pub fn check_plan_total(&self, total: Decimal, field: &str) -> ApiResult<()> {
        if PLAN_TOTAL.fits(total) {
            Ok(())
        } else {
            Err(ApiError::invalid(
                field,
                format!("meal plan total would exceed {}", PLAN_TOTAL.max()),
            ))
        }
    }

    /// Recompute and store the meal's price, then every plan that contains it.
    /// The stored price is rounded to cents.
    #[instrument(skip(self))]
    pub async fn refresh_meal(&self, meal_id: Uuid) -> ApiResult<Decimal> {
        let price = to_money(self.compute_meal_price(meal_id).await?);
        self.store.set_meal_price(meal_id, price).await?;
        debug!(%meal_id, %price, "meal price refreshed");
        for plan_id in self.store.plans_containing_meal(meal_id).await? {
            self.refresh_plan(plan_id).await?;
        }
        Ok(price)
    }

    pub async fn refresh_meals(&self, meal_ids: &[Uuid]) -> ApiResult<()> {
        for meal_id in meal_ids {
            self.refresh_meal(*meal_id).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn refresh_plan(&self, plan_id: Uuid) -> ApiResult<Decimal> {
        let total = to_money(self.compute_plan_price(plan_id).await?);
        self.store.set_plan_total(plan_id, total).await?;
        debug!(%plan_id, %total, "plan total refreshed");
        Ok(total)
    }

    pub async fn refresh_plans(&self, plan_ids: &[Uuid]) -> ApiResult<()> {
        for plan_id in plan_ids {
            self.refresh_plan(*plan_id).await?;
        }
        Ok(())
    }

    /// Returns how many meals were written.
    pub async fn reprice_all_meals(&self) -> ApiResult<usize> {
        let meals = self.store.list_meals().await?;
        let mut updated = 0;
        for meal in &meals {
            let lines = self.store.list_meal_ingredients(meal.id).await?;
            if self.store.set_meal_price(meal.id, to_money(meal_price(&lines))).await? {
                updated += 1;
            }
        }
        info!(updated, "meal prices recomputed");
        Ok(updated)
    }

    /// Uses stored meal prices, so run [`Self::reprice_all_meals`] first.
    pub async fn reprice_all_plans(&self) -> ApiResult<usize> {
        let plans = self.store.list_meal_plans().await?;
        let mut updated = 0;
        for plan in &plans {
            let meals = self.store.list_plan_meals(plan.id).await?;
            if self.store.set_plan_total(plan.id, to_money(plan_price(&meals))).await? {
                updated += 1;
            }
        }
        info!(updated, "meal plan totals recomputed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredients::repo_types::NewIngredient;
    use crate::meal_plans::repo_types::NewMealPlan;
    use crate::meals::repo_types::NewMeal;
    use crate::store::MemoryStore;
    use crate::users::repo_types::NewUser;
    use std::str::FromStr;
    use time::OffsetDateTime;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(price: &str, qty: &str) -> MealIngredientLine {
        MealIngredientLine {
            ingredient_id: Uuid::new_v4(),
            name: "x".into(),
            unit: "pcs".into(),
            price_per_unit: dec(price),
            quantity: dec(qty),
        }
    }

    fn meal_with_price(price: &str) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            name: "m".into(),
            description: None,
            price: dec(price),
            diet_type_id: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn meal_price_sums_cost_of_each_line() {
        let lines = [line("0.5", "2"), line("0.02", "50")];
        assert_eq!(meal_price(&lines), dec("2.0"));
        assert_eq!(meal_price(&[]), Decimal::ZERO);
    }

    #[test]
    fn sub_cent_costs_are_kept_exact() {
        assert_eq!(meal_price(&[line("0.01", "0.5")]), dec("0.005"));
        let lines = [line("0.99", "0.33"), line("1.25", "0.01")];
        assert_eq!(meal_price(&lines), dec("0.3392"));
        assert_eq!(to_money(meal_price(&lines)), dec("0.34"));
    }

    #[test]
    fn decimal_sum_has_no_float_drift() {
        let lines: Vec<_> = (0..10).map(|_| line("0.10", "1")).collect();
        assert_eq!(meal_price(&lines), dec("1.00"));
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(to_money(dec("1.005")), dec("1.01"));
        assert_eq!(to_money(dec("1.004")), dec("1.00"));
        assert_eq!(to_money(dec("2")).to_string(), "2.00");
    }

    #[test]
    fn plan_price_sums_stored_meal_prices() {
        let meals = [meal_with_price("2.00"), meal_with_price("3.75")];
        assert_eq!(plan_price(&meals), dec("5.75"));
        assert_eq!(plan_price(&[]), Decimal::ZERO);
    }

    async fn ingredient(store: &MemoryStore, name: &str, price: &str) -> Uuid {
        store
            .insert_ingredient(NewIngredient {
                name: name.into(),
                price_per_unit: dec(price),
                unit: "unit".into(),
                store_name: None,
                valid_from: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn batch_reprice_fixes_stale_caches() {
        let store = Arc::new(MemoryStore::new());
        let engine = PricingEngine::new(store.clone());

        let eggs = ingredient(&store, "Eggs", "0.5").await;
        let cheese = ingredient(&store, "Cheese", "0.02").await;
        let meal = store
            .insert_meal(NewMeal { name: "Omelette".into(), description: None, diet_type_id: None })
            .await
            .unwrap();
        store.add_meal_ingredient(meal.id, eggs, dec("2")).await.unwrap();
        store.add_meal_ingredient(meal.id, cheese, dec("50")).await.unwrap();

        let user = store
            .create_user(NewUser {
                username: "u".into(),
                email: "u@example.com".into(),
                password_hash: "h".into(),
                is_staff: false,
                weight: None,
                height: None,
                age: None,
                diet_type_id: None,
            })
            .await
            .unwrap();
        let plan = store
            .insert_meal_plan(NewMealPlan { user_id: user.id, duration: 7 })
            .await
            .unwrap();
        store.add_plan_meal(plan.id, meal.id).await.unwrap();

        // links were written behind the engine's back, so the caches are still zero
        assert_eq!(store.get_meal(meal.id).await.unwrap().unwrap().price, Decimal::ZERO);

        assert_eq!(engine.reprice_all_meals().await.unwrap(), 1);
        assert_eq!(engine.reprice_all_plans().await.unwrap(), 1);

        assert_eq!(store.get_meal(meal.id).await.unwrap().unwrap().price, dec("2.0"));
        assert_eq!(
            store.get_meal_plan(plan.id).await.unwrap().unwrap().total_price,
            dec("2.0")
        );
    }

    #[tokio::test]
    async fn refresh_meal_propagates_to_plans() {
        let store = Arc::new(MemoryStore::new());
        let engine = PricingEngine::new(store.clone());
        let flour = ingredient(&store, "Flour", "1.25").await;
        let meal = store
            .insert_meal(NewMeal { name: "Bread".into(), description: None, diet_type_id: None })
            .await
            .unwrap();
        let user = store
            .create_user(NewUser {
                username: "baker".into(),
                email: "b@example.com".into(),
                password_hash: "h".into(),
                is_staff: false,
                weight: None,
                height: None,
                age: None,
                diet_type_id: None,
            })
            .await
            .unwrap();
        let plan = store
            .insert_meal_plan(NewMealPlan { user_id: user.id, duration: 1 })
            .await
            .unwrap();
        store.add_plan_meal(plan.id, meal.id).await.unwrap();
        store.add_meal_ingredient(meal.id, flour, dec("2")).await.unwrap();

        assert_eq!(engine.refresh_meal(meal.id).await.unwrap(), dec("2.50"));
        assert_eq!(engine.compute_plan_price(plan.id).await.unwrap(), dec("2.50"));
        assert_eq!(
            store.get_meal_plan(plan.id).await.unwrap().unwrap().total_price,
            dec("2.50")
        );
    }

    #[tokio::test]
    async fn exact_price_is_computed_but_cents_are_stored() {
        let store = Arc::new(MemoryStore::new());
        let engine = PricingEngine::new(store.clone());
        let salt = ingredient(&store, "Salt", "0.01").await;
        let meal = store
            .insert_meal(NewMeal { name: "Broth".into(), description: None, diet_type_id: None })
            .await
            .unwrap();
        store.add_meal_ingredient(meal.id, salt, dec("0.5")).await.unwrap();

        assert_eq!(engine.compute_meal_price(meal.id).await.unwrap(), dec("0.005"));
        assert_eq!(engine.refresh_meal(meal.id).await.unwrap().to_string(), "0.01");
        assert_eq!(store.get_meal(meal.id).await.unwrap().unwrap().price.to_string(), "0.01");
    }

    #[tokio::test]
    async fn price_checks_cover_containing_plans() {
        let store = Arc::new(MemoryStore::new());
        let engine = PricingEngine::new(store.clone());
        let meal = store
            .insert_meal(NewMeal { name: "Feast".into(), description: None, diet_type_id: None })
            .await
            .unwrap();

        let err = engine
            .check_meal_price(meal.id, dec("99999999.99") * dec("999.99"), "quantity")
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(fields) => assert!(fields.get("quantity").is_some()),
            other => panic!("unexpected {other:?}"),
        }
        engine.check_meal_price(meal.id, dec("99999999.99"), "quantity").await.unwrap();

        assert!(engine.check_plan_total(dec("9999999999.99"), "meal_id").is_ok());
        assert!(engine.check_plan_total(dec("10000000000"), "meal_id").is_err());
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let engine = PricingEngine::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            engine.compute_meal_price(Uuid::new_v4()).await,
            Err(ApiError::NotFound("meal"))
        ));
        assert!(matches!(
            engine.compute_plan_price(Uuid::new_v4()).await,
            Err(ApiError::NotFound("meal plan"))
        ));
    }
}
