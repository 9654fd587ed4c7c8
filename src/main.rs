//! Meal planner backend.
//!
//! ```bash
//! # run the API (applies migrations first)
//! mealplanner serve
//!
//! # recompute every cached meal price and plan total
//! mealplanner reprice
//!
//! # create a staff account
//! mealplanner create-staff --username admin --email admin@example.com --password s3cretpass
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

mod app;
mod auth;
mod config;
mod diet_types;
mod error;
mod favorites;
mod ingredients;
mod meal_plans;
mod meals;
mod pricing;
mod state;
mod store;
mod users;

#[cfg(test)]
mod test_support;

use crate::error::{ApiError, Validate};
use crate::state::AppState;
use crate::store::Store;
use crate::users::dto::CreateUserRequest;

#[derive(Parser)]
#[command(name = "mealplanner", about = "Meal planning API and admin tasks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and run the HTTP server (default)
    Serve,
    /// Apply migrations only
    Migrate,
    /// Recompute every meal price, then every plan total
    Reprice,
    /// Delete every row, dependents first
    ClearDb,
    /// Create a staff user
    CreateStaff {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "STAFF_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "mealplanner=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

/// Field errors read better on a terminal than "validation failed".
fn cli_error(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Validation(fields) => anyhow::anyhow!(
            "invalid input: {}",
            serde_json::to_string(&fields).unwrap_or_default()
        ),
        other => other.into(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let state = AppState::init().await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            state.store.migrate().await.context("apply migrations")?;
            let config = state.config.clone();
            let app = app::build_app(state);
            app::serve(app, &config).await?;
        }
        Command::Migrate => {
            state.store.migrate().await.context("apply migrations")?;
        }
        Command::Reprice => {
            let pricing = state.pricing();
            let meals = pricing.reprice_all_meals().await.map_err(cli_error)?;
            let plans = pricing.reprice_all_plans().await.map_err(cli_error)?;
            info!(meals, plans, "repricing finished");
        }
        Command::ClearDb => {
            let report = state.store.clear_all().await.context("clear database")?;
            for (table, rows) in report {
                info!(table, rows, "table cleared");
            }
        }
        Command::CreateStaff {
            username,
            email,
            password,
        } => {
            let req = CreateUserRequest {
                username,
                email,
                password,
                weight: None,
                height: None,
                age: None,
                diet_type_id: None,
            };
            req.validate().map_err(cli_error)?;
            let user = state.users().create(req, true).await.map_err(cli_error)?;
            info!(user_id = %user.id, username = %user.username, "staff user created");
        }
    }
    Ok(())
}
