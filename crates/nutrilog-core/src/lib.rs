//! Shared domain types and configuration for the nutrilog workspace.

pub mod app_config;
pub mod config;
pub mod dates;
pub mod types;
pub mod vocabulary;

pub use app_config::AppConfig;
pub use config::{build_app_config, load_app_config, ConfigError};
pub use dates::effective_date;
pub use types::{DayResult, MealNutrients, MealSlot, NutrientRecord, ScrapedItem};
pub use vocabulary::{LabelSpec, MICROGRAM_CANONICAL, NUTRIENT_VOCABULARY, VALUE_UNITS};
