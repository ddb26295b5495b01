use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::meals::repo_types::{FoodItem, MacroSplit, Meal, MealType};

// "12:30:00" rather than the default "12:30:00.0"
time::serde::format_description!(clock_time, Time, "[hour]:[minute]:[second]");

#[derive(Debug, Serialize)]
pub struct MealDetails {
    pub id: Uuid,
    pub meal_type: MealType,
    pub name: String,
    pub description: Option<String>,
    pub calories: Decimal,
    pub protein: Option<Decimal>,
    pub carbohydrates: Option<Decimal>,
    pub fats: Option<Decimal>,
    pub fiber: Option<Decimal>,
    pub sugar: Option<Decimal>,
    pub sodium: Option<Decimal>,
    pub serving_size: Option<String>,
    pub servings: Decimal,
    pub total_calories: Decimal,
    pub total_protein: Decimal,
    pub total_carbohydrates: Decimal,
    pub total_fats: Decimal,
    pub macros_percentage: MacroSplit,
    pub meal_date: Date,
    #[serde(with = "clock_time::option")]
    pub meal_time: Option<Time>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Meal> for MealDetails {
    fn from(m: Meal) -> Self {
        Self {
            total_calories: m.total_calories(),
            total_protein: m.total_protein(),
            total_carbohydrates: m.total_carbohydrates(),
            total_fats: m.total_fats(),
            macros_percentage: m.macros_percentage(),
            id: m.id,
            meal_type: m.meal_type,
            name: m.name,
            description: m.description,
            calories: m.calories,
            protein: m.protein,
            carbohydrates: m.carbohydrates,
            fats: m.fats,
            fiber: m.fiber,
            sugar: m.sugar,
            sodium: m.sodium,
            serving_size: m.serving_size,
            servings: m.servings,
            meal_date: m.meal_date,
            meal_time: m.meal_time,
            notes: m.notes,
            photo_url: m.photo_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    #[serde(default)]
    pub meal_type: MealType,
    pub name: String,
    pub description: Option<String>,
    pub calories: Decimal,
    pub protein: Option<Decimal>,
    pub carbohydrates: Option<Decimal>,
    pub fats: Option<Decimal>,
    pub fiber: Option<Decimal>,
    pub sugar: Option<Decimal>,
    pub sodium: Option<Decimal>,
    pub serving_size: Option<String>,
    #[serde(default = "one")]
    pub servings: Decimal,
    pub meal_date: Date,
    #[serde(default, with = "clock_time::option")]
    pub meal_time: Option<Time>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}
fn one() -> Decimal {
    Decimal::ONE
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub meal_type: Option<MealType>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub calories: Option<Decimal>,
    pub protein: Option<Decimal>,
    pub carbohydrates: Option<Decimal>,
    pub fats: Option<Decimal>,
    pub fiber: Option<Decimal>,
    pub sugar: Option<Decimal>,
    pub sodium: Option<Decimal>,
    pub serving_size: Option<String>,
    pub servings: Option<Decimal>,
    pub meal_date: Option<Date>,
    #[serde(default, with = "clock_time::option")]
    pub meal_time: Option<Time>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MealFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub meal_type: Option<MealType>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ByDateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct FoodItemListItem {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub calories: Decimal,
    pub protein: Option<Decimal>,
    pub carbohydrates: Option<Decimal>,
    pub fats: Option<Decimal>,
    pub serving_size: String,
}

impl From<FoodItem> for FoodItemListItem {
    fn from(f: FoodItem) -> Self {
        Self {
            id: f.id,
            name: f.name,
            category: f.category,
            calories: f.calories,
            protein: f.protein,
            carbohydrates: f.carbohydrates,
            fats: f.fats,
            serving_size: f.serving_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFoodItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub calories: Decimal,
    pub protein: Option<Decimal>,
    pub carbohydrates: Option<Decimal>,
    pub fats: Option<Decimal>,
    pub fiber: Option<Decimal>,
    pub sugar: Option<Decimal>,
    pub sodium: Option<Decimal>,
    pub serving_size: String,
    pub serving_unit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFoodItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub calories: Option<Decimal>,
    pub protein: Option<Decimal>,
    pub carbohydrates: Option<Decimal>,
    pub fats: Option<Decimal>,
    pub fiber: Option<Decimal>,
    pub sugar: Option<Decimal>,
    pub sodium: Option<Decimal>,
    pub serving_size: Option<String>,
    pub serving_unit: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodItemFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}
