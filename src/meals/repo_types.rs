use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::common::{percent, round_to, text_enum, to_f64};

/// kcal per gram of protein and of carbohydrate.
pub const KCAL_PER_G_PROTEIN_CARBS: f64 = 4.0;
/// kcal per gram of fat.
pub const KCAL_PER_G_FAT: f64 = 9.0;

text_enum! {
    pub enum MealType {
        Breakfast => ("breakfast", "Breakfast"),
        Lunch => ("lunch", "Lunch"),
        Dinner => ("dinner", "Dinner"),
        Snack => ("snack", "Snack"),
        Other => ("other", "Other"),
    }
}

impl Default for MealType {
    fn default() -> Self {
        MealType::Other
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
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
    pub meal_date: Date,
    pub meal_time: Option<Time>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Share of calories from each macronutrient, in percent with one decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroSplit {
    /// Calorie-weighted split of `protein_g`/`carbs_g`/`fats_g` against `total_kcal`.
    pub fn from_grams(total_kcal: f64, protein_g: f64, carbs_g: f64, fats_g: f64) -> Self {
        if total_kcal == 0.0 {
            return Self::default();
        }
        let share = |kcal: f64| round_to(percent(kcal, total_kcal), 1);
        Self {
            protein: share(protein_g * KCAL_PER_G_PROTEIN_CARBS),
            carbs: share(carbs_g * KCAL_PER_G_PROTEIN_CARBS),
            fats: share(fats_g * KCAL_PER_G_FAT),
        }
    }
}

impl Meal {
    fn scaled(&self, per_serving: Option<Decimal>) -> Decimal {
        per_serving.unwrap_or(Decimal::ZERO) * self.servings
    }

    pub fn total_calories(&self) -> Decimal {
        self.calories * self.servings
    }

    pub fn total_protein(&self) -> Decimal {
        self.scaled(self.protein)
    }

    pub fn total_carbohydrates(&self) -> Decimal {
        self.scaled(self.carbohydrates)
    }

    pub fn total_fats(&self) -> Decimal {
        self.scaled(self.fats)
    }

    pub fn total_fiber(&self) -> Decimal {
        self.scaled(self.fiber)
    }

    pub fn total_sugar(&self) -> Decimal {
        self.scaled(self.sugar)
    }

    pub fn total_sodium(&self) -> Decimal {
        self.scaled(self.sodium)
    }

    pub fn macros_percentage(&self) -> MacroSplit {
        MacroSplit::from_grams(
            to_f64(self.total_calories()),
            to_f64(self.total_protein()),
            to_f64(self.total_carbohydrates()),
            to_f64(self.total_fats()),
        )
    }
}

/// Writable meal fields, shared by create and update.
#[derive(Debug, Clone)]
pub struct MealFields {
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
    pub meal_date: Date,
    pub meal_time: Option<Time>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

impl From<&Meal> for MealFields {
    fn from(m: &Meal) -> Self {
        Self {
            meal_type: m.meal_type,
            name: m.name.clone(),
            description: m.description.clone(),
            calories: m.calories,
            protein: m.protein,
            carbohydrates: m.carbohydrates,
            fats: m.fats,
            fiber: m.fiber,
            sugar: m.sugar,
            sodium: m.sodium,
            serving_size: m.serving_size.clone(),
            servings: m.servings,
            meal_date: m.meal_date,
            meal_time: m.meal_time,
            notes: m.notes.clone(),
            photo_url: m.photo_url.clone(),
        }
    }
}

/// Catalog entry; nutrition is per `serving_size`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodItem {
    pub id: Uuid,
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
    pub is_custom: bool,
    pub created_by: Option<Uuid>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct FoodItemFields {
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
    pub is_active: bool,
}

impl From<&FoodItem> for FoodItemFields {
    fn from(f: &FoodItem) -> Self {
        Self {
            name: f.name.clone(),
            description: f.description.clone(),
            category: f.category.clone(),
            calories: f.calories,
            protein: f.protein,
            carbohydrates: f.carbohydrates,
            fats: f.fats,
            fiber: f.fiber,
            sugar: f.sugar,
            sodium: f.sodium,
            serving_size: f.serving_size.clone(),
            serving_unit: f.serving_unit.clone(),
            is_active: f.is_active,
        }
    }
}
