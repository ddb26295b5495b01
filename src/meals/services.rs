use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::common::to_f64;
use crate::error::AppError;
use crate::meals::dto::{
    CreateFoodItemRequest, CreateMealRequest, UpdateFoodItemRequest, UpdateMealRequest,
};
use crate::meals::repo_types::{FoodItemFields, MacroSplit, Meal, MealFields};

const MAX_NAME_LEN: usize = 200;

fn check_name(field: &'static str, name: &str) -> Result<(), AppError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(AppError::validation(field, "This field may not be blank."));
    }
    if len > MAX_NAME_LEN {
        return Err(AppError::validation(
            field,
            format!("Ensure this field has no more than {MAX_NAME_LEN} characters."),
        ));
    }
    Ok(())
}

fn check_nutrients(
    calories: Decimal,
    optional: [(&'static str, Option<Decimal>); 6],
) -> Result<(), AppError> {
    if calories < Decimal::ZERO {
        return Err(AppError::validation("calories", "Calories must be positive."));
    }
    for (field, value) in optional {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(AppError::validation(field, "Ensure this value is greater than or equal to 0."));
        }
    }
    Ok(())
}

/// Write-time invariants for a meal: non-negative nutrition, positive
/// servings, and no future dates.
pub fn validate_meal(fields: &MealFields, today: Date) -> Result<(), AppError> {
    check_name("name", &fields.name)?;
    check_nutrients(
        fields.calories,
        [
            ("protein", fields.protein),
            ("carbohydrates", fields.carbohydrates),
            ("fats", fields.fats),
            ("fiber", fields.fiber),
            ("sugar", fields.sugar),
            ("sodium", fields.sodium),
        ],
    )?;
    if fields.servings <= Decimal::ZERO {
        return Err(AppError::validation("servings", "Servings must be greater than 0."));
    }
    if fields.meal_date > today {
        return Err(AppError::validation("meal_date", "Meal date cannot be in the future."));
    }
    Ok(())
}

impl From<CreateMealRequest> for MealFields {
    fn from(r: CreateMealRequest) -> Self {
        Self {
            meal_type: r.meal_type,
            name: r.name,
            description: r.description,
            calories: r.calories,
            protein: r.protein,
            carbohydrates: r.carbohydrates,
            fats: r.fats,
            fiber: r.fiber,
            sugar: r.sugar,
            sodium: r.sodium,
            serving_size: r.serving_size,
            servings: r.servings,
            meal_date: r.meal_date,
            meal_time: r.meal_time,
            notes: r.notes,
            photo_url: r.photo_url,
        }
    }
}

impl MealFields {
    pub fn merge(mut self, u: UpdateMealRequest) -> Self {
        if let Some(v) = u.meal_type {
            self.meal_type = v;
        }
        if let Some(v) = u.name {
            self.name = v;
        }
        if let Some(v) = u.calories {
            self.calories = v;
        }
        if let Some(v) = u.servings {
            self.servings = v;
        }
        if let Some(v) = u.meal_date {
            self.meal_date = v;
        }
        self.description = u.description.or(self.description);
        self.protein = u.protein.or(self.protein);
        self.carbohydrates = u.carbohydrates.or(self.carbohydrates);
        self.fats = u.fats.or(self.fats);
        self.fiber = u.fiber.or(self.fiber);
        self.sugar = u.sugar.or(self.sugar);
        self.sodium = u.sodium.or(self.sodium);
        self.serving_size = u.serving_size.or(self.serving_size);
        self.meal_time = u.meal_time.or(self.meal_time);
        self.notes = u.notes.or(self.notes);
        self.photo_url = u.photo_url.or(self.photo_url);
        self
    }
}

pub fn validate_food_item(fields: &FoodItemFields) -> Result<(), AppError> {
    check_name("name", &fields.name)?;
    check_name("serving_size", &fields.serving_size)?;
    check_nutrients(
        fields.calories,
        [
            ("protein", fields.protein),
            ("carbohydrates", fields.carbohydrates),
            ("fats", fields.fats),
            ("fiber", fields.fiber),
            ("sugar", fields.sugar),
            ("sodium", fields.sodium),
        ],
    )
}

impl From<CreateFoodItemRequest> for FoodItemFields {
    fn from(r: CreateFoodItemRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            category: r.category,
            calories: r.calories,
            protein: r.protein,
            carbohydrates: r.carbohydrates,
            fats: r.fats,
            fiber: r.fiber,
            sugar: r.sugar,
            sodium: r.sodium,
            serving_size: r.serving_size,
            serving_unit: r.serving_unit,
            is_active: true,
        }
    }
}

impl FoodItemFields {
    pub fn merge(mut self, u: UpdateFoodItemRequest) -> Self {
        if let Some(v) = u.name {
            self.name = v;
        }
        if let Some(v) = u.calories {
            self.calories = v;
        }
        if let Some(v) = u.serving_size {
            self.serving_size = v;
        }
        if let Some(v) = u.is_active {
            self.is_active = v;
        }
        self.description = u.description.or(self.description);
        self.category = u.category.or(self.category);
        self.protein = u.protein.or(self.protein);
        self.carbohydrates = u.carbohydrates.or(self.carbohydrates);
        self.fats = u.fats.or(self.fats);
        self.fiber = u.fiber.or(self.fiber);
        self.sugar = u.sugar.or(self.sugar);
        self.sodium = u.sodium.or(self.sodium);
        self.serving_unit = u.serving_unit.or(self.serving_unit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub total_meals: i64,
    pub total_calories: Decimal,
    pub total_protein: Decimal,
    pub total_carbohydrates: Decimal,
    pub total_fats: Decimal,
    pub total_fiber: Decimal,
    pub total_sugar: Decimal,
    pub total_sodium: Decimal,
    pub avg_calories_per_meal: Decimal,
    pub meal_types_breakdown: BTreeMap<&'static str, i64>,
    pub macros_percentage: MacroSplit,
}

/// Servings-weighted totals over an already filtered set of meals.
pub fn nutrition_summary(meals: &[Meal]) -> NutritionSummary {
    let mut s = NutritionSummary {
        total_meals: meals.len() as i64,
        total_calories: Decimal::ZERO,
        total_protein: Decimal::ZERO,
        total_carbohydrates: Decimal::ZERO,
        total_fats: Decimal::ZERO,
        total_fiber: Decimal::ZERO,
        total_sugar: Decimal::ZERO,
        total_sodium: Decimal::ZERO,
        avg_calories_per_meal: Decimal::ZERO,
        meal_types_breakdown: BTreeMap::new(),
        macros_percentage: MacroSplit::default(),
    };

    for m in meals {
        s.total_calories += m.total_calories();
        s.total_protein += m.total_protein();
        s.total_carbohydrates += m.total_carbohydrates();
        s.total_fats += m.total_fats();
        s.total_fiber += m.total_fiber();
        s.total_sugar += m.total_sugar();
        s.total_sodium += m.total_sodium();
        *s.meal_types_breakdown.entry(m.meal_type.as_str()).or_insert(0) += 1;
    }

    if s.total_meals > 0 {
        s.avg_calories_per_meal = (s.total_calories / Decimal::from(s.total_meals)).round_dp(2);
    }
    s.macros_percentage = MacroSplit::from_grams(
        to_f64(s.total_calories),
        to_f64(s.total_protein),
        to_f64(s.total_carbohydrates),
        to_f64(s.total_fats),
    );
    s
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyNutrition {
    pub meal_date: Date,
    pub total_meals: i64,
    pub total_calories: Decimal,
    pub total_protein: Decimal,
    pub total_carbohydrates: Decimal,
    pub total_fats: Decimal,
}

/// Per-day totals, ascending by date.
pub fn daily_nutrition(meals: &[Meal]) -> Vec<DailyNutrition> {
    let mut by_day: BTreeMap<Date, DailyNutrition> = BTreeMap::new();
    for m in meals {
        let day = by_day.entry(m.meal_date).or_insert_with(|| DailyNutrition {
            meal_date: m.meal_date,
            total_meals: 0,
            total_calories: Decimal::ZERO,
            total_protein: Decimal::ZERO,
            total_carbohydrates: Decimal::ZERO,
            total_fats: Decimal::ZERO,
        });
        day.total_meals += 1;
        day.total_calories += m.total_calories();
        day.total_protein += m.total_protein();
        day.total_carbohydrates += m.total_carbohydrates();
        day.total_fats += m.total_fats();
    }
    by_day.into_values().collect()
}
