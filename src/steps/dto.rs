use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::steps::repo_types::{DailySteps, StepSource};

#[derive(Debug, Serialize)]
pub struct DailyStepsDetails {
    pub id: Uuid,
    pub date: Date,
    pub steps: i32,
    pub distance_km: Option<Decimal>,
    pub calories_burned: Option<i32>,
    pub active_minutes: Option<i32>,
    pub notes: Option<String>,
    pub source: StepSource,
    pub goal_achieved: bool,
    pub goal_percentage: f64,
    pub estimated_distance_km: f64,
    pub estimated_calories: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl DailyStepsDetails {
    pub fn new(r: DailySteps, daily_goal: Option<i32>) -> Self {
        Self {
            goal_achieved: r.goal_achieved(daily_goal),
            goal_percentage: r.goal_percentage(daily_goal),
            estimated_distance_km: r.estimated_distance_km(),
            estimated_calories: r.estimated_calories(),
            id: r.id,
            date: r.date,
            steps: r.steps,
            distance_km: r.distance_km,
            calories_burned: r.calories_burned,
            active_minutes: r.active_minutes,
            notes: r.notes,
            source: r.source,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDailyStepsRequest {
    /// Defaults to today.
    pub date: Option<Date>,
    pub steps: i32,
    pub distance_km: Option<Decimal>,
    pub calories_burned: Option<i32>,
    pub active_minutes: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub source: StepSource,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDailyStepsRequest {
    pub date: Option<Date>,
    pub steps: Option<i32>,
    pub distance_km: Option<Decimal>,
    pub calories_burned: Option<i32>,
    pub active_minutes: Option<i32>,
    pub notes: Option<String>,
    pub source: Option<StepSource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuickLogRequest {
    pub steps: Option<i32>,
    pub source: Option<StepSource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyStepsFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub source: Option<StepSource>,
    pub goal_achieved: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StepGoalRequest {
    pub daily_goal: Option<i32>,
}
