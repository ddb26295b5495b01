use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::goals::repo_types::{Goal, GoalType};

#[derive(Debug, Serialize)]
pub struct GoalDetails {
    pub id: Uuid,
    pub goal_type: GoalType,
    pub title: String,
    pub target_value: Decimal,
    pub current_value: Decimal,
    pub progress_percentage: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub time_remaining: i64,
    pub is_active: bool,
    pub is_completed: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
    pub unit: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl GoalDetails {
    pub fn new(g: Goal, today: Date) -> Self {
        Self {
            progress_percentage: g.progress_percentage(),
            time_remaining: g.time_remaining(today),
            is_active: g.is_active(today),
            unit: g.goal_type.unit(),
            id: g.id,
            goal_type: g.goal_type,
            title: g.title,
            target_value: g.target_value,
            current_value: g.current_value,
            start_date: g.start_date,
            end_date: g.end_date,
            is_completed: g.is_completed,
            completed_at: g.completed_at,
            notes: g.notes,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    #[serde(default)]
    pub goal_type: GoalType,
    #[serde(default)]
    pub title: String,
    pub target_value: Decimal,
    #[serde(default)]
    pub current_value: Decimal,
    pub start_date: Date,
    pub end_date: Date,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateGoalRequest {
    pub goal_type: Option<GoalType>,
    pub title: Option<String>,
    pub target_value: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProgressRequest {
    pub current_value: Option<Decimal>,
    pub increment_by: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalFilter {
    pub is_completed: Option<bool>,
    pub goal_type: Option<GoalType>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TypeBreakdown {
    pub count: i64,
    pub completed: i64,
    pub in_progress: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalSummary {
    pub total_goals: i64,
    pub completed_goals: i64,
    pub in_progress_goals: i64,
    pub completion_rate: f64,
    pub goals_by_type: BTreeMap<&'static str, TypeBreakdown>,
}
