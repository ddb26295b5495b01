use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::workouts::repo_types::{Intensity, Workout, WorkoutStatus, WorkoutType};

#[derive(Debug, Serialize)]
pub struct WorkoutDetails {
    pub id: Uuid,
    pub workout_type: WorkoutType,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub duration_display: String,
    pub calories_burned: Option<Decimal>,
    pub distance: Option<Decimal>,
    pub intensity: Intensity,
    pub status: WorkoutStatus,
    pub notes: Option<String>,
    pub workout_date: Date,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Workout> for WorkoutDetails {
    fn from(w: Workout) -> Self {
        Self {
            duration_display: w.duration_display(),
            id: w.id,
            workout_type: w.workout_type,
            title: w.title,
            description: w.description,
            duration: w.duration,
            calories_burned: w.calories_burned,
            distance: w.distance,
            intensity: w.intensity,
            status: w.status,
            notes: w.notes,
            workout_date: w.workout_date,
            started_at: w.started_at,
            completed_at: w.completed_at,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    #[serde(default)]
    pub workout_type: WorkoutType,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub calories_burned: Option<Decimal>,
    pub distance: Option<Decimal>,
    #[serde(default)]
    pub intensity: Intensity,
    #[serde(default)]
    pub status: WorkoutStatus,
    pub notes: Option<String>,
    pub workout_date: Date,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub workout_type: Option<WorkoutType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub calories_burned: Option<Decimal>,
    pub distance: Option<Decimal>,
    pub intensity: Option<Intensity>,
    pub status: Option<WorkoutStatus>,
    pub notes: Option<String>,
    pub workout_date: Option<Date>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub workout_type: Option<WorkoutType>,
    pub status: Option<WorkoutStatus>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workouts::repo_types::tests::workout;
    use time::macros::datetime;

    #[test]
    fn served_timestamps_are_accepted_back_as_edits() {
        let mut w = workout(WorkoutStatus::Completed);
        w.started_at = Some(datetime!(2026-10-15 08:00 UTC));
        w.completed_at = Some(datetime!(2026-10-15 08:45:30 UTC));

        let served = serde_json::to_value(WorkoutDetails::from(w)).unwrap();
        assert_eq!(served["started_at"], "2026-10-15T08:00:00Z");

        let edit = serde_json::json!({
            "workout_date": served["workout_date"],
            "started_at": served["started_at"],
            "completed_at": served["completed_at"],
        });
        let req: UpdateWorkoutRequest = serde_json::from_value(edit).unwrap();
        assert_eq!(req.started_at, Some(datetime!(2026-10-15 08:00 UTC)));
        assert_eq!(req.completed_at, Some(datetime!(2026-10-15 08:45:30 UTC)));
    }

    #[test]
    fn unset_timestamps_serialize_as_null() {
        let served = serde_json::to_value(WorkoutDetails::from(workout(WorkoutStatus::Planned)))
            .unwrap();
        assert!(served["completed_at"].is_null());
        assert!(served["created_at"].as_str().unwrap().contains('T'));
    }
}
