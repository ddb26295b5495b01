use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::AppError;
use crate::workouts::dto::{CreateWorkoutRequest, UpdateWorkoutRequest};
use crate::workouts::repo_types::{Workout, WorkoutStatus};

const MAX_TITLE_LEN: usize = 200;

/// Field rules shared by create and update.
pub fn validate_workout(w: &Workout, today: Date) -> Result<(), AppError> {
    let title_len = w.title.trim().chars().count();
    if title_len == 0 {
        return Err(AppError::validation("title", "This field may not be blank."));
    }
    if title_len > MAX_TITLE_LEN {
        return Err(AppError::validation(
            "title",
            format!("Ensure this field has no more than {MAX_TITLE_LEN} characters."),
        ));
    }
    if w.workout_date > today {
        return Err(AppError::validation("workout_date", "Workout date cannot be in the future."));
    }
    if w.duration.is_some_and(|d| d < 0) {
        return Err(AppError::validation("duration", "Duration cannot be negative."));
    }
    if w.distance.is_some_and(|d| d <= Decimal::ZERO) {
        return Err(AppError::validation("distance", "Distance must be greater than 0."));
    }
    if w.calories_burned.is_some_and(|c| c <= Decimal::ZERO) {
        return Err(AppError::validation(
            "calories_burned",
            "Calories burned must be greater than 0.",
        ));
    }
    Ok(())
}

/// Builds an unsaved workout from a create request. A workout logged as
/// already running or finished gets the matching timestamp.
pub fn draft_workout(
    user_id: Uuid,
    req: CreateWorkoutRequest,
    now: OffsetDateTime,
) -> Result<Workout, AppError> {
    if req.status == WorkoutStatus::Completed && req.duration.unwrap_or(0) == 0 {
        return Err(AppError::validation(
            "duration",
            "Duration is required for completed workouts.",
        ));
    }
    Ok(Workout {
        id: Uuid::nil(),
        user_id,
        workout_type: req.workout_type,
        title: req.title,
        description: req.description,
        duration: req.duration,
        calories_burned: req.calories_burned,
        distance: req.distance,
        intensity: req.intensity,
        status: req.status,
        notes: req.notes,
        workout_date: req.workout_date,
        started_at: (req.status == WorkoutStatus::InProgress).then_some(now),
        completed_at: (req.status == WorkoutStatus::Completed).then_some(now),
        created_at: now,
        updated_at: now,
    })
}

/// Applies a partial edit in place. A status change goes through the
/// transition gate before any explicit timestamps are taken.
pub fn apply_workout_edit(
    w: &mut Workout,
    u: UpdateWorkoutRequest,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    if let Some(status) = u.status {
        w.apply_status_edit(status, now)?;
    }
    if let Some(v) = u.workout_type {
        w.workout_type = v;
    }
    if let Some(v) = u.title {
        w.title = v;
    }
    if let Some(v) = u.intensity {
        w.intensity = v;
    }
    if let Some(v) = u.workout_date {
        w.workout_date = v;
    }
    w.description = u.description.or(w.description.take());
    w.duration = u.duration.or(w.duration);
    w.calories_burned = u.calories_burned.or(w.calories_burned);
    w.distance = u.distance.or(w.distance);
    w.notes = u.notes.or(w.notes.take());
    w.started_at = u.started_at.or(w.started_at);
    w.completed_at = u.completed_at.or(w.completed_at);
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub total_workouts: i64,
    pub completed_workouts: i64,
    pub total_duration: i64,
    pub total_calories: Decimal,
    pub total_distance: Decimal,
    pub workout_types: BTreeMap<&'static str, i64>,
}

pub fn workout_summary(workouts: &[Workout]) -> WorkoutSummary {
    let mut s = WorkoutSummary {
        total_workouts: workouts.len() as i64,
        completed_workouts: 0,
        total_duration: 0,
        total_calories: Decimal::ZERO,
        total_distance: Decimal::ZERO,
        workout_types: BTreeMap::new(),
    };
    for w in workouts {
        if w.status == WorkoutStatus::Completed {
            s.completed_workouts += 1;
        }
        s.total_duration += i64::from(w.duration.unwrap_or(0));
        s.total_calories += w.calories_burned.unwrap_or_default();
        s.total_distance += w.distance.unwrap_or_default();
        *s.workout_types.entry(w.workout_type.as_str()).or_insert(0) += 1;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workouts::repo_types::tests::workout;
    use crate::workouts::repo_types::{Intensity, WorkoutType};
    use time::macros::{date, datetime};

    fn create_req(status: WorkoutStatus, duration: Option<i32>) -> CreateWorkoutRequest {
        CreateWorkoutRequest {
            workout_type: WorkoutType::Cycling,
            title: "Commute".into(),
            description: None,
            duration,
            calories_burned: None,
            distance: None,
            intensity: Intensity::Low,
            status,
            notes: None,
            workout_date: date!(2026 - 10 - 15),
        }
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let s = workout_summary(&[]);
        assert_eq!(s.total_workouts, 0);
        assert_eq!(s.completed_workouts, 0);
        assert_eq!(s.total_duration, 0);
        assert_eq!(s.total_calories, Decimal::ZERO);
        assert!(s.workout_types.is_empty());
    }

    #[test]
    fn summary_counts_and_sums() {
        let mut a = workout(WorkoutStatus::Completed);
        a.duration = Some(40);
        a.calories_burned = Some(Decimal::from(300));
        a.distance = Some(Decimal::new(82, 1));
        let mut b = workout(WorkoutStatus::Planned);
        b.workout_type = WorkoutType::Yoga;
        b.duration = Some(60);
        let s = workout_summary(&[a, b]);
        assert_eq!(s.total_workouts, 2);
        assert_eq!(s.completed_workouts, 1);
        assert_eq!(s.total_duration, 100);
        assert_eq!(s.total_calories, Decimal::from(300));
        assert_eq!(s.total_distance, Decimal::new(82, 1));
        assert_eq!(s.workout_types.get("running"), Some(&1));
        assert_eq!(s.workout_types.get("yoga"), Some(&1));
    }

    #[test]
    fn completed_on_create_needs_duration() {
        let now = datetime!(2026-10-15 12:00 UTC);
        let err = draft_workout(Uuid::nil(), create_req(WorkoutStatus::Completed, None), now)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "duration", .. }));

        let w = draft_workout(Uuid::nil(), create_req(WorkoutStatus::Completed, Some(25)), now)
            .unwrap();
        assert_eq!(w.completed_at, Some(now));
        assert!(w.started_at.is_none());
    }

    #[test]
    fn in_progress_on_create_stamps_start() {
        let now = datetime!(2026-10-15 12:00 UTC);
        let w = draft_workout(Uuid::nil(), create_req(WorkoutStatus::InProgress, None), now)
            .unwrap();
        assert_eq!(w.started_at, Some(now));
    }

    #[test]
    fn validation_rejects_future_and_non_positive_values() {
        let today = date!(2026 - 10 - 15);
        let mut w = workout(WorkoutStatus::Planned);
        w.workout_date = date!(2026 - 10 - 16);
        assert!(matches!(
            validate_workout(&w, today),
            Err(AppError::Validation { field: "workout_date", .. })
        ));

        let mut w = workout(WorkoutStatus::Planned);
        w.distance = Some(Decimal::ZERO);
        assert!(matches!(
            validate_workout(&w, today),
            Err(AppError::Validation { field: "distance", .. })
        ));

        let mut w = workout(WorkoutStatus::Planned);
        w.calories_burned = Some(Decimal::from(-10));
        assert!(matches!(
            validate_workout(&w, today),
            Err(AppError::Validation { field: "calories_burned", .. })
        ));

        assert!(validate_workout(&workout(WorkoutStatus::Planned), today).is_ok());
    }

    #[test]
    fn edit_with_status_runs_gate() {
        let now = datetime!(2026-10-15 12:00 UTC);
        let mut w = workout(WorkoutStatus::Planned);
        let err = apply_workout_edit(
            &mut w,
            UpdateWorkoutRequest {
                status: Some(WorkoutStatus::Completed),
                ..Default::default()
            },
            now,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "status", .. }));

        apply_workout_edit(
            &mut w,
            UpdateWorkoutRequest {
                status: Some(WorkoutStatus::InProgress),
                notes: Some("felt good".into()),
                ..Default::default()
            },
            now,
        )
        .unwrap();
        assert_eq!(w.status, WorkoutStatus::InProgress);
        assert_eq!(w.started_at, Some(now));
        assert_eq!(w.notes.as_deref(), Some("felt good"));
    }
}
