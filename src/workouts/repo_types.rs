use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::common::text_enum;
use crate::error::AppError;

text_enum! {
    pub enum WorkoutType {
        Running => ("running", "Running"),
        Cycling => ("cycling", "Cycling"),
        Swimming => ("swimming", "Swimming"),
        Walking => ("walking", "Walking"),
        Gym => ("gym", "Gym Workout"),
        Yoga => ("yoga", "Yoga"),
        Pilates => ("pilates", "Pilates"),
        Hiit => ("hiit", "HIIT"),
        Cardio => ("cardio", "Cardio"),
        Strength => ("strength", "Strength Training"),
        Sports => ("sports", "Sports"),
        Other => ("other", "Other"),
    }
}

text_enum! {
    pub enum Intensity {
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
    }
}

text_enum! {
    pub enum WorkoutStatus {
        Planned => ("planned", "Planned"),
        InProgress => ("in_progress", "In Progress"),
        Completed => ("completed", "Completed"),
        Skipped => ("skipped", "Skipped"),
    }
}

impl Default for WorkoutType {
    fn default() -> Self {
        WorkoutType::Other
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Medium
    }
}

impl Default for WorkoutStatus {
    fn default() -> Self {
        WorkoutStatus::Planned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub workout_type: WorkoutType,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub calories_burned: Option<Decimal>,
    pub distance: Option<Decimal>,
    #[sqlx(try_from = "String")]
    pub intensity: Intensity,
    #[sqlx(try_from = "String")]
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

/// Where a status change comes from. The named actions and a plain field
/// edit share one gate but differ on re-completing a completed workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSource {
    Action,
    Edit,
}

/// Values a caller may hand to `complete`; zero or absent keeps the stored one.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CompletionOverrides {
    pub duration: Option<i32>,
    pub calories_burned: Option<Decimal>,
    pub distance: Option<Decimal>,
}

impl Workout {
    /// `"1h 5m"`, `"45m"`, or `"N/A"` when no duration is recorded.
    pub fn duration_display(&self) -> String {
        match self.duration {
            Some(mins) if mins > 0 => {
                let (hours, minutes) = (mins / 60, mins % 60);
                if hours > 0 {
                    format!("{hours}h {minutes}m")
                } else {
                    format!("{minutes}m")
                }
            }
            _ => "N/A".to_string(),
        }
    }

    /// The single status gate. `completed` is terminal, and reaching it
    /// requires a workout that has been started.
    pub fn check_transition(
        &self,
        to: WorkoutStatus,
        source: TransitionSource,
    ) -> Result<(), AppError> {
        use WorkoutStatus::*;

        let reject = |msg: &str| -> Result<(), AppError> {
            Err(AppError::validation("status", msg))
        };
        match (self.status, to) {
            (Completed, Completed) if source == TransitionSource::Action => {
                reject("Workout is already completed")
            }
            (Completed, Completed) => Ok(()),
            (Completed, InProgress) => reject("Cannot start a completed workout"),
            (Completed, Skipped) => reject("Cannot skip a completed workout"),
            (Completed, Planned) => reject("Cannot reopen a completed workout"),
            (Planned, Completed) => reject(
                "Cannot mark a planned workout as completed. Please start the workout first.",
            ),
            (_, Completed) if self.started_at.is_none() => {
                reject("Cannot complete a workout that has not been started.")
            }
            _ => Ok(()),
        }
    }

    pub fn start(&mut self, now: OffsetDateTime) -> Result<(), AppError> {
        self.check_transition(WorkoutStatus::InProgress, TransitionSource::Action)?;
        self.status = WorkoutStatus::InProgress;
        self.started_at = Some(now);
        Ok(())
    }

    pub fn complete(
        &mut self,
        now: OffsetDateTime,
        overrides: CompletionOverrides,
    ) -> Result<(), AppError> {
        self.check_transition(WorkoutStatus::Completed, TransitionSource::Action)?;
        self.status = WorkoutStatus::Completed;
        self.completed_at = Some(now);
        if let Some(d) = overrides.duration.filter(|d| *d != 0) {
            self.duration = Some(d);
        }
        if let Some(c) = overrides.calories_burned.filter(|c| !c.is_zero()) {
            self.calories_burned = Some(c);
        }
        if let Some(d) = overrides.distance.filter(|d| !d.is_zero()) {
            self.distance = Some(d);
        }
        Ok(())
    }

    pub fn skip(&mut self) -> Result<(), AppError> {
        self.check_transition(WorkoutStatus::Skipped, TransitionSource::Action)?;
        self.status = WorkoutStatus::Skipped;
        Ok(())
    }

    /// Status change through a field edit; timestamps are stamped only if unset.
    pub fn apply_status_edit(
        &mut self,
        to: WorkoutStatus,
        now: OffsetDateTime,
    ) -> Result<(), AppError> {
        self.check_transition(to, TransitionSource::Edit)?;
        self.status = to;
        match to {
            WorkoutStatus::InProgress if self.started_at.is_none() => self.started_at = Some(now),
            WorkoutStatus::Completed if self.completed_at.is_none() => {
                self.completed_at = Some(now)
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::macros::{date, datetime};

    pub(crate) fn workout(status: WorkoutStatus) -> Workout {
        let now = datetime!(2026-10-15 08:00 UTC);
        Workout {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            workout_type: WorkoutType::Running,
            title: "Morning run".into(),
            description: None,
            duration: None,
            calories_burned: None,
            distance: None,
            intensity: Intensity::Medium,
            status,
            notes: None,
            workout_date: date!(2026 - 10 - 15),
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn status_error(res: Result<(), AppError>) -> String {
        match res {
            Err(AppError::Validation { field, message }) => {
                assert_eq!(field, "status");
                message
            }
            other => panic!("expected status validation error, got {other:?}"),
        }
    }

    #[test]
    fn duration_display_formats() {
        let mut w = workout(WorkoutStatus::Planned);
        assert_eq!(w.duration_display(), "N/A");
        w.duration = Some(45);
        assert_eq!(w.duration_display(), "45m");
        w.duration = Some(65);
        assert_eq!(w.duration_display(), "1h 5m");
        w.duration = Some(120);
        assert_eq!(w.duration_display(), "2h 0m");
    }

    #[test]
    fn complete_rejects_planned_unstarted() {
        let mut w = workout(WorkoutStatus::Planned);
        let msg = status_error(w.complete(datetime!(2026-10-15 09:00 UTC), Default::default()));
        assert!(msg.contains("planned"));
        assert_eq!(w.status, WorkoutStatus::Planned);
        assert!(w.completed_at.is_none());
    }

    #[test]
    fn complete_rejects_already_completed() {
        let mut w = workout(WorkoutStatus::Completed);
        w.started_at = Some(datetime!(2026-10-15 07:00 UTC));
        let msg = status_error(w.complete(datetime!(2026-10-15 09:00 UTC), Default::default()));
        assert_eq!(msg, "Workout is already completed");
    }

    #[test]
    fn complete_rejects_skipped_without_start() {
        let mut w = workout(WorkoutStatus::Skipped);
        status_error(w.complete(datetime!(2026-10-15 09:00 UTC), Default::default()));
    }

    #[test]
    fn start_then_complete_applies_overrides() {
        let mut w = workout(WorkoutStatus::Planned);
        w.duration = Some(30);
        let started = datetime!(2026-10-15 08:30 UTC);
        w.start(started).unwrap();
        assert_eq!(w.status, WorkoutStatus::InProgress);
        assert_eq!(w.started_at, Some(started));

        let done = datetime!(2026-10-15 09:15 UTC);
        w.complete(
            done,
            CompletionOverrides {
                duration: Some(0),
                calories_burned: Some(Decimal::from(410)),
                distance: Some(Decimal::new(755, 2)),
            },
        )
        .unwrap();
        assert_eq!(w.status, WorkoutStatus::Completed);
        assert_eq!(w.completed_at, Some(done));
        // zero duration does not clobber the stored one
        assert_eq!(w.duration, Some(30));
        assert_eq!(w.calories_burned, Some(Decimal::from(410)));
        assert_eq!(w.distance, Some(Decimal::new(755, 2)));
    }

    #[test]
    fn completed_is_terminal_for_actions() {
        let mut w = workout(WorkoutStatus::Completed);
        assert!(status_error(w.start(datetime!(2026-10-15 09:00 UTC))).contains("start"));
        assert!(status_error(w.skip()).contains("skip"));
    }

    #[test]
    fn skipped_workout_can_be_restarted() {
        let mut w = workout(WorkoutStatus::Skipped);
        w.start(datetime!(2026-10-15 09:00 UTC)).unwrap();
        assert_eq!(w.status, WorkoutStatus::InProgress);
    }

    #[test]
    fn edit_stamps_only_unset_timestamps() {
        let mut w = workout(WorkoutStatus::Planned);
        let first = datetime!(2026-10-15 08:00 UTC);
        w.apply_status_edit(WorkoutStatus::InProgress, first).unwrap();
        assert_eq!(w.started_at, Some(first));

        w.apply_status_edit(WorkoutStatus::InProgress, datetime!(2026-10-15 08:10 UTC))
            .unwrap();
        assert_eq!(w.started_at, Some(first));

        let done = datetime!(2026-10-15 09:00 UTC);
        w.apply_status_edit(WorkoutStatus::Completed, done).unwrap();
        assert_eq!(w.completed_at, Some(done));

        // a completed workout may be saved again through an edit
        w.apply_status_edit(WorkoutStatus::Completed, datetime!(2026-10-15 10:00 UTC))
            .unwrap();
        assert_eq!(w.completed_at, Some(done));
    }

    #[test]
    fn edit_uses_the_same_gate() {
        let mut w = workout(WorkoutStatus::Planned);
        status_error(w.apply_status_edit(WorkoutStatus::Completed, datetime!(2026-10-15 09:00 UTC)));

        let mut w = workout(WorkoutStatus::Completed);
        status_error(w.apply_status_edit(WorkoutStatus::Planned, datetime!(2026-10-15 09:00 UTC)));
    }
}
