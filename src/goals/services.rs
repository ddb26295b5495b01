use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::common::{percent, round_to};
use crate::error::AppError;
use crate::goals::dto::{
    CreateGoalRequest, GoalSummary, UpdateGoalRequest, UpdateProgressRequest,
};
use crate::goals::repo_types::Goal;

/// Checked before `before_save` on every write.
pub fn validate_goal(g: &Goal) -> Result<(), AppError> {
    if g.end_date <= g.start_date {
        return Err(AppError::validation("end_date", "End date must be after start date"));
    }
    if g.target_value <= Decimal::ZERO {
        return Err(AppError::validation(
            "target_value",
            "Target value must be greater than zero",
        ));
    }
    if g.current_value < Decimal::ZERO {
        return Err(AppError::validation("current_value", "Current value cannot be negative"));
    }
    if g.title.chars().count() > 200 {
        return Err(AppError::validation(
            "title",
            "Ensure this field has no more than 200 characters.",
        ));
    }
    Ok(())
}

/// Validates and normalises a new goal, ready to insert.
pub fn draft_goal(
    user_id: Uuid,
    req: CreateGoalRequest,
    now: OffsetDateTime,
) -> Result<Goal, AppError> {
    let mut goal = Goal {
        id: Uuid::nil(),
        user_id,
        goal_type: req.goal_type,
        title: req.title,
        target_value: req.target_value,
        current_value: req.current_value,
        start_date: req.start_date,
        end_date: req.end_date,
        is_completed: false,
        completed_at: None,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };
    validate_goal(&goal)?;
    goal.before_save(now);
    Ok(goal)
}

pub fn apply_goal_edit(
    goal: &mut Goal,
    u: UpdateGoalRequest,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    if let Some(v) = u.goal_type {
        goal.goal_type = v;
    }
    if let Some(v) = u.title {
        goal.title = v;
    }
    if let Some(v) = u.target_value {
        goal.target_value = v;
    }
    if let Some(v) = u.current_value {
        goal.current_value = v;
    }
    if let Some(v) = u.start_date {
        goal.start_date = v;
    }
    if let Some(v) = u.end_date {
        goal.end_date = v;
    }
    goal.notes = u.notes.or(goal.notes.take());
    validate_goal(goal)?;
    goal.before_save(now);
    Ok(())
}

/// `current_value` wins over `increment_by`; one of them is required.
pub fn apply_progress(
    goal: &mut Goal,
    req: UpdateProgressRequest,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    goal.current_value = match (req.current_value, req.increment_by) {
        (Some(value), _) => value,
        (None, Some(step)) => goal.current_value + step,
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either current_value or increment_by must be provided".into(),
            ))
        }
    };
    validate_goal(goal)?;
    goal.before_save(now);
    Ok(())
}

pub fn goal_summary(goals: &[Goal]) -> GoalSummary {
    let mut s = GoalSummary {
        total_goals: goals.len() as i64,
        completed_goals: 0,
        in_progress_goals: 0,
        completion_rate: 0.0,
        goals_by_type: Default::default(),
    };
    for g in goals {
        let entry = s.goals_by_type.entry(g.goal_type.as_str()).or_default();
        entry.count += 1;
        if g.is_completed {
            s.completed_goals += 1;
            entry.completed += 1;
        } else {
            s.in_progress_goals += 1;
            entry.in_progress += 1;
        }
    }
    s.completion_rate = round_to(percent(s.completed_goals as f64, s.total_goals as f64), 2);
    s
}
