use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    common::{today, Pagination},
    error::AppError,
    extract::{Json, Path, Query},
    state::AppState,
    steps::{
        dto::{
            CreateDailyStepsRequest, DailyStepsDetails, DailyStepsFilter, PeriodQuery,
            QuickLogRequest, StepGoalRequest, UpdateDailyStepsRequest,
        },
        repo_types::{DailySteps, StepGoal, StepStreak, DEFAULT_DAILY_GOAL},
        services::{
            apply_daily_steps_edit, chart_data, draft_daily_steps, month_bounds, monthly,
            parse_period, period_window, step_summary, touches_streak, update_streak,
            validate_daily_goal, validate_daily_steps, week_bounds, weekly, ChartData,
            MonthlySteps, StepSummary, WeekDay,
        },
    },
};

pub fn daily_routes() -> Router<AppState> {
    Router::new()
        .route("/steps/daily", get(list_daily).post(create_daily))
        .route("/steps/daily/today", get(daily_today))
        .route("/steps/daily/quick_log", post(quick_log))
        .route("/steps/daily/weekly", get(weekly_view))
        .route("/steps/daily/monthly", get(monthly_view))
        .route("/steps/daily/summary", get(summary))
        .route("/steps/daily/chart_data", get(chart))
        .route(
            "/steps/daily/:id",
            get(get_daily).patch(update_daily).delete(delete_daily),
        )
}

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/steps/goals", get(list_goals).post(upsert_goal))
        .route("/steps/goals/current", get(current_goal))
        .route("/steps/goals/:id", patch(update_goal))
}

pub fn streak_routes() -> Router<AppState> {
    Router::new()
        .route("/steps/streaks", get(list_streaks))
        .route("/steps/streaks/current", get(current_streak))
        .route("/steps/streaks/refresh", post(refresh_streak))
}

async fn daily_goal(state: &AppState, user_id: Uuid) -> Result<Option<i32>, AppError> {
    Ok(StepGoal::find_for_user(&state.db, user_id)
        .await?
        .map(|g| g.daily_goal))
}

// --- daily steps ---

#[instrument(skip(state))]
pub async fn list_daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<DailyStepsFilter>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<DailyStepsDetails>>, AppError> {
    let (limit, offset) = p.clamped();
    let goal = daily_goal(&state, user_id).await?;
    let records = DailySteps::list_filtered(&state.db, user_id, &filter, goal, limit, offset).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| DailyStepsDetails::new(r, goal))
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateDailyStepsRequest>,
) -> Result<(StatusCode, Json<DailyStepsDetails>), AppError> {
    let day = today();
    let mut record = draft_daily_steps(user_id, payload, day);
    validate_daily_steps(&record, day)?;
    record.fill_estimates();
    let record = record.insert(&state.db).await?;
    info!(%user_id, date = %record.date, steps = record.steps, "steps logged");

    if touches_streak(record.date, day) {
        update_streak(&state.db, user_id, day).await?;
    }
    let goal = daily_goal(&state, user_id).await?;
    Ok((StatusCode::CREATED, Json(DailyStepsDetails::new(record, goal))))
}

#[instrument(skip(state))]
pub async fn get_daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DailyStepsDetails>, AppError> {
    let record = DailySteps::find(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Step record"))?;
    let goal = daily_goal(&state, user_id).await?;
    Ok(Json(DailyStepsDetails::new(record, goal)))
}

#[instrument(skip(state, payload))]
pub async fn update_daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDailyStepsRequest>,
) -> Result<Json<DailyStepsDetails>, AppError> {
    let day = today();
    let mut record = DailySteps::find(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Step record"))?;
    apply_daily_steps_edit(&mut record, payload);
    validate_daily_steps(&record, day)?;
    record.fill_estimates();
    let record = record.save(&state.db).await?;

    if touches_streak(record.date, day) {
        update_streak(&state.db, user_id, day).await?;
    }
    let goal = daily_goal(&state, user_id).await?;
    Ok(Json(DailyStepsDetails::new(record, goal)))
}

#[instrument(skip(state))]
pub async fn delete_daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !DailySteps::delete(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Step record"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn daily_today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DailyStepsDetails>, AppError> {
    let record = DailySteps::find_by_date(&state.db, user_id, today())
        .await?
        .ok_or_else(|| AppError::NotFound("No steps recorded for today".into()))?;
    let goal = daily_goal(&state, user_id).await?;
    Ok(Json(DailyStepsDetails::new(record, goal)))
}

/// Sets today's count, creating the record if needed. 201 on create, 200 on update.
#[instrument(skip(state, payload))]
pub async fn quick_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<QuickLogRequest>,
) -> Result<(StatusCode, Json<DailyStepsDetails>), AppError> {
    let day = today();
    let steps = payload
        .steps
        .filter(|s| *s != 0)
        .ok_or_else(|| AppError::BadRequest("Steps value is required".into()))?;
    let source = payload.source.unwrap_or_default();

    let (record, status) = match DailySteps::find_by_date(&state.db, user_id, day).await? {
        Some(mut existing) => {
            existing.steps = steps;
            existing.source = source;
            validate_daily_steps(&existing, day)?;
            existing.fill_estimates();
            (existing.save(&state.db).await?, StatusCode::OK)
        }
        None => {
            let mut record = draft_daily_steps(
                user_id,
                CreateDailyStepsRequest {
                    date: Some(day),
                    steps,
                    distance_km: None,
                    calories_burned: None,
                    active_minutes: None,
                    notes: None,
                    source,
                },
                day,
            );
            validate_daily_steps(&record, day)?;
            record.fill_estimates();
            (record.insert(&state.db).await?, StatusCode::CREATED)
        }
    };
    info!(%user_id, steps, created = status == StatusCode::CREATED, "quick log");

    update_streak(&state.db, user_id, day).await?;
    let goal = daily_goal(&state, user_id).await?;
    Ok((status, Json(DailyStepsDetails::new(record, goal))))
}

#[instrument(skip(state))]
pub async fn weekly_view(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WeekDay>>, AppError> {
    let day = today();
    let (start, end) = week_bounds(day);
    let records = DailySteps::list_between(&state.db, user_id, start, end).await?;
    let goal = daily_goal(&state, user_id).await?.unwrap_or(DEFAULT_DAILY_GOAL);
    Ok(Json(weekly(&records, goal, day)))
}

#[instrument(skip(state))]
pub async fn monthly_view(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MonthlySteps>, AppError> {
    let day = today();
    let (start, end) = month_bounds(day);
    let records = DailySteps::list_between(&state.db, user_id, start, end).await?;
    let goal = daily_goal(&state, user_id).await?;
    Ok(Json(monthly(records, goal, day)))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<StepSummary>, AppError> {
    let day = today();
    let period = parse_period(q.period.as_deref(), 30)?;
    let (start, end) = period_window(day, period);
    let records = DailySteps::list_between(&state.db, user_id, start, end).await?;
    let goal = StepGoal::find_for_user(&state.db, user_id).await?;
    let streak = StepStreak::get_or_create(&state.db, user_id, day).await?;
    Ok(Json(step_summary(&records, goal.as_ref(), &streak)))
}

#[instrument(skip(state))]
pub async fn chart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<ChartData>, AppError> {
    let day = today();
    let period = parse_period(q.period.as_deref(), 7)?;
    let (start, end) = period_window(day, period);
    let records = DailySteps::list_between(&state.db, user_id, start, end).await?;
    let goal = daily_goal(&state, user_id).await?.unwrap_or(DEFAULT_DAILY_GOAL);
    Ok(Json(chart_data(&records, goal, day, period)))
}

// --- step goal ---

#[instrument(skip(state))]
pub async fn list_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<StepGoal>>, AppError> {
    let goal = StepGoal::find_for_user(&state.db, user_id).await?;
    Ok(Json(goal.into_iter().collect()))
}

/// One goal per user: an existing goal is updated in place (200).
#[instrument(skip(state, payload))]
pub async fn upsert_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<StepGoalRequest>,
) -> Result<(StatusCode, Json<StepGoal>), AppError> {
    if let Some(daily_goal) = payload.daily_goal {
        validate_daily_goal(daily_goal)?;
    }

    match StepGoal::find_for_user(&state.db, user_id).await? {
        Some(mut goal) => {
            if let Some(daily_goal) = payload.daily_goal {
                goal.daily_goal = daily_goal;
            }
            let goal = goal.save(&state.db).await?;
            info!(%user_id, daily_goal = goal.daily_goal, "step goal updated");
            Ok((StatusCode::OK, Json(goal)))
        }
        None => {
            let daily_goal = payload.daily_goal.unwrap_or(DEFAULT_DAILY_GOAL);
            let goal = StepGoal::create(&state.db, user_id, daily_goal).await?;
            info!(%user_id, daily_goal, "step goal created");
            Ok((StatusCode::CREATED, Json(goal)))
        }
    }
}

#[instrument(skip(state))]
pub async fn current_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StepGoal>, AppError> {
    Ok(Json(
        StepGoal::get_or_create(&state.db, user_id, DEFAULT_DAILY_GOAL).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StepGoalRequest>,
) -> Result<Json<StepGoal>, AppError> {
    let mut goal = StepGoal::find_for_user(&state.db, user_id)
        .await?
        .filter(|g| g.id == id)
        .ok_or_else(|| AppError::not_found("Step goal"))?;
    if let Some(daily_goal) = payload.daily_goal {
        validate_daily_goal(daily_goal)?;
        goal.daily_goal = daily_goal;
    }
    Ok(Json(goal.save(&state.db).await?))
}

// --- streaks ---

#[instrument(skip(state))]
pub async fn list_streaks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<StepStreak>>, AppError> {
    let streak = StepStreak::find_for_user(&state.db, user_id).await?;
    Ok(Json(streak.into_iter().collect()))
}

#[instrument(skip(state))]
pub async fn current_streak(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StepStreak>, AppError> {
    Ok(Json(update_streak(&state.db, user_id, today()).await?))
}

#[instrument(skip(state))]
pub async fn refresh_streak(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StepStreak>, AppError> {
    let streak = update_streak(&state.db, user_id, today()).await?;
    info!(%user_id, current = streak.current_streak, "streak refreshed");
    Ok(Json(streak))
}
