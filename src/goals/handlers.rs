use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    common::{today, Pagination},
    error::AppError,
    extract::{Json, Path, Query},
    goals::{
        dto::{
            CreateGoalRequest, GoalDetails, GoalFilter, GoalSummary, UpdateGoalRequest,
            UpdateProgressRequest,
        },
        repo_types::Goal,
        services::{apply_goal_edit, apply_progress, draft_goal, goal_summary},
    },
    state::AppState,
};

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/summary", get(summary))
        .route("/goals/:id", get(get_goal).patch(update_goal).delete(delete_goal))
        .route("/goals/:id/update_progress", post(update_progress))
}

async fn load(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Goal, AppError> {
    Goal::find(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Goal"))
}

#[instrument(skip(state))]
pub async fn list_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<GoalFilter>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<GoalDetails>>, AppError> {
    let (limit, offset) = p.clamped();
    let day = today();
    let goals = Goal::list_filtered(&state.db, user_id, &filter, day, Some(limit), offset).await?;
    Ok(Json(goals.into_iter().map(|g| GoalDetails::new(g, day)).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<GoalDetails>), AppError> {
    let goal = draft_goal(user_id, payload, OffsetDateTime::now_utc())?;
    let goal = goal.insert(&state.db).await?;
    info!(%user_id, goal_id = %goal.id, completed = goal.is_completed, "goal created");
    Ok((StatusCode::CREATED, Json(GoalDetails::new(goal, today()))))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalDetails>, AppError> {
    Ok(Json(GoalDetails::new(load(&state, user_id, id).await?, today())))
}

#[instrument(skip(state, payload))]
pub async fn update_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGoalRequest>,
) -> Result<Json<GoalDetails>, AppError> {
    let mut goal = load(&state, user_id, id).await?;
    apply_goal_edit(&mut goal, payload, OffsetDateTime::now_utc())?;
    let goal = goal.save(&state.db).await?;
    Ok(Json(GoalDetails::new(goal, today())))
}

#[instrument(skip(state))]
pub async fn delete_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !Goal::delete(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Goal"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn update_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<Json<GoalDetails>, AppError> {
    let mut goal = load(&state, user_id, id).await?;
    let was_completed = goal.is_completed;
    apply_progress(&mut goal, payload, OffsetDateTime::now_utc())?;
    let goal = goal.save(&state.db).await?;
    if goal.is_completed != was_completed {
        info!(%user_id, goal_id = %id, completed = goal.is_completed, "goal completion changed");
    }
    Ok(Json(GoalDetails::new(goal, today())))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<GoalSummary>, AppError> {
    let goals = Goal::list_all(&state.db, user_id).await?;
    Ok(Json(goal_summary(&goals)))
}
