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
    common::{start_of_week, today, Pagination},
    error::AppError,
    extract::{Json, Path, Query},
    state::AppState,
    workouts::{
        dto::{CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutDetails, WorkoutFilter},
        repo_types::{CompletionOverrides, Workout},
        services::{
            apply_workout_edit, draft_workout, validate_workout, workout_summary, WorkoutSummary,
        },
    },
};

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_workouts).post(create_workout))
        .route("/workouts/today", get(workouts_today))
        .route("/workouts/this_week", get(workouts_this_week))
        .route("/workouts/summary", get(summary))
        .route(
            "/workouts/:id",
            get(get_workout).patch(update_workout).delete(delete_workout),
        )
        .route("/workouts/:id/start", post(start_workout))
        .route("/workouts/:id/complete", post(complete_workout))
        .route("/workouts/:id/skip", post(skip_workout))
}

async fn load(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Workout, AppError> {
    Workout::find(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout"))
}

fn details(workouts: Vec<Workout>) -> Json<Vec<WorkoutDetails>> {
    Json(workouts.into_iter().map(WorkoutDetails::from).collect())
}

#[instrument(skip(state))]
pub async fn list_workouts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<WorkoutFilter>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<WorkoutDetails>>, AppError> {
    let (limit, offset) = p.clamped();
    let workouts = Workout::list_filtered(&state.db, user_id, &filter, Some(limit), offset).await?;
    Ok(details(workouts))
}

#[instrument(skip(state, payload))]
pub async fn create_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutDetails>), AppError> {
    let workout = draft_workout(user_id, payload, OffsetDateTime::now_utc())?;
    validate_workout(&workout, today())?;
    let workout = workout.insert(&state.db).await?;
    info!(%user_id, workout_id = %workout.id, status = %workout.status, "workout created");
    Ok((StatusCode::CREATED, Json(workout.into())))
}

#[instrument(skip(state))]
pub async fn get_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutDetails>, AppError> {
    Ok(Json(load(&state, user_id, id).await?.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkoutRequest>,
) -> Result<Json<WorkoutDetails>, AppError> {
    let mut workout = load(&state, user_id, id).await?;
    apply_workout_edit(&mut workout, payload, OffsetDateTime::now_utc())?;
    validate_workout(&workout, today())?;
    Ok(Json(workout.save(&state.db).await?.into()))
}

#[instrument(skip(state))]
pub async fn delete_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !Workout::delete(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Workout"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn workouts_today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WorkoutDetails>>, AppError> {
    let day = today();
    let filter = WorkoutFilter {
        start_date: Some(day),
        end_date: Some(day),
        ..Default::default()
    };
    Ok(details(Workout::list_filtered(&state.db, user_id, &filter, None, 0).await?))
}

#[instrument(skip(state))]
pub async fn workouts_this_week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WorkoutDetails>>, AppError> {
    let day = today();
    let filter = WorkoutFilter {
        start_date: Some(start_of_week(day)),
        end_date: Some(day),
        ..Default::default()
    };
    Ok(details(Workout::list_filtered(&state.db, user_id, &filter, None, 0).await?))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<WorkoutFilter>,
) -> Result<Json<WorkoutSummary>, AppError> {
    let workouts = Workout::list_filtered(&state.db, user_id, &filter, None, 0).await?;
    Ok(Json(workout_summary(&workouts)))
}

#[instrument(skip(state))]
pub async fn start_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutDetails>, AppError> {
    let mut workout = load(&state, user_id, id).await?;
    workout.start(OffsetDateTime::now_utc())?;
    info!(%user_id, workout_id = %id, "workout started");
    Ok(Json(workout.save(&state.db).await?.into()))
}

#[instrument(skip(state, payload))]
pub async fn complete_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<CompletionOverrides>>,
) -> Result<Json<WorkoutDetails>, AppError> {
    let overrides = payload.map(|Json(o)| o).unwrap_or_default();
    let mut workout = load(&state, user_id, id).await?;
    workout.complete(OffsetDateTime::now_utc(), overrides)?;
    info!(%user_id, workout_id = %id, "workout completed");
    Ok(Json(workout.save(&state.db).await?.into()))
}

#[instrument(skip(state))]
pub async fn skip_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutDetails>, AppError> {
    let mut workout = load(&state, user_id, id).await?;
    workout.skip()?;
    info!(%user_id, workout_id = %id, "workout skipped");
    Ok(Json(workout.save(&state.db).await?.into()))
}
