use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use time::{macros::format_description, Date, Duration};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    common::{start_of_week, today, Pagination},
    error::AppError,
    extract::{Json, Path, Query},
    meals::{
        dto::{
            ByDateQuery, CategoriesResponse, CreateFoodItemRequest, CreateMealRequest,
            DateRangeQuery, FoodItemFilter, FoodItemListItem, MealDetails, MealFilter,
            UpdateFoodItemRequest, UpdateMealRequest,
        },
        repo_types::{FoodItem, FoodItemFields, Meal, MealFields},
        services::{
            daily_nutrition, nutrition_summary, validate_food_item, validate_meal,
            DailyNutrition, NutritionSummary,
        },
    },
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/today", get(meals_today))
        .route("/meals/yesterday", get(meals_yesterday))
        .route("/meals/this_week", get(meals_this_week))
        .route("/meals/by_date", get(meals_by_date))
        .route("/meals/summary", get(summary))
        .route("/meals/daily_summary", get(daily_summary))
        .route("/meals/:id", get(get_meal).patch(update_meal).delete(delete_meal))
}

pub fn food_item_routes() -> Router<AppState> {
    Router::new()
        .route("/food-items", get(list_food_items).post(create_food_item))
        .route("/food-items/categories", get(categories))
        .route(
            "/food-items/:id",
            get(get_food_item).patch(update_food_item).delete(delete_food_item),
        )
}

fn details(meals: Vec<Meal>) -> Json<Vec<MealDetails>> {
    Json(meals.into_iter().map(MealDetails::from).collect())
}

fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::BadRequest("Invalid date format. Use YYYY-MM-DD".into()))
}

fn required_range(q: &DateRangeQuery) -> Result<(Date, Date), AppError> {
    match (q.start_date, q.end_date) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(AppError::BadRequest(
            "start_date and end_date parameters are required".into(),
        )),
    }
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<MealFilter>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealDetails>>, AppError> {
    let (limit, offset) = p.clamped();
    let meals = Meal::list_filtered(&state.db, user_id, &filter, Some(limit), offset).await?;
    Ok(details(meals))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<MealDetails>), AppError> {
    let fields = MealFields::from(payload);
    validate_meal(&fields, today())?;
    let meal = Meal::insert(&state.db, user_id, &fields).await?;
    info!(%user_id, meal_id = %meal.id, "meal created");
    Ok((StatusCode::CREATED, Json(meal.into())))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealDetails>, AppError> {
    let meal = Meal::find(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal"))?;
    Ok(Json(meal.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealRequest>,
) -> Result<Json<MealDetails>, AppError> {
    let current = Meal::find(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal"))?;
    let fields = MealFields::from(&current).merge(payload);
    validate_meal(&fields, today())?;
    let meal = Meal::update(&state.db, user_id, id, &fields).await?;
    Ok(Json(meal.into()))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !Meal::delete(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Meal"));
    }
    info!(%user_id, meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn meals_today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealDetails>>, AppError> {
    let day = today();
    Ok(details(Meal::list_between(&state.db, user_id, day, day).await?))
}

#[instrument(skip(state))]
pub async fn meals_yesterday(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealDetails>>, AppError> {
    let day = today() - Duration::days(1);
    Ok(details(Meal::list_between(&state.db, user_id, day, day).await?))
}

#[instrument(skip(state))]
pub async fn meals_this_week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealDetails>>, AppError> {
    let day = today();
    let meals = Meal::list_between(&state.db, user_id, start_of_week(day), day).await?;
    Ok(details(meals))
}

#[instrument(skip(state))]
pub async fn meals_by_date(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ByDateQuery>,
) -> Result<Json<Vec<MealDetails>>, AppError> {
    let raw = q
        .date
        .ok_or_else(|| AppError::BadRequest("date parameter is required".into()))?;
    let day = parse_date(&raw)?;
    Ok(details(Meal::list_between(&state.db, user_id, day, day).await?))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<MealFilter>,
) -> Result<Json<NutritionSummary>, AppError> {
    // dates and meal_type narrow the summary; search only applies to listing
    let filter = MealFilter {
        search: None,
        ..filter
    };
    let meals = Meal::list_filtered(&state.db, user_id, &filter, None, 0).await?;
    Ok(Json(nutrition_summary(&meals)))
}

#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DateRangeQuery>,
) -> Result<Json<Vec<DailyNutrition>>, AppError> {
    let (start, end) = required_range(&q)?;
    let meals = Meal::list_between(&state.db, user_id, start, end).await?;
    Ok(Json(daily_nutrition(&meals)))
}

#[instrument(skip(state))]
pub async fn list_food_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<FoodItemFilter>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<FoodItemListItem>>, AppError> {
    let (limit, offset) = p.clamped();
    let items = FoodItem::list_visible(&state.db, user_id, &filter, limit, offset).await?;
    Ok(Json(items.into_iter().map(FoodItemListItem::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_food_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateFoodItemRequest>,
) -> Result<(StatusCode, Json<FoodItem>), AppError> {
    let fields = FoodItemFields::from(payload);
    validate_food_item(&fields)?;
    let item = FoodItem::insert_custom(&state.db, user_id, &fields).await?;
    info!(%user_id, food_item_id = %item.id, "custom food item created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state))]
pub async fn get_food_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodItem>, AppError> {
    FoodItem::find_visible(&state.db, user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Food item"))
}

#[instrument(skip(state, payload))]
pub async fn update_food_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFoodItemRequest>,
) -> Result<Json<FoodItem>, AppError> {
    let current = FoodItem::find_owned(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Food item"))?;
    let fields = FoodItemFields::from(&current).merge(payload);
    validate_food_item(&fields)?;
    Ok(Json(FoodItem::update_owned(&state.db, user_id, id, &fields).await?))
}

#[instrument(skip(state))]
pub async fn delete_food_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !FoodItem::delete_owned(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Food item"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = FoodItem::categories(&state.db, user_id).await?;
    Ok(Json(CategoriesResponse { categories }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn by_date_accepts_iso_dates_only() {
        assert_eq!(parse_date("2026-10-15").unwrap(), date!(2026 - 10 - 15));
        assert!(matches!(parse_date("15/10/2026"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn summary_range_needs_both_ends() {
        let q = DateRangeQuery {
            start_date: Some(date!(2026 - 10 - 1)),
            end_date: None,
        };
        assert!(matches!(required_range(&q), Err(AppError::BadRequest(_))));
    }
}
