use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::meals::dto::{FoodItemFilter, MealFilter};
use crate::meals::repo_types::{FoodItem, FoodItemFields, Meal, MealFields};

const MEAL_COLUMNS: &str = r#"
    id, user_id, meal_type, name, description, calories, protein, carbohydrates,
    fats, fiber, sugar, sodium, serving_size, servings, meal_date, meal_time,
    notes, photo_url, created_at, updated_at
"#;

const FOOD_ITEM_COLUMNS: &str = r#"
    id, name, description, category, calories, protein, carbohydrates, fats,
    fiber, sugar, sodium, serving_size, serving_unit, is_custom, created_by,
    is_active, created_at, updated_at
"#;

impl Meal {
    pub async fn list_filtered(
        db: &PgPool,
        user_id: Uuid,
        filter: &MealFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Meal>, sqlx::Error> {
        sqlx::query_as::<_, Meal>(&format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meals
            WHERE user_id = $1
              AND ($2::date IS NULL OR meal_date >= $2)
              AND ($3::date IS NULL OR meal_date <= $3)
              AND ($4::text IS NULL OR meal_type = $4)
              AND ($5::text IS NULL OR name ILIKE '%' || $5 || '%'
                   OR description ILIKE '%' || $5 || '%'
                   OR notes ILIKE '%' || $5 || '%')
            ORDER BY meal_date DESC, meal_time DESC NULLS LAST, created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.meal_type.map(|t| t.as_str()))
        .bind(filter.search.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Meals with `from <= meal_date <= to`, oldest day first.
    pub async fn list_between(
        db: &PgPool,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> Result<Vec<Meal>, sqlx::Error> {
        sqlx::query_as::<_, Meal>(&format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meals
            WHERE user_id = $1 AND meal_date BETWEEN $2 AND $3
            ORDER BY meal_date ASC, meal_time ASC NULLS LAST, created_at ASC
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await
    }

    pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Meal>, sqlx::Error> {
        sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn insert(db: &PgPool, user_id: Uuid, f: &MealFields) -> Result<Meal, sqlx::Error> {
        sqlx::query_as::<_, Meal>(&format!(
            r#"
            INSERT INTO meals (user_id, meal_type, name, description, calories, protein,
                               carbohydrates, fats, fiber, sugar, sodium, serving_size,
                               servings, meal_date, meal_time, notes, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(f.meal_type.as_str())
        .bind(&f.name)
        .bind(&f.description)
        .bind(f.calories)
        .bind(f.protein)
        .bind(f.carbohydrates)
        .bind(f.fats)
        .bind(f.fiber)
        .bind(f.sugar)
        .bind(f.sodium)
        .bind(&f.serving_size)
        .bind(f.servings)
        .bind(f.meal_date)
        .bind(f.meal_time)
        .bind(&f.notes)
        .bind(&f.photo_url)
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        f: &MealFields,
    ) -> Result<Meal, sqlx::Error> {
        sqlx::query_as::<_, Meal>(&format!(
            r#"
            UPDATE meals
               SET meal_type = $3, name = $4, description = $5, calories = $6, protein = $7,
                   carbohydrates = $8, fats = $9, fiber = $10, sugar = $11, sodium = $12,
                   serving_size = $13, servings = $14, meal_date = $15, meal_time = $16,
                   notes = $17, photo_url = $18, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(f.meal_type.as_str())
        .bind(&f.name)
        .bind(&f.description)
        .bind(f.calories)
        .bind(f.protein)
        .bind(f.carbohydrates)
        .bind(f.fats)
        .bind(f.fiber)
        .bind(f.sugar)
        .bind(f.sodium)
        .bind(&f.serving_size)
        .bind(f.servings)
        .bind(f.meal_date)
        .bind(f.meal_time)
        .bind(&f.notes)
        .bind(&f.photo_url)
        .fetch_one(db)
        .await
    }

    /// Returns false when nothing matched.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

// A user sees the active shared catalog plus their own custom items.
const VISIBLE_TO_USER: &str =
    "((is_active AND NOT is_custom) OR (is_custom AND created_by = $1))";

impl FoodItem {
    pub async fn list_visible(
        db: &PgPool,
        user_id: Uuid,
        filter: &FoodItemFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FoodItem>, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            SELECT {FOOD_ITEM_COLUMNS}
            FROM food_items
            WHERE {VISIBLE_TO_USER}
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%'
                   OR description ILIKE '%' || $3 || '%'
                   OR category ILIKE '%' || $3 || '%')
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(user_id)
        .bind(filter.category.as_deref())
        .bind(filter.search.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn find_visible(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<FoodItem>, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&format!(
            "SELECT {FOOD_ITEM_COLUMNS} FROM food_items WHERE {VISIBLE_TO_USER} AND id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Only the caller's own custom items are writable.
    pub async fn find_owned(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<FoodItem>, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            SELECT {FOOD_ITEM_COLUMNS}
            FROM food_items
            WHERE id = $1 AND is_custom AND created_by = $2
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn insert_custom(
        db: &PgPool,
        user_id: Uuid,
        f: &FoodItemFields,
    ) -> Result<FoodItem, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            INSERT INTO food_items (name, description, category, calories, protein,
                                    carbohydrates, fats, fiber, sugar, sodium,
                                    serving_size, serving_unit, is_custom, created_by, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE, $13, $14)
            RETURNING {FOOD_ITEM_COLUMNS}
            "#
        ))
        .bind(&f.name)
        .bind(&f.description)
        .bind(&f.category)
        .bind(f.calories)
        .bind(f.protein)
        .bind(f.carbohydrates)
        .bind(f.fats)
        .bind(f.fiber)
        .bind(f.sugar)
        .bind(f.sodium)
        .bind(&f.serving_size)
        .bind(&f.serving_unit)
        .bind(user_id)
        .bind(f.is_active)
        .fetch_one(db)
        .await
    }

    pub async fn update_owned(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        f: &FoodItemFields,
    ) -> Result<FoodItem, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            UPDATE food_items
               SET name = $3, description = $4, category = $5, calories = $6, protein = $7,
                   carbohydrates = $8, fats = $9, fiber = $10, sugar = $11, sodium = $12,
                   serving_size = $13, serving_unit = $14, is_active = $15, updated_at = now()
             WHERE id = $1 AND is_custom AND created_by = $2
            RETURNING {FOOD_ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&f.name)
        .bind(&f.description)
        .bind(&f.category)
        .bind(f.calories)
        .bind(f.protein)
        .bind(f.carbohydrates)
        .bind(f.fats)
        .bind(f.fiber)
        .bind(f.sugar)
        .bind(f.sodium)
        .bind(&f.serving_size)
        .bind(&f.serving_unit)
        .bind(f.is_active)
        .fetch_one(db)
        .await
    }

    pub async fn delete_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let res =
            sqlx::query("DELETE FROM food_items WHERE id = $1 AND is_custom AND created_by = $2")
                .bind(id)
                .bind(user_id)
                .execute(db)
                .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Distinct non-empty categories among the items the user can see.
    pub async fn categories(db: &PgPool, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(&format!(
            r#"
            SELECT DISTINCT category
            FROM food_items
            WHERE {VISIBLE_TO_USER} AND category IS NOT NULL AND category <> ''
            ORDER BY category
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|(c,)| c).collect())
    }
}
