use crate::auth::repo_types::User;
use crate::auth::services::revocation_prune_cutoff;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

const USER_COLUMNS: &str = r#"
    id, email, password_hash, first_name, last_name, phone_number, date_of_birth,
    height, weight, gender, fitness_goal, created_at, updated_at
"#;

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(db)
        .await
    }

    pub async fn save_profile(&self, db: &PgPool) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET first_name = $2, last_name = $3, phone_number = $4, date_of_birth = $5,
                   height = $6, weight = $7, gender = $8, fitness_goal = $9, updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.phone_number)
        .bind(self.date_of_birth)
        .bind(self.height)
        .bind(self.weight)
        .bind(self.gender.as_db())
        .bind(&self.fitness_goal)
        .fetch_one(db)
        .await
    }
}

/// Refresh-token revocation list, keyed by the token's `jti`. Entries whose
/// token can no longer verify are pruned on the way in.
pub async fn revoke_token(
    db: &PgPool,
    jti: Uuid,
    user_id: Uuid,
    expires_at: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<(), sqlx::Error> {
    let pruned = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
        .bind(revocation_prune_cutoff(now))
        .execute(db)
        .await?
        .rows_affected();
    if pruned > 0 {
        debug!(pruned, "expired revocations pruned");
    }

    sqlx::query(
        r#"
        INSERT INTO revoked_tokens (jti, user_id, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (jti) DO NOTHING
        "#,
    )
    .bind(jti)
    .bind(user_id)
    .bind(expires_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn is_revoked(db: &PgPool, jti: Uuid) -> Result<bool, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT jti FROM revoked_tokens WHERE jti = $1")
        .bind(jti)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}
