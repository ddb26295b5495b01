use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::common::text_enum;

text_enum! {
    pub enum Gender {
        Male => ("male", "Male"),
        Female => ("female", "Female"),
        Other => ("other", "Other"),
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub email: String,                // lower-cased, unique
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    pub height: Option<Decimal>,      // cm
    pub weight: Option<Decimal>,      // kg
    #[sqlx(try_from = "String")]
    pub gender: GenderColumn,
    pub fitness_goal: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Nullable `gender` column; an empty string is stored for "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenderColumn(pub Option<Gender>);

impl TryFrom<String> for GenderColumn {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(None));
        }
        value.parse().map(|g| Self(Some(g)))
    }
}

impl GenderColumn {
    pub fn as_db(&self) -> &'static str {
        self.0.map(|g| g.as_str()).unwrap_or("")
    }
}

/// Profile fields that can be changed after registration.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    pub height: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub gender: Option<Gender>,
    pub fitness_goal: Option<String>,
}

impl User {
    pub fn apply_profile(&mut self, changes: ProfileChanges) {
        if let Some(v) = changes.first_name {
            self.first_name = Some(v);
        }
        if let Some(v) = changes.last_name {
            self.last_name = Some(v);
        }
        if let Some(v) = changes.phone_number {
            self.phone_number = Some(v);
        }
        if let Some(v) = changes.date_of_birth {
            self.date_of_birth = Some(v);
        }
        if let Some(v) = changes.height {
            self.height = Some(v);
        }
        if let Some(v) = changes.weight {
            self.weight = Some(v);
        }
        if let Some(v) = changes.gender {
            self.gender = GenderColumn(Some(v));
        }
        if let Some(v) = changes.fitness_goal {
            self.fitness_goal = Some(v);
        }
    }
}
