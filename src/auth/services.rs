pub(crate) use crate::auth::dto::{Claims, JwtKeys, TokenKind};
use crate::auth::dto::UpdateProfileRequest;
use crate::auth::repo_types::ProfileChanges;
use crate::config::JwtConfig;
use crate::error::AppError;
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{async_trait, extract::{FromRef, FromRequestParts}, http::request::Parts};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use rust_decimal::Decimal;
use std::time::Duration;
use time::{Date, Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Checks a profile update and turns it into changes for `User::apply_profile`.
pub fn validate_profile(
    req: UpdateProfileRequest,
    today: Date,
) -> Result<ProfileChanges, AppError> {
    let body_metric_limit = Decimal::new(99999, 2);
    if let Some(phone) = &req.phone_number {
        if phone.chars().count() > 15 {
            return Err(AppError::validation(
                "phone_number",
                "Phone number cannot exceed 15 characters",
            ));
        }
    }
    if let Some(dob) = req.date_of_birth {
        if dob > today {
            return Err(AppError::validation(
                "date_of_birth",
                "Date of birth cannot be in the future",
            ));
        }
    }
    for (field, value) in [("height", req.height), ("weight", req.weight)] {
        if let Some(v) = value {
            if v <= Decimal::ZERO || v > body_metric_limit {
                return Err(AppError::validation(
                    field,
                    format!("{field} must be between 0 and {body_metric_limit}"),
                ));
            }
        }
    }
    if let Some(goal) = &req.fitness_goal {
        if goal.chars().count() > 50 {
            return Err(AppError::validation(
                "fitness_goal",
                "Fitness goal cannot exceed 50 characters",
            ));
        }
    }
    Ok(ProfileChanges {
        first_name: req.first_name,
        last_name: req.last_name,
        phone_number: req.phone_number,
        date_of_birth: req.date_of_birth,
        height: req.height,
        weight: req.weight,
        gender: req.gender,
        fitness_goal: req.fitness_goal,
    })
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
            refresh_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs((ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((refresh_ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn sign_with_kind(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Access)
    }
    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Refresh)
    }

    /// Signs a fresh access/refresh pair.
    pub fn sign_pair(&self, user_id: Uuid) -> anyhow::Result<(String, String)> {
        Ok((self.sign_access(user_id)?, self.sign_refresh(user_id)?))
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = TOKEN_LEEWAY_SECS;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }
}

/// Clock skew tolerated on `exp` when verifying.
pub const TOKEN_LEEWAY_SECS: u64 = 60;

/// Revocations that expired before this instant can be dropped: the tokens
/// they name no longer verify.
pub fn revocation_prune_cutoff(now: OffsetDateTime) -> OffsetDateTime {
    now - TimeDuration::seconds(TOKEN_LEEWAY_SECS as i64)
}

/// Expiry of a verified token as a timestamp.
pub fn claims_expiry(claims: &Claims) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(claims.exp as i64).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Authenticated caller, resolved from a bearer access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(AppError::Unauthorized("Invalid or expired token".into()));
            }
        };

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("Access token required".into()));
        }

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        let msg = err.to_string();
        assert!(!msg.is_empty());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("runner@example.com"));
        assert!(!is_valid_email("runner@example"));
        assert!(!is_valid_email("run ner@example.com"));
        assert!(!is_valid_email(""));
    }
}

#[cfg(test)]
mod profile_tests {
    use super::*;
    use time::macros::date;

    fn empty() -> UpdateProfileRequest {
        UpdateProfileRequest {
            first_name: None,
            last_name: None,
            phone_number: None,
            date_of_birth: None,
            height: None,
            weight: None,
            gender: None,
            fitness_goal: None,
        }
    }

    #[test]
    fn accepts_reasonable_profile() {
        let req = UpdateProfileRequest {
            height: Some(Decimal::new(18250, 2)),
            weight: Some(Decimal::new(7400, 2)),
            fitness_goal: Some("run a marathon".into()),
            ..empty()
        };
        let changes = validate_profile(req, date!(2026 - 10 - 15)).unwrap();
        assert_eq!(changes.height, Some(Decimal::new(18250, 2)));
    }

    #[test]
    fn rejects_future_birth_date() {
        let req = UpdateProfileRequest {
            date_of_birth: Some(date!(2030 - 01 - 01)),
            ..empty()
        };
        match validate_profile(req, date!(2026 - 10 - 15)) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "date_of_birth"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_weight() {
        let req = UpdateProfileRequest {
            weight: Some(Decimal::ZERO),
            ..empty()
        };
        match validate_profile(req, date!(2026 - 10 - 15)) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "weight"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}

#[cfg(test)]
mod jwt_tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[tokio::test]
    async fn sign_and_verify_refresh_token_and_verify_refresh() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_refresh(user_id).expect("sign refresh");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert!(claims_expiry(&claims) > OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn verify_refresh_rejects_access_token() {
        let keys = make_keys();
        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");
        let err = keys.verify_refresh(&token).unwrap_err();
        assert!(err.to_string().contains("not a refresh token"));
    }

    #[tokio::test]
    async fn each_token_gets_its_own_jti() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let (access, refresh) = keys.sign_pair(user_id).expect("sign pair");
        let a = keys.verify(&access).unwrap();
        let r = keys.verify(&refresh).unwrap();
        assert_ne!(a.jti, r.jti);
    }

    fn refresh_expiring_at(keys: &JwtKeys, exp: OffsetDateTime) -> String {
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (exp - TimeDuration::hours(1)).unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
            kind: TokenKind::Refresh,
            jti: Uuid::new_v4(),
        };
        encode(&Header::default(), &claims, &keys.encoding).unwrap()
    }

    #[tokio::test]
    async fn prunable_revocations_name_tokens_that_no_longer_verify() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let cutoff = revocation_prune_cutoff(now);

        let stale = refresh_expiring_at(&keys, cutoff - TimeDuration::seconds(5));
        assert!(keys.verify_refresh(&stale).is_err());

        // inside the leeway the token still verifies, so its revocation must stay
        let recent = refresh_expiring_at(&keys, now - TimeDuration::seconds(10));
        assert!(keys.verify_refresh(&recent).is_ok());
        assert!(now - TimeDuration::seconds(10) > cutoff);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_issuer_or_audience() {
        let good_keys = make_keys();
        let mut bad_keys = make_keys();
        bad_keys.issuer = "bad-iss".into();
        bad_keys.audience = "bad-aud".into();
        let token = good_keys.sign_access(Uuid::new_v4()).expect("sign access");
        let err = bad_keys.verify(&token).unwrap_err();
        let msg = err.to_string();
        assert!(!msg.is_empty());
    }
}
