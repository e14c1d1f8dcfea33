use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;

use axum::{
    async_trait,
    extract::{FromRequestParts, Json},
    http::{StatusCode, header, request::Parts},
};
use serde_json::json;

pub const SESSION_COOKIE: &str = "brandhub_session";
pub const SESSION_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub role: String,
    pub exp: usize,
}

type Rejection = (StatusCode, Json<serde_json::Value>);

fn unauthorized(msg: &str) -> Rejection {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg })))
}

/// Pull the session token from `Authorization: Bearer` or the session cookie
fn token_from_parts(parts: &Parts) -> Result<String, Rejection> {
    if let Some(auth_header) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        return auth_header
            .strip_prefix("Bearer ")
            .map(|t| t.trim().to_string())
            .ok_or_else(|| unauthorized("Invalid Authorization header format"));
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .ok_or_else(|| unauthorized("Missing session"))
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?;
        decode_jwt(&token).map_err(|_| unauthorized("Invalid or expired token"))
    }
}

/// Claims of a caller holding the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;
        if claims.role != "admin" {
            return Err((
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Admin role required" })),
            ));
        }
        Ok(AdminUser(claims))
    }
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn get_jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "secret".to_string()
        } else {
            panic!("JWT_SECRET environment variable must be set in production");
        }
    })
}

pub fn create_jwt(username: &str, role: &str) -> Result<String, String> {
    let secret = get_jwt_secret();
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(SESSION_HOURS))
        .ok_or_else(|| "timestamp overflow".to_string())?
        .timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        role: role.to_owned(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn decode_jwt(token: &str) -> Result<Claims, String> {
    let secret = get_jwt_secret();
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_HOURS * 3600
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<Claims, StatusCode> {
        let (mut parts, _) = req.into_parts();
        Claims::from_request_parts(&mut parts, &())
            .await
            .map_err(|(status, _)| status)
    }

    #[tokio::test]
    async fn test_claims_from_bearer_and_cookie() {
        let token = create_jwt("editor", "admin").unwrap();

        let bearer = Request::builder()
            .header("Authorization", format!("Bearer {}", token))
            .body(())
            .unwrap();
        assert_eq!(extract(bearer).await.unwrap().sub, "editor");

        let cookie = Request::builder()
            .header("Cookie", format!("theme=dark; {}={}", SESSION_COOKIE, token))
            .body(())
            .unwrap();
        assert_eq!(extract(cookie).await.unwrap().sub, "editor");

        let missing = Request::builder().body(()).unwrap();
        assert_eq!(extract(missing).await.unwrap_err(), StatusCode::UNAUTHORIZED);

        let garbage = Request::builder()
            .header("Authorization", "Bearer not-a-jwt")
            .body(())
            .unwrap();
        assert_eq!(extract(garbage).await.unwrap_err(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_extractor_rejects_other_roles() {
        let token = create_jwt("viewer", "user").unwrap();
        let req = Request::builder()
            .header("Authorization", format!("Bearer {}", token))
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        let result = AdminUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err().0, StatusCode::FORBIDDEN);
    }
}
