//! Admin account bootstrap and login

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::domain::DomainError;
use crate::infrastructure::auth::{create_jwt, hash_password, verify_password};
use crate::models::user::{self, Entity as User};
use crate::utils::time::now_ts;

pub const MIN_PASSWORD_CHARS: usize = 8;

/// First-run admin creation; refused once any user exists
pub async fn setup_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model, DomainError> {
    if User::find().count(db).await? > 0 {
        return Err(DomainError::Conflict("admin account already exists".to_string()));
    }

    let username = username.trim();
    if username.is_empty() {
        return Err(DomainError::validation("username is required"));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(DomainError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }

    let password_hash = hash_password(password).map_err(DomainError::Internal)?;
    let now = now_ts();
    let admin = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        role: Set("admin".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("👤 Admin '{}' created", admin.username);
    Ok(admin)
}

/// Check credentials and issue a session token
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<String, DomainError> {
    let invalid = || DomainError::Unauthorized("Invalid credentials".to_string());

    let user = User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Login for unknown user: {}", username);
            invalid()
        })?;

    match verify_password(password, &user.password_hash) {
        Ok(true) => create_jwt(&user.username, &user.role).map_err(DomainError::Internal),
        _ => {
            tracing::warn!("Password verification failed for user: {}", user.username);
            Err(invalid())
        }
    }
}
