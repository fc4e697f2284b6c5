use sqlx::SqlitePool;

use crate::{errors::AppError, structs::User, utils};

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, created_at, updated_at, email, pwd_hash FROM users WHERE email = ?",
    )
    .bind(email.to_lowercase())
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn create_user(pool: &SqlitePool, email: &str, password: &str) -> Result<User, AppError> {
    let created_at = chrono::Utc::now().to_rfc3339();
    let pwd_hash = utils::hash_password(password)?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (created_at, updated_at, email, pwd_hash) VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(&created_at)
    .bind(&created_at)
    .bind(email.to_lowercase())
    .bind(pwd_hash)
    .fetch_one(pool)
    .await?;
    log::info!("User created: {}", user.email);
    Ok(user)
}

/// Creates the bootstrap administrator unless the account already exists.
pub async fn ensure_admin(pool: &SqlitePool, email: &str, password: &str) -> Result<User, AppError> {
    if let Some(user) = get_user_by_email(pool, email).await? {
        return Ok(user);
    }
    create_user(pool, email, password).await
}

/// Checks the credentials, returning the user on success.
pub async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let Some(user) = get_user_by_email(pool, email).await? else {
        return Ok(None);
    };
    if utils::verify_password(password, &user.pwd_hash)? {
        Ok(Some(user))
    } else {
        log::warn!("Wrong password for {}", user.email);
        Ok(None)
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}
