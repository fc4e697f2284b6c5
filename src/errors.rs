use actix_identity::error::{GetIdentityError, LoginError};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sqlx::Error as SqlxError;
use thiserror::Error;

use crate::gateway::ApiError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("Identity error: {0}")]
    IdentityError(#[from] GetIdentityError),

    #[error("Login error: {0}")]
    LoginError(#[from] LoginError),

    #[error("Password error: {0}")]
    PasswordError(String),

    #[error("Backend API error: {0}")]
    Api(#[from] ApiError),

    #[error("Stored document is not valid base64: {0}")]
    InvalidDocument(#[from] base64::DecodeError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Api(ApiError::Status { status_code, .. }) if *status_code == 404 => {
                StatusCode::NOT_FOUND
            }
            AppError::Api(_) | AppError::InvalidDocument(_) => StatusCode::BAD_GATEWAY,
            AppError::IdentityError(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_)
            | AppError::MigrateError(_)
            | AppError::IoError(_)
            | AppError::ConfigError(_)
            | AppError::TemplateError(_)
            | AppError::LoginError(_)
            | AppError::PasswordError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_404_maps_to_not_found() {
        let err = AppError::Api(ApiError::Status {
            status_code: 404,
            message: String::new(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_backend_failures_are_bad_gateway() {
        let err = AppError::Api(ApiError::Status {
            status_code: 500,
            message: "boom".into(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }
}
