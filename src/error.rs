use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// Several validation failures reported together.
    #[error("Invalid input")]
    Validation(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    /// The region directory answered with an error or garbage.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    UpstreamTimeout(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

/// Stable machine-readable error kind carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Unauthorized,
    Forbidden,
    Conflict,
    Upstream,
    UpstreamTimeout,
    Internal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorData {
    pub kind: ErrorKind,
    pub errors: Vec<String>,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::BadRequest(_) | AppError::Validation(_) => ErrorKind::InvalidInput,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Upstream(_) => ErrorKind::Upstream,
            AppError::UpstreamTimeout(_) => ErrorKind::UpstreamTimeout,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable messages safe to show to clients.
    pub fn messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("Forbidden".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::DbError(err) => tracing::error!(error = %err, "database error"),
            AppError::OrmError(err) => tracing::error!(error = %err, "orm error"),
            AppError::Internal(err) => tracing::error!(error = ?err, "internal error"),
            AppError::Upstream(msg) | AppError::UpstreamTimeout(msg) => {
                tracing::warn!(error = %msg, "region directory unavailable")
            }
            _ => {}
        }

        let body = ApiResponse {
            message: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            data: Some(ErrorData {
                kind: self.kind(),
                errors: self.messages(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures raised while placing an order. Everything up to
/// `InsufficientStock` is detected before the transaction commits.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Shipping address {0} not found")]
    AddressNotFound(i64),

    #[error("Shipping address {0} does not belong to the user")]
    AddressNotOwned(i64),

    #[error("payment_method is required")]
    MissingPaymentMethod,

    #[error("Order must contain at least one line")]
    EmptyOrder,

    #[error("Quantity for product {product_id} must be greater than 0")]
    InvalidQuantity { product_id: i64 },

    #[error("Total for product {product_id} is out of range")]
    TotalOverflow { product_id: i64 },

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Insufficient stock for product {0}")]
    InsufficientStock(i64),

    #[error("Could not allocate a unique invoice code")]
    InvoiceExhausted,

    #[error("Failed to encode product snapshot")]
    Encode(#[from] serde_json::Error),

    #[error("Storage error")]
    Storage(#[from] sea_orm::DbErr),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::AddressNotFound(_) | OrderError::ProductNotFound(_) => {
                AppError::NotFound(message)
            }
            OrderError::AddressNotOwned(_) => AppError::Forbidden(message),
            OrderError::MissingPaymentMethod
            | OrderError::EmptyOrder
            | OrderError::InvalidQuantity { .. }
            | OrderError::TotalOverflow { .. } => AppError::BadRequest(message),
            OrderError::InsufficientStock(_) => AppError::Conflict(message),
            OrderError::InvoiceExhausted => AppError::Internal(anyhow::anyhow!(message)),
            OrderError::Encode(err) => AppError::Internal(err.into()),
            OrderError::Storage(err) => AppError::OrmError(err),
        }
    }
}
