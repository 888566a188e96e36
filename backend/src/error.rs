//! Error handling for the Nimble inventory backend
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{AmountOverflow, ProrationError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Proration failed: {0}")]
    Proration(#[from] ProrationError),

    // Storage errors
    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Validation failure on a single field
    pub fn validation(field: &str, message: &str, message_es: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_es: message_es.to_string(),
        }
    }

    /// Stable machine-readable code, also used in the response body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } | AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            AppError::Proration(_) => "PRORATION_ERROR",
            AppError::Transaction(_) | AppError::DatabaseError(_) => "TRANSACTION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .min()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: format!("Invalid value for {}", field),
            message_es: format!("Valor inválido para {}", field),
            field,
        }
    }
}

impl From<AmountOverflow> for AppError {
    fn from(_: AmountOverflow) -> Self {
        AppError::validation("items", "Amounts are out of range", "Los montos están fuera de rango")
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code().to_string();
        let (status, message_en, message_es, field) = match &self {
            AppError::Validation { field, message, message_es } => (
                StatusCode::BAD_REQUEST,
                message.clone(),
                message_es.clone(),
                Some(field.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                format!("Datos inválidos: {}", msg),
                None,
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
                format!("No se encontró {}", resource),
                None,
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                msg.clone(),
                format!("No se puede cambiar el estado: {}", msg),
                None,
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                msg.clone(),
                format!("Stock insuficiente: {}", msg),
                None,
            ),
            AppError::Proration(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                err.to_string(),
                match err {
                    ProrationError::EmptyItems => {
                        "Debe agregar artículos antes de prorratear costos".to_string()
                    }
                    ProrationError::ZeroSubtotal => {
                        "No se pueden prorratear costos con subtotal cero".to_string()
                    }
                    ProrationError::InvalidQuantity { line, .. } => {
                        format!("La línea {} tiene una cantidad inválida", line)
                    }
                    ProrationError::Overflow => {
                        "Los montos están fuera de rango para prorratear".to_string()
                    }
                },
                Some("items".to_string()),
            ),
            AppError::Transaction(_) | AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A storage error occurred; no changes were saved".to_string(),
                "Error de almacenamiento; no se guardaron cambios".to_string(),
                None,
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Configuration error: {}", msg),
                format!("Error de configuración: {}", msg),
                None,
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "Error interno del servidor".to_string(),
                None,
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred".to_string(),
                "Error interno del servidor".to_string(),
                None,
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        let body = ErrorResponse {
            error: ErrorDetail {
                code,
                message_en,
                message_es,
                field,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for services and handlers
pub type AppResult<T> = Result<T, AppError>;
