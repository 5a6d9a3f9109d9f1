//! # API Error Type
//!
//! Unified error type for shop operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tillbook                               │
//! │                                                                         │
//! │  Shop::create_expense(form)                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Form invalid? ───── ValidationErrors ──────────┐                       │
//! │         │                                       │                       │
//! │         ▼                                       ▼                       │
//! │  Rule broken? ────── CoreError ─────────────► ApiError { code,          │
//! │         │                                       │        message,       │
//! │         ▼                                       │        fields }       │
//! │  Store failed? ───── DbError ───────────────────┘                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Success                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "description must be at least 5 characters",
//!   "fields": [{ "field": "description", "message": "description must be at least 5 characters" }]
//! }
//! ```

use serde::Serialize;
use tillbook_core::{CoreError, ValidationError, ValidationErrors};
use tillbook_db::DbError;

use crate::state::ConfigError;

/// Error returned from shop operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Per-field messages, for rendering next to form inputs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// One failing form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        FieldError {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule violated
    BusinessLogic,

    /// Not enough units on hand
    InsufficientStock,

    /// Payment could not be applied
    PaymentError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Message for `field`, if that field failed.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: err.to_string(),
            fields: vec![FieldError::from(&err)],
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errs: ValidationErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: errs.to_string(),
            fields: errs.iter().map(FieldError::from).collect(),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            err @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            err @ CoreError::SaleAlreadySettled { .. } => {
                ApiError::new(ErrorCode::PaymentError, err.to_string())
            }
            CoreError::AmountOutOfRange { field } => {
                let message = format!("{} is too large", field);
                ApiError {
                    code: ErrorCode::ValidationError,
                    message: message.clone(),
                    fields: vec![FieldError { field, message }],
                }
            }
            err @ CoreError::InconsistentSettlement { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            err @ (CoreError::CreditOnlyItems | CoreError::ItemIndexOutOfRange { .. }) => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::Validation(e) => ApiError::from(e),
            CoreError::InvalidForm(e) => ApiError::from(e),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Domain(e) => ApiError::from(e),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::CorruptRecord(e) => {
                tracing::error!("Stored record could not be decoded: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored data is corrupt")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            err @ DbError::IndexMismatch { .. } => {
                tracing::error!("{}", err);
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for shop operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tillbook_core::validation::validate_customer;
    use tillbook_core::NewCustomer;

    #[test]
    fn test_form_errors_carry_every_field() {
        let errs = validate_customer(&NewCustomer {
            name: " ".to_string(),
            phone: String::new(),
            notes: None,
        })
        .unwrap_err();

        let api = ApiError::from(errs);
        assert_eq!(api.code, ErrorCode::ValidationError);
        assert_eq!(api.fields.len(), 2);
        assert!(api.field("name").is_some());
        assert!(api.field("phone").is_some());
    }

    #[test]
    fn test_domain_errors_pass_through_db_error() {
        let err = DbError::Domain(CoreError::InsufficientStock {
            product: "Shape".to_string(),
            available: 2,
            requested: 5,
        });
        let api = ApiError::from(err);
        assert_eq!(api.code, ErrorCode::InsufficientStock);
        assert!(api.message.contains("only 2 units available"));
    }

    #[test]
    fn test_not_found() {
        let api = ApiError::from(DbError::not_found("Sale", "s-1"));
        assert_eq!(api.code, ErrorCode::NotFound);
        assert_eq!(api.message, "Sale not found: s-1");
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_value(ApiError::internal("boom")).unwrap();
        assert_eq!(json["code"], "INTERNAL");
        assert!(json.get("fields").is_none());
    }
}
