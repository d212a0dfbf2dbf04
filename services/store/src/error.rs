use axum::response::{IntoResponse, Response};
use validator::{ValidationErrors, ValidationErrorsKind};

use akeshya_core::error::{ErrorCategory, ErrorPayload, FieldError, INTERNAL_ERROR_MESSAGE};
use akeshya_domain::user::UserStatus;

/// Store service error variants. The `Display` text is the message sent to callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    // ── not found ──
    #[error("User not found")]
    UserNotFound,
    #[error("Customer not found")]
    CustomerNotFound,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Product not found: {0}")]
    ProductNotFound(i64),
    #[error("Category not found")]
    CategoryNotFound,
    #[error("Image not found")]
    ImageNotFound,

    // ── validation ──
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("Invalid login request")]
    InvalidLoginRequest,
    #[error("{0}")]
    InvalidRequest(String),

    // ── business rules ──
    #[error("Product not available: {0}")]
    ProductNotAvailable(String),
    #[error("Order already cancelled")]
    OrderAlreadyCancelled,
    #[error("Cannot cancel delivered order")]
    CannotCancelDelivered,
    #[error("Customer already has status: {0}")]
    CustomerStatusUnchanged(UserStatus),
    #[error("You cannot delete your own account")]
    SelfDeletionNotAllowed,
    #[error("Cannot delete customer with existing orders")]
    CustomerHasOrders,
    #[error("Contact number already registered")]
    ContactNumberTaken,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Email already taken by another customer")]
    EmailTakenByOther,
    #[error("Category already exists")]
    CategoryExists,
    #[error("Cannot delete category with existing products")]
    CategoryInUse,
    #[error("OTP not generated")]
    OtpNotGenerated,
    #[error("OTP expired")]
    OtpExpired,

    // ── authentication / authorization ──
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("Account pending approval")]
    AccountPendingApproval,
    #[error("Access denied")]
    Forbidden,
    #[error("Admin user details cannot be accessed through this endpoint")]
    AdminProfileHidden,

    /// Unique violation on `orders.order_number`; the caller retries with a fresh number.
    #[error("Order number already in use: {0}")]
    OrderNumberTaken(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UserNotFound
            | Self::CustomerNotFound
            | Self::OrderNotFound
            | Self::ProductNotFound(_)
            | Self::CategoryNotFound
            | Self::ImageNotFound => ErrorCategory::NotFound,
            Self::Validation(_) | Self::InvalidLoginRequest | Self::InvalidRequest(_) => {
                ErrorCategory::Validation
            }
            Self::ProductNotAvailable(_)
            | Self::OrderAlreadyCancelled
            | Self::CannotCancelDelivered
            | Self::CustomerStatusUnchanged(_)
            | Self::SelfDeletionNotAllowed
            | Self::CustomerHasOrders
            | Self::ContactNumberTaken
            | Self::EmailTaken
            | Self::EmailTakenByOther
            | Self::CategoryExists
            | Self::CategoryInUse
            | Self::OtpNotGenerated
            | Self::OtpExpired => ErrorCategory::Business,
            Self::InvalidCredentials | Self::InvalidOtp | Self::AccountPendingApproval => {
                ErrorCategory::Authentication
            }
            Self::Forbidden | Self::AdminProfileHidden => ErrorCategory::Forbidden,
            Self::OrderNumberTaken(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ProductNotAvailable(_) => "PRODUCT_NOT_AVAILABLE",
            Self::OrderAlreadyCancelled => "ORDER_ALREADY_CANCELLED",
            Self::CannotCancelDelivered => "ORDER_ALREADY_DELIVERED",
            Self::CustomerStatusUnchanged(_) => "STATUS_UNCHANGED",
            Self::SelfDeletionNotAllowed => "SELF_DELETION_NOT_ALLOWED",
            Self::CustomerHasOrders => "CUSTOMER_HAS_ORDERS",
            Self::ContactNumberTaken => "CONTACT_NUMBER_TAKEN",
            Self::EmailTaken | Self::EmailTakenByOther => "EMAIL_TAKEN",
            Self::CategoryExists => "CATEGORY_EXISTS",
            Self::CategoryInUse => "CATEGORY_IN_USE",
            Self::OtpNotGenerated => "OTP_NOT_GENERATED",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::AccountPendingApproval => "ACCOUNT_PENDING_APPROVAL",
            other => other.category().default_code(),
        }
    }

    /// Build a validation error for a single field.
    pub fn field(field: &str, message: &str, rejected: Option<serde_json::Value>) -> Self {
        Self::Validation(vec![FieldError {
            field: field.to_owned(),
            message: message.to_owned(),
            rejected_value: rejected,
        }])
    }
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_field_errors("", &errors, &mut fields);
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self::Validation(fields)
    }
}

fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (name, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            camel_case(name)
        } else {
            format!("{prefix}.{}", camel_case(name))
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    out.push(FieldError {
                        field: path.clone(),
                        message: e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value ({})", e.code)),
                        rejected_value: e.params.get("value").cloned(),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let category = self.category();
        let payload = match self {
            Self::Internal(ref e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
                ErrorPayload::new(category, INTERNAL_ERROR_MESSAGE)
            }
            Self::OrderNumberTaken(ref number) => {
                tracing::error!(order_number = %number, kind = "INTERNAL", "order number still taken");
                ErrorPayload::new(category, INTERNAL_ERROR_MESSAGE)
            }
            Self::Validation(fields) => ErrorPayload::new(category, "Validation failed")
                .with_validation_errors(fields),
            ref other => ErrorPayload::new(category, other.to_string()).with_code(other.code()),
        };
        payload.into_response()
    }
}
