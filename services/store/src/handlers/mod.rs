pub mod admin;
pub mod auth;
pub mod category;
pub mod customer;
pub mod order;
pub mod product;

use std::sync::LazyLock;

use axum::Json;
use axum::extract::{FromRequest, Multipart, Request};
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::domain::types::UploadedFile;
use crate::error::StoreError;

/// Indian mobile number: ten digits starting with 6-9.
pub(crate) static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[6-9]\d{9}$").expect("valid mobile pattern")
});

/// GSTIN, case-insensitive.
pub(crate) static GST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$")
        .expect("valid gst pattern")
});

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub(crate) fn mobile_numbers(numbers: &[String]) -> Result<(), ValidationError> {
    if numbers.iter().all(|n| MOBILE_RE.is_match(n)) {
        Ok(())
    } else {
        Err(ValidationError::new("mobile")
            .with_message("Each additional phone number must be a valid 10-digit mobile number".into()))
    }
}

/// `{message}` body used by endpoints without a richer result.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// JSON body that is deserialized and then checked with `validator`.
///
/// Malformed JSON and failed rules both reject with the structured 400 body.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = StoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| StoreError::InvalidRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Multipart form split into one JSON part and any number of file parts.
#[derive(Default)]
pub struct MultipartForm {
    pub json: Option<String>,
    pub files: Vec<UploadedFile>,
}

/// Collect the part named `json_part` as text and every `file_part` as a file.
/// Other parts are ignored.
pub async fn read_multipart(
    mut multipart: Multipart,
    json_part: &str,
    file_part: &str,
) -> Result<MultipartForm, StoreError> {
    let mut form = MultipartForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StoreError::InvalidRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == json_part {
            let text = field
                .text()
                .await
                .map_err(|e| StoreError::InvalidRequest(e.body_text()))?;
            form.json = Some(text);
        } else if name == file_part {
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| StoreError::InvalidRequest(e.body_text()))?;
            form.files.push(UploadedFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        }
    }
    Ok(form)
}
