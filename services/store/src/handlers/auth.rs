use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;
use validator::Validate;

use akeshya_domain::user::Role;

use crate::error::StoreError;
use crate::handlers::{
    GST_RE, MOBILE_RE, MessageResponse, ValidJson, mobile_numbers, not_blank,
};
use crate::state::AppState;
use crate::usecase::auth::{
    IssuedToken, SigninInput, SigninOutcome, SigninUseCase, SignupInput, SignupUseCase,
    VerifyOtpInput, VerifyOtpUseCase,
};

pub const SIGNUP_MESSAGE: &str = "User registered successfully, pending admin approval";

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(regex(
        path = *MOBILE_RE,
        message = "Contact number must be a valid 10-digit mobile number"
    ))]
    pub contact_number: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(email(message = "Email should be valid"))]
    pub email: Option<String>,
    #[validate(custom(function = "not_blank", message = "Company name is required"))]
    pub company_name: String,
    #[validate(custom(function = "not_blank", message = "Branch name is required"))]
    pub branch_name: String,
    #[validate(regex(path = *GST_RE, message = "Invalid GST number format"))]
    pub gst_number: Option<String>,
    #[validate(custom(function = "not_blank", message = "Shipping address is required"))]
    pub shipping_address: String,
    pub contact_person_name: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "mobile_numbers"))]
    pub additional_phone_numbers: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub contact_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub contact_number: Option<String>,
    #[serde(deserialize_with = "otp_code")]
    #[validate(range(min = 100_000, max = 999_999, message = "OTP must be 6 digits"))]
    pub otp: i32,
}

/// Clients send the code either as a JSON number or as a digit string.
fn otp_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Num(i32),
        Str(String),
    }

    match Code::deserialize(deserializer)? {
        Code::Num(n) => Ok(n),
        Code::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("OTP must be numeric, got {s:?}"))),
    }
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub id: Uuid,
    pub contact_number: String,
    pub email: Option<String>,
    pub company_name: String,
    pub branch_name: String,
    pub roles: Vec<Role>,
}

impl From<IssuedToken> for JwtResponse {
    fn from(issued: IssuedToken) -> Self {
        let user = issued.user;
        Self {
            token: issued.token,
            token_type: "Bearer",
            id: user.id,
            contact_number: user.contact_number,
            email: user.email,
            company_name: user.company_name,
            branch_name: user.branch_name,
            roles: user.roles,
        }
    }
}

// ── POST /api/auth/signup ────────────────────────────────────────────────────

pub async fn signup(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<SignupRequest>,
) -> Result<impl IntoResponse, StoreError> {
    let uc = SignupUseCase {
        users: state.user_repo(),
    };
    uc.execute(SignupInput {
        contact_number: body.contact_number,
        password: body.password,
        email: body.email,
        company_name: body.company_name.trim().to_owned(),
        branch_name: body.branch_name.trim().to_owned(),
        gst_number: body.gst_number,
        shipping_address: body.shipping_address.trim().to_owned(),
        contact_person_name: body.contact_person_name,
        additional_phone_numbers: body.additional_phone_numbers,
    })
    .await?;
    Ok((StatusCode::CREATED, MessageResponse::new(SIGNUP_MESSAGE)))
}

// ── POST /api/auth/signin ────────────────────────────────────────────────────

pub async fn signin(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<SigninRequest>,
) -> Result<axum::response::Response, StoreError> {
    let uc = SigninUseCase {
        users: state.user_repo(),
        mailer: state.mailer.clone(),
        jwt_secret: state.jwt_secret.clone(),
        jwt_ttl_secs: state.jwt_ttl_secs,
    };
    let outcome = uc
        .execute(SigninInput {
            email: body.email,
            password: body.password,
            contact_number: body.contact_number,
        })
        .await?;
    Ok(match outcome {
        SigninOutcome::Token(issued) => Json(JwtResponse::from(issued)).into_response(),
        SigninOutcome::Message(message) => MessageResponse::new(message).into_response(),
    })
}

// ── POST /api/auth/verify-otp ────────────────────────────────────────────────

pub async fn verify_otp(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<VerifyOtpRequest>,
) -> Result<Json<JwtResponse>, StoreError> {
    let uc = VerifyOtpUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
        jwt_ttl_secs: state.jwt_ttl_secs,
    };
    let issued = uc
        .execute(VerifyOtpInput {
            email: body.email,
            contact_number: body.contact_number,
            otp: body.otp,
        })
        .await?;
    Ok(Json(issued.into()))
}
