use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use akeshya_auth_types::token::issue_access_token;
use akeshya_domain::user::{Role, UserStatus};

use crate::domain::repository::{EmailSender, UserRepository};
use crate::domain::types::User;
use crate::error::StoreError;
use crate::infra::email::render_otp_email;
use crate::infra::password::{hash_password, verify_password};

/// Minutes an emailed OTP stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

pub const OTP_EMAIL_SUBJECT: &str = "OTP Verification Code";

pub const MOBILE_OTP_PLACEHOLDER: &str = "feature coming soon...";

/// Six-digit code in `100000..=999999`.
pub fn generate_otp() -> i32 {
    rand::rng().random_range(100_000..1_000_000)
}

/// Signed access token together with the account it was issued for.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub user: User,
}

fn issue_for(user: User, secret: &str, ttl_secs: u64) -> Result<IssuedToken, StoreError> {
    let (token, _exp) = issue_access_token(user.id, &user.roles, secret, ttl_secs)
        .map_err(|e| anyhow::anyhow!("sign access token: {e}"))?;
    Ok(IssuedToken { token, user })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── Signup ───────────────────────────────────────────────────────────────────

pub struct SignupInput {
    pub contact_number: String,
    pub password: String,
    pub email: Option<String>,
    pub company_name: String,
    pub branch_name: String,
    pub gst_number: Option<String>,
    pub shipping_address: String,
    pub contact_person_name: Option<String>,
    pub additional_phone_numbers: Vec<String>,
}

pub struct SignupUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> SignupUseCase<U> {
    /// Register a disabled `PENDING` customer awaiting admin approval.
    pub async fn execute(&self, input: SignupInput) -> Result<User, StoreError> {
        if self
            .users
            .find_by_contact_number(&input.contact_number)
            .await?
            .is_some()
        {
            return Err(StoreError::ContactNumberTaken);
        }
        let email = non_blank(input.email);
        if let Some(ref email) = email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(StoreError::EmailTaken);
            }
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            contact_number: input.contact_number,
            password_hash: hash_password(&input.password)?,
            company_name: input.company_name,
            branch_name: input.branch_name,
            gst_number: non_blank(input.gst_number).map(|g| g.to_ascii_uppercase()),
            shipping_address: input.shipping_address,
            contact_person_name: non_blank(input.contact_person_name),
            email,
            additional_phone_numbers: input.additional_phone_numbers,
            roles: vec![Role::User],
            status: UserStatus::Pending,
            enabled: false,
            otp: None,
            otp_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(
            user_id = %user.id,
            contact_number = %user.contact_number,
            company = %user.company_name,
            "customer registered"
        );
        Ok(user)
    }
}

// ── Signin ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct SigninInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub contact_number: Option<String>,
}

#[derive(Debug)]
pub enum SigninOutcome {
    /// Password accepted.
    Token(IssuedToken),
    /// OTP dispatched, or a notice for an unsupported channel.
    Message(String),
}

pub struct SigninUseCase<U: UserRepository, M: EmailSender> {
    pub users: U,
    pub mailer: M,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
}

impl<U: UserRepository, M: EmailSender> SigninUseCase<U, M> {
    /// Dispatch on the populated fields: email + password, email alone (OTP by
    /// mail), or contact number alone.
    pub async fn execute(&self, input: SigninInput) -> Result<SigninOutcome, StoreError> {
        let email = non_blank(input.email);
        let contact_number = non_blank(input.contact_number);
        match (email, input.password) {
            (Some(email), Some(password)) => self.with_password(&email, &password).await,
            (Some(email), None) => self.send_otp(&email).await,
            (None, _) if contact_number.is_some() => {
                Ok(SigninOutcome::Message(MOBILE_OTP_PLACEHOLDER.to_owned()))
            }
            _ => Err(StoreError::InvalidLoginRequest),
        }
    }

    async fn with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SigninOutcome, StoreError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(StoreError::UserNotFound)?;
        if !verify_password(password, &user.password_hash) {
            return Err(StoreError::InvalidCredentials);
        }
        if !user.enabled {
            return Err(StoreError::AccountPendingApproval);
        }
        tracing::info!(user_id = %user.id, "password sign-in");
        issue_for(user, &self.jwt_secret, self.jwt_ttl_secs).map(SigninOutcome::Token)
    }

    async fn send_otp(&self, email: &str) -> Result<SigninOutcome, StoreError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(StoreError::UserNotFound)?;
        let otp = generate_otp();
        let report = self
            .mailer
            .send_html(email, OTP_EMAIL_SUBJECT, &render_otp_email(otp))
            .await;
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
        self.users.set_otp(user.id, Some(otp), Some(expires_at)).await?;
        tracing::info!(user_id = %user.id, "sign-in otp issued");
        Ok(SigninOutcome::Message(report))
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub otp: i32,
}

pub struct VerifyOtpUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
}

impl<U: UserRepository> VerifyOtpUseCase<U> {
    /// Checks run in order: code present, code matches, code not expired.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<IssuedToken, StoreError> {
        let user = if let Some(email) = non_blank(input.email) {
            self.users.find_by_email(&email).await?
        } else if let Some(number) = non_blank(input.contact_number) {
            self.users.find_by_contact_number(&number).await?
        } else {
            return Err(StoreError::InvalidRequest(
                "Email or contact number is required".into(),
            ));
        }
        .ok_or(StoreError::UserNotFound)?;

        let stored = user.otp.ok_or(StoreError::OtpNotGenerated)?;
        if stored != input.otp {
            return Err(StoreError::InvalidOtp);
        }
        if user.otp_expires_at.is_none_or(|at| at < Utc::now()) {
            return Err(StoreError::OtpExpired);
        }
        if !user.enabled {
            return Err(StoreError::AccountPendingApproval);
        }

        self.users.set_otp(user.id, None, None).await?;
        tracing::info!(user_id = %user.id, "otp sign-in");
        let user = User {
            otp: None,
            otp_expires_at: None,
            ..user
        };
        issue_for(user, &self.jwt_secret, self.jwt_ttl_secs)
    }
}
