use chrono::{Duration, Utc};

use akeshya_auth_types::token::validate_access_token;
use akeshya_domain::user::{Role, UserStatus};
use akeshya_store::error::StoreError;
use akeshya_store::usecase::auth::{
    MOBILE_OTP_PLACEHOLDER, SigninInput, SigninOutcome, SigninUseCase, SignupInput,
    SignupUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

use crate::helpers::{InMemoryUsers, RecordingMailer, TEST_JWT_SECRET, customer};

fn signup_input(contact_number: &str, email: Option<&str>) -> SignupInput {
    SignupInput {
        contact_number: contact_number.into(),
        password: "secret1".into(),
        email: email.map(Into::into),
        company_name: "Lakshmi Jewellers".into(),
        branch_name: "Charminar".into(),
        gst_number: Some("36aabcu9603r1zm".into()),
        shipping_address: "Pathergatti, Hyderabad".into(),
        contact_person_name: Some("  ".into()),
        additional_phone_numbers: vec!["9000000002".into()],
    }
}

fn signin(
    users: &InMemoryUsers,
    mailer: &RecordingMailer,
) -> SigninUseCase<InMemoryUsers, RecordingMailer> {
    SigninUseCase {
        users: users.clone(),
        mailer: mailer.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        jwt_ttl_secs: 3600,
    }
}

fn verify(users: &InMemoryUsers) -> VerifyOtpUseCase<InMemoryUsers> {
    VerifyOtpUseCase {
        users: users.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        jwt_ttl_secs: 3600,
    }
}

fn password_login(email: &str, password: &str) -> SigninInput {
    SigninInput {
        email: Some(email.into()),
        password: Some(password.into()),
        contact_number: None,
    }
}

// ── Signup ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_disabled_pending_customer() {
    let users = InMemoryUsers::default();
    let uc = SignupUseCase {
        users: users.clone(),
    };

    let user = uc
        .execute(signup_input("9876543210", Some("owner@lakshmi.in")))
        .await
        .unwrap();

    assert_eq!(user.status, UserStatus::Pending);
    assert!(!user.enabled);
    assert_eq!(user.roles, vec![Role::User]);
    assert_eq!(user.gst_number.as_deref(), Some("36AABCU9603R1ZM"));
    assert!(user.contact_person_name.is_none());
    assert_ne!(user.password_hash, "secret1");
    assert_eq!(users.get(user.id).unwrap().additional_phone_numbers.len(), 1);
}

#[tokio::test]
async fn should_reject_duplicate_contact_number_and_email() {
    let existing = customer("9876543210", Some("owner@lakshmi.in"));
    let users = InMemoryUsers::new(vec![existing]);
    let uc = SignupUseCase {
        users: users.clone(),
    };

    let by_number = uc.execute(signup_input("9876543210", None)).await;
    assert!(matches!(by_number, Err(StoreError::ContactNumberTaken)));

    let by_email = uc
        .execute(signup_input("9123456780", Some("owner@lakshmi.in")))
        .await;
    assert!(matches!(by_email, Err(StoreError::EmailTaken)));
    assert_eq!(users.users.lock().unwrap().len(), 1);
}

// ── Password sign-in ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_token_for_approved_customer() {
    let user = customer("9876543210", Some("buyer@sri-gems.in"));
    let users = InMemoryUsers::new(vec![user.clone()]);

    let outcome = signin(&users, &RecordingMailer::default())
        .execute(password_login("buyer@sri-gems.in", "secret1"))
        .await
        .unwrap();

    let SigninOutcome::Token(issued) = outcome else {
        panic!("expected token");
    };
    assert_eq!(issued.user.id, user.id);
    let info = validate_access_token(&issued.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, user.id);
    assert_eq!(info.roles, vec![Role::User]);
}

#[tokio::test]
async fn should_reject_wrong_password_and_unknown_email() {
    let users = InMemoryUsers::new(vec![customer("9876543210", Some("buyer@sri-gems.in"))]);
    let uc = signin(&users, &RecordingMailer::default());

    let wrong = uc
        .execute(password_login("buyer@sri-gems.in", "guess"))
        .await;
    assert!(matches!(wrong, Err(StoreError::InvalidCredentials)));

    let unknown = uc.execute(password_login("nobody@x.in", "secret1")).await;
    assert!(matches!(unknown, Err(StoreError::UserNotFound)));
}

#[tokio::test]
async fn should_block_pending_account() {
    let mut user = customer("9876543210", Some("buyer@sri-gems.in"));
    user.status = UserStatus::Pending;
    user.enabled = false;
    let users = InMemoryUsers::new(vec![user]);

    let result = signin(&users, &RecordingMailer::default())
        .execute(password_login("buyer@sri-gems.in", "secret1"))
        .await;

    assert!(matches!(result, Err(StoreError::AccountPendingApproval)));
}

#[tokio::test]
async fn should_answer_contact_number_login_with_placeholder() {
    let users = InMemoryUsers::default();
    let outcome = signin(&users, &RecordingMailer::default())
        .execute(SigninInput {
            email: None,
            password: None,
            contact_number: Some("9876543210".into()),
        })
        .await
        .unwrap();

    assert!(matches!(outcome, SigninOutcome::Message(ref m) if m == MOBILE_OTP_PLACEHOLDER));
}

#[tokio::test]
async fn should_reject_empty_login_request() {
    let result = signin(&InMemoryUsers::default(), &RecordingMailer::default())
        .execute(SigninInput {
            email: None,
            password: Some("secret1".into()),
            contact_number: None,
        })
        .await;
    assert!(matches!(result, Err(StoreError::InvalidLoginRequest)));
}

// ── OTP ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_mail_otp_and_exchange_it_for_token() {
    let user = customer("9876543210", Some("buyer@sri-gems.in"));
    let users = InMemoryUsers::new(vec![user.clone()]);
    let mailer = RecordingMailer::default();

    let outcome = signin(&users, &mailer)
        .execute(SigninInput {
            email: Some("buyer@sri-gems.in".into()),
            password: None,
            contact_number: None,
        })
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        SigninOutcome::Message(ref m) if m == "HTML mail sent successfully to buyer@sri-gems.in"
    ));

    let stored = users.get(user.id).unwrap();
    let otp = stored.otp.expect("otp stored");
    assert!(stored.otp_expires_at.unwrap() > Utc::now());
    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains(&otp.to_string()));

    let issued = verify(&users)
        .execute(VerifyOtpInput {
            email: Some("buyer@sri-gems.in".into()),
            contact_number: None,
            otp,
        })
        .await
        .unwrap();
    assert_eq!(issued.user.id, user.id);
    assert!(users.get(user.id).unwrap().otp.is_none());
}

#[tokio::test]
async fn should_check_otp_presence_then_match_then_expiry() {
    let mut user = customer("9876543210", Some("buyer@sri-gems.in"));
    let users = InMemoryUsers::new(vec![user.clone()]);
    let input = |otp| VerifyOtpInput {
        email: None,
        contact_number: Some("9876543210".into()),
        otp,
    };

    let missing = verify(&users).execute(input(123_456)).await;
    assert!(matches!(missing, Err(StoreError::OtpNotGenerated)));

    user.otp = Some(654_321);
    user.otp_expires_at = Some(Utc::now() - Duration::minutes(1));
    *users.users.lock().unwrap() = vec![user];

    let wrong = verify(&users).execute(input(123_456)).await;
    assert!(matches!(wrong, Err(StoreError::InvalidOtp)));

    let expired = verify(&users).execute(input(654_321)).await;
    assert!(matches!(expired, Err(StoreError::OtpExpired)));
}
