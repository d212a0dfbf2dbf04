use akeshya_domain::user::UserStatus;
use akeshya_store::error::StoreError;
use akeshya_store::usecase::account::{
    DeleteCustomerUseCase, GetCustomerUseCase, ListCustomersUseCase, UpdateCustomerStatusUseCase,
};
use akeshya_store::usecase::customer::{
    DeleteProfileUseCase, GetCustomerByIdUseCase, ListNonAdminUsersUseCase, UpdateProfileInput,
    UpdateProfileUseCase,
};

use crate::helpers::{InMemoryUsers, admin_user, customer, identity_of};

fn pending(contact_number: &str) -> akeshya_store::domain::types::User {
    let mut user = customer(contact_number, None);
    user.status = UserStatus::Pending;
    user.enabled = false;
    user
}

// ── Status workflow ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_enable_on_approval_and_disable_on_rejection() {
    let admin = admin_user();
    let applicant = pending("9876543210");
    let users = InMemoryUsers::new(vec![admin.clone(), applicant.clone()]);
    let uc = UpdateCustomerStatusUseCase {
        users: users.clone(),
    };

    let approved = uc
        .execute(&identity_of(&admin), applicant.id, UserStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.previous_status, UserStatus::Pending);
    assert_eq!(approved.new_status, UserStatus::Approved);
    assert!(approved.enabled);
    assert!(users.get(applicant.id).unwrap().enabled);

    let rejected = uc
        .execute(&identity_of(&admin), applicant.id, UserStatus::Rejected)
        .await
        .unwrap();
    assert!(!rejected.enabled);
    assert_eq!(users.get(applicant.id).unwrap().status, UserStatus::Rejected);
}

#[tokio::test]
async fn should_keep_enabled_flag_when_moving_back_to_pending() {
    let admin = admin_user();
    let member = customer("9876543210", None);
    let users = InMemoryUsers::new(vec![admin.clone(), member.clone()]);

    let change = UpdateCustomerStatusUseCase {
        users: users.clone(),
    }
    .execute(&identity_of(&admin), member.id, UserStatus::Pending)
    .await
    .unwrap();

    assert_eq!(change.previous_status, UserStatus::Approved);
    assert!(change.enabled);
}

#[tokio::test]
async fn should_reject_unchanged_status() {
    let admin = admin_user();
    let applicant = pending("9876543210");
    let users = InMemoryUsers::new(vec![admin.clone(), applicant.clone()]);

    let result = UpdateCustomerStatusUseCase { users }
        .execute(&identity_of(&admin), applicant.id, UserStatus::Pending)
        .await;

    assert!(matches!(
        result,
        Err(StoreError::CustomerStatusUnchanged(UserStatus::Pending))
    ));
}

#[tokio::test]
async fn should_require_admin_for_customer_administration() {
    let member = customer("9876543210", None);
    let users = InMemoryUsers::new(vec![member.clone()]);
    let caller = identity_of(&member);

    let status = UpdateCustomerStatusUseCase {
        users: users.clone(),
    }
    .execute(&caller, member.id, UserStatus::Approved)
    .await;
    assert!(matches!(status, Err(StoreError::Forbidden)));

    let list = ListCustomersUseCase {
        users: users.clone(),
    }
    .execute(&caller)
    .await;
    assert!(matches!(list, Err(StoreError::Forbidden)));
}

// ── Admin delete / get ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_guard_customer_deletion() {
    let admin = admin_user();
    let buyer = customer("9876543210", None);
    let idle = customer("9123456780", None);
    let users = InMemoryUsers::new(vec![admin.clone(), buyer.clone(), idle.clone()]);
    users.mark_has_orders(buyer.id);
    let uc = DeleteCustomerUseCase {
        users: users.clone(),
    };
    let caller = identity_of(&admin);

    let own = uc.execute(&caller, admin.id).await;
    assert!(matches!(own, Err(StoreError::SelfDeletionNotAllowed)));

    let with_orders = uc.execute(&caller, buyer.id).await;
    assert!(matches!(with_orders, Err(StoreError::CustomerHasOrders)));

    uc.execute(&caller, idle.id).await.unwrap();
    assert!(users.get(idle.id).is_none());

    let again = uc.execute(&caller, idle.id).await;
    assert!(matches!(again, Err(StoreError::CustomerNotFound)));
}

#[tokio::test]
async fn should_list_and_fetch_every_account_for_admin() {
    let admin = admin_user();
    let member = customer("9876543210", None);
    let users = InMemoryUsers::new(vec![admin.clone(), member.clone()]);

    let all = ListCustomersUseCase {
        users: users.clone(),
    }
    .execute(&identity_of(&admin))
    .await
    .unwrap();
    assert_eq!(all.len(), 2);

    let fetched = GetCustomerUseCase { users }
        .execute(&identity_of(&admin), member.id)
        .await
        .unwrap();
    assert_eq!(fetched.contact_number, "9876543210");
}

// ── Self-service ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_apply_only_provided_profile_fields() {
    let member = customer("9876543210", Some("buyer@sri-gems.in"));
    let users = InMemoryUsers::new(vec![member.clone()]);

    let updated = UpdateProfileUseCase {
        users: users.clone(),
    }
    .execute(
        &identity_of(&member),
        UpdateProfileInput {
            branch_name: Some("Secunderabad".into()),
            gst_number: Some("36aabcu9603r1zm".into()),
            company_name: Some("   ".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.branch_name, "Secunderabad");
    assert_eq!(updated.company_name, member.company_name);
    assert_eq!(updated.gst_number.as_deref(), Some("36AABCU9603R1ZM"));
    assert_eq!(updated.email, member.email);
    assert_eq!(users.get(member.id).unwrap().branch_name, "Secunderabad");
}

#[tokio::test]
async fn should_refuse_email_owned_by_another_customer() {
    let member = customer("9876543210", Some("buyer@sri-gems.in"));
    let other = customer("9123456780", Some("taken@sri-gems.in"));
    let users = InMemoryUsers::new(vec![member.clone(), other]);

    let result = UpdateProfileUseCase { users }
        .execute(
            &identity_of(&member),
            UpdateProfileInput {
                email: Some("taken@sri-gems.in".into()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(StoreError::EmailTakenByOther)));
}

#[tokio::test]
async fn should_keep_profile_of_customer_with_orders() {
    let member = customer("9876543210", None);
    let users = InMemoryUsers::new(vec![member.clone()]);
    users.mark_has_orders(member.id);

    let result = DeleteProfileUseCase {
        users: users.clone(),
    }
    .execute(&identity_of(&member))
    .await;

    assert!(matches!(result, Err(StoreError::CustomerHasOrders)));
    assert!(users.get(member.id).is_some());
}

#[tokio::test]
async fn should_hide_admin_accounts_from_customer_lookups() {
    let admin = admin_user();
    let member = customer("9876543210", None);
    let users = InMemoryUsers::new(vec![admin.clone(), member.clone()]);
    let caller = identity_of(&member);

    let listed = ListNonAdminUsersUseCase {
        users: users.clone(),
    }
    .execute(&caller)
    .await
    .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, member.id);

    let hidden = GetCustomerByIdUseCase { users }
        .execute(&caller, admin.id)
        .await;
    assert!(matches!(hidden, Err(StoreError::AdminProfileHidden)));
}
