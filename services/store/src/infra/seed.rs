use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};
use uuid::Uuid;

use akeshya_domain::user::{Role, UserStatus};
use akeshya_store_schema::roles;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::infra::db::DbUserRepository;
use crate::infra::password::hash_password;

pub const ADMIN_CONTACT_NUMBER: &str = "9999999999";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Insert any missing role rows.
pub async fn ensure_roles(db: &DatabaseConnection) -> anyhow::Result<()> {
    for role in Role::ALL {
        roles::Entity::insert(roles::ActiveModel {
            name: Set(role.as_str().to_owned()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(roles::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .with_context(|| format!("seed role {}", role.as_str()))?;
    }
    let count = roles::Entity::find()
        .filter(roles::Column::Name.is_in(Role::ALL.map(Role::as_str)))
        .all(db)
        .await
        .context("reload roles")?
        .len();
    tracing::info!(count, "roles ready");
    Ok(())
}

/// First-boot admin account, created only while the users table is empty.
pub fn default_admin() -> anyhow::Result<User> {
    let now = Utc::now();
    Ok(User {
        id: Uuid::now_v7(),
        contact_number: ADMIN_CONTACT_NUMBER.to_owned(),
        password_hash: hash_password(ADMIN_PASSWORD)?,
        company_name: "Akeshiya".to_owned(),
        branch_name: "Main Branch".to_owned(),
        gst_number: None,
        shipping_address: "Hyderabad".to_owned(),
        contact_person_name: None,
        email: None,
        additional_phone_numbers: Vec::new(),
        roles: vec![Role::Admin, Role::User],
        status: UserStatus::Approved,
        enabled: true,
        otp: None,
        otp_expires_at: None,
        created_at: now,
        updated_at: now,
    })
}

/// Seed roles and, on an empty database, the default admin.
pub async fn run(db: &DatabaseConnection) -> anyhow::Result<()> {
    ensure_roles(db).await?;

    let users = DbUserRepository { db: db.clone() };
    if users.count().await? > 0 {
        return Ok(());
    }
    let admin = default_admin()?;
    users.create(&admin).await?;
    tracing::warn!(
        contact_number = ADMIN_CONTACT_NUMBER,
        "default admin created; change its password"
    );
    Ok(())
}
