use sea_orm::entity::prelude::*;

/// Customer or admin account.
///
/// `status` holds `PENDING` / `APPROVED` / `REJECTED`. `otp` and `otp_expires_at`
/// are set together by email sign-in and cleared together on verification.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub contact_number: String,
    pub password_hash: String,
    pub company_name: String,
    pub branch_name: String,
    pub gst_number: Option<String>,
    pub shipping_address: String,
    pub contact_person_name: Option<String>,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub status: String,
    pub enabled: bool,
    pub otp: Option<i32>,
    pub otp_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_roles::Entity")]
    UserRoles,
    #[sea_orm(has_many = "super::user_phone_numbers::Entity")]
    UserPhoneNumbers,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::user_phone_numbers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPhoneNumbers.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_roles::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_roles::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
