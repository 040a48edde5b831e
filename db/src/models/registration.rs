use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::DeriveActiveEnum;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::activity;

/// A student's request to participate in an activity.
///
/// One row per (user, activity) for the lifetime of the pair: cancellation
/// and rejection are terminal statuses, not row removal.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub activity_id: i64,
    pub user_id: i64,

    pub status: RegistrationStatus,
    /// Free-text motivation supplied by the student at registration time.
    pub feedback: Option<String>,
    /// Opaque ticket code used for code/QR check-in.
    pub attendance_code: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "registration_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RegistrationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "rejected")]
    Rejected,

    #[sea_orm(string_value = "cancelled")]
    Cancelled,

    #[sea_orm(string_value = "attended")]
    Attended,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::activity::Entity",
        from = "Column::ActivityId",
        to = "super::activity::Column::Id"
    )]
    Activity,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Creates a pending registration for (user, activity).
    ///
    /// Any existing row blocks a new one: pending/approved rows are the
    /// at-most-one-active invariant, cancelled/rejected rows are terminal
    /// and re-registration is refused by design.
    pub async fn register(
        db: &DbConn,
        activity_id: i64,
        user_id: i64,
        feedback: Option<&str>,
    ) -> Result<Model, DomainError> {
        activity::Entity::find_by_id(activity_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Activity"))?;

        if let Some(existing) = Self::find_by_user_and_activity(db, user_id, activity_id).await? {
            return Err(DomainError::Conflict(format!(
                "A registration for this activity already exists with status '{}'",
                existing.status
            )));
        }

        let now = Utc::now();
        let active_model = ActiveModel {
            activity_id: Set(activity_id),
            user_id: Set(user_id),
            status: Set(RegistrationStatus::Pending),
            feedback: Set(feedback.map(str::to_owned)),
            attendance_code: Set(Uuid::new_v4().simple().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(active_model.insert(db).await?)
    }

    /// Cancels the caller's own registration. Only a pending registration
    /// may be cancelled; approved registrations are immutable from the
    /// student side and cancelled/rejected ones are already terminal.
    pub async fn cancel_by_activity(
        db: &DbConn,
        activity_id: i64,
        user_id: i64,
    ) -> Result<Model, DomainError> {
        let model = Self::find_by_user_and_activity(db, user_id, activity_id)
            .await?
            .ok_or(DomainError::NotFound("Registration"))?;

        if model.status != RegistrationStatus::Pending {
            return Err(DomainError::InvalidState(format!(
                "Cannot cancel a registration with status '{}'",
                model.status
            )));
        }

        let mut active_model: ActiveModel = model.into();
        active_model.status = Set(RegistrationStatus::Cancelled);
        active_model.updated_at = Set(Utc::now());
        Ok(active_model.update(db).await?)
    }

    /// Admin decision on a pending registration. The only reachable targets
    /// are approved and rejected; the only valid source is pending.
    pub async fn update_status(
        db: &DbConn,
        registration_id: i64,
        status: RegistrationStatus,
    ) -> Result<Model, DomainError> {
        if !matches!(
            status,
            RegistrationStatus::Approved | RegistrationStatus::Rejected
        ) {
            return Err(DomainError::Validation(format!(
                "Target status must be 'approved' or 'rejected', got '{status}'"
            )));
        }

        let model = Entity::find_by_id(registration_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Registration"))?;

        if model.status != RegistrationStatus::Pending {
            return Err(DomainError::InvalidState(format!(
                "Only pending registrations can be decided; current status is '{}'",
                model.status
            )));
        }

        let mut active_model: ActiveModel = model.into();
        active_model.status = Set(status);
        active_model.updated_at = Set(Utc::now());
        Ok(active_model.update(db).await?)
    }

    pub async fn find_by_user_and_activity(
        db: &DbConn,
        user_id: i64,
        activity_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ActivityId.eq(activity_id))
            .one(db)
            .await
    }

    pub async fn find_all_for_user(db: &DbConn, user_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .all(db)
            .await
    }

    pub async fn find_by_code(db: &DbConn, code: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::AttendanceCode.eq(code))
            .one(db)
            .await
    }

    pub async fn find_approved_for_activity(
        db: &DbConn,
        activity_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ActivityId.eq(activity_id))
            .filter(Column::Status.eq(RegistrationStatus::Approved))
            .all(db)
            .await
    }
}
