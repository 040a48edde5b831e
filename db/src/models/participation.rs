use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::DeriveActiveEnum;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};

use crate::error::DomainError;
use crate::models::{activity, registration, registration::RegistrationStatus};

/// An append-only event record of a student's actual engagement with an
/// activity. A registration can accumulate several of these (check-in,
/// check-out, completion); none of them mutate the registration itself.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "participations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub activity_id: i64,
    pub user_id: i64,

    pub participation_type: ParticipationType,
    pub points_earned: Option<i64>,
    pub notes: Option<String>,

    pub taken_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "participation_type")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ParticipationType {
    #[sea_orm(string_value = "registered")]
    Registered,

    #[sea_orm(string_value = "checked_in")]
    CheckedIn,

    #[sea_orm(string_value = "checked_out")]
    CheckedOut,

    #[sea_orm(string_value = "attended")]
    Attended,

    #[sea_orm(string_value = "completed")]
    Completed,
}

impl ParticipationType {
    /// Event kinds that count as having shown up for the report split.
    fn counts_as_attended(&self) -> bool {
        matches!(
            self,
            ParticipationType::CheckedIn
                | ParticipationType::Attended
                | ParticipationType::Completed
        )
    }
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
    /// Appends a participation event for the caller.
    ///
    /// Requires an approved registration and the activity window to contain
    /// `now`. Never touches the registration row.
    pub async fn record(
        db: &DbConn,
        activity_id: i64,
        user_id: i64,
        participation_type: ParticipationType,
        points_earned: Option<i64>,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Model, DomainError> {
        let activity = activity::Entity::find_by_id(activity_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Activity"))?;

        match registration::Model::find_by_user_and_activity(db, user_id, activity_id).await? {
            Some(reg) if reg.status == RegistrationStatus::Approved => {}
            _ => return Err(DomainError::NotApproved),
        }

        if !activity.is_ongoing(now) {
            return Err(DomainError::WindowClosed);
        }

        let active_model = ActiveModel {
            activity_id: Set(activity_id),
            user_id: Set(user_id),
            participation_type: Set(participation_type),
            points_earned: Set(points_earned),
            notes: Set(notes.map(str::to_owned)),
            taken_at: Set(now),
            ..Default::default()
        };

        Ok(active_model.insert(db).await?)
    }

    /// Check-in via the registration's opaque ticket code.
    ///
    /// Duplicate check-ins short-circuit before any further validation, so a
    /// second scan of the same code reports "already recorded" rather than a
    /// window or approval failure.
    pub async fn check_in_by_code(
        db: &DbConn,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Model, DomainError> {
        let reg = registration::Model::find_by_code(db, code)
            .await?
            .ok_or(DomainError::NotFound("Check-in code"))?;

        if Entity::find()
            .filter(Column::ActivityId.eq(reg.activity_id))
            .filter(Column::UserId.eq(reg.user_id))
            .filter(Column::ParticipationType.eq(ParticipationType::CheckedIn))
            .one(db)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyCheckedIn);
        }

        if reg.status != RegistrationStatus::Approved {
            return Err(DomainError::NotApproved);
        }

        let activity = activity::Entity::find_by_id(reg.activity_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Activity"))?;

        if !activity.is_ongoing(now) {
            return Err(DomainError::WindowClosed);
        }

        let active_model = ActiveModel {
            activity_id: Set(reg.activity_id),
            user_id: Set(reg.user_id),
            participation_type: Set(ParticipationType::CheckedIn),
            points_earned: Set(None),
            notes: Set(None),
            taken_at: Set(now),
            ..Default::default()
        };

        Ok(active_model.insert(db).await?)
    }

    /// Splits the activity's approved registrations into attended and
    /// not-attended user id lists, derived from the event stream.
    pub async fn report_for_activity(
        db: &DbConn,
        activity_id: i64,
    ) -> Result<(Vec<i64>, Vec<i64>), DbErr> {
        let approved =
            registration::Model::find_approved_for_activity(db, activity_id).await?;

        let present: HashSet<i64> = Entity::find()
            .filter(Column::ActivityId.eq(activity_id))
            .all(db)
            .await?
            .into_iter()
            .filter(|p| p.participation_type.counts_as_attended())
            .map(|p| p.user_id)
            .collect();

        let (attended, not_attended) = approved
            .into_iter()
            .map(|r| r.user_id)
            .partition(|user_id| present.contains(user_id));

        Ok((attended, not_attended))
    }
}
