use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::DeriveActiveEnum;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::DomainError;
use crate::models::{submission, task, user};

/// Binds a task to a student with a progress status that is tracked
/// independently of submission grading.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub task_id: i64,
    pub user_id: i64,

    pub status: AssignmentStatus,
    /// Overrides the task's due date for this student when set.
    pub submission_deadline: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "assignment_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AssignmentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "in_progress")]
    InProgress,

    #[sea_orm(string_value = "completed")]
    Completed,

    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task::Entity",
        from = "Column::TaskId",
        to = "super::task::Column::Id"
    )]
    Task,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Progress moves forward only; cancellation is terminal.
fn can_transition(from: &AssignmentStatus, to: &AssignmentStatus) -> bool {
    use AssignmentStatus::*;
    matches!(
        (from, to),
        (Pending, InProgress)
            | (Pending, Completed)
            | (Pending, Cancelled)
            | (InProgress, Completed)
            | (InProgress, Cancelled)
    )
}

impl Model {
    pub async fn assign(
        db: &DbConn,
        task_id: i64,
        user_id: i64,
        submission_deadline: Option<DateTime<Utc>>,
    ) -> Result<Model, DomainError> {
        task::Entity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Task"))?;
        user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("User"))?;

        if Self::find_by_user_and_task(db, user_id, task_id)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(
                "Task is already assigned to this student".to_owned(),
            ));
        }

        let now = Utc::now();
        let active_model = ActiveModel {
            task_id: Set(task_id),
            user_id: Set(user_id),
            status: Set(AssignmentStatus::Pending),
            submission_deadline: Set(submission_deadline),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(active_model.insert(db).await?)
    }

    /// Moves the assignment's progress status. Completing an assignment also
    /// stamps `completed_at` on the student's submission, if one exists,
    /// which closes it for further edits.
    pub async fn set_status(
        db: &DbConn,
        assignment_id: i64,
        status: AssignmentStatus,
        now: DateTime<Utc>,
    ) -> Result<Model, DomainError> {
        let model = Entity::find_by_id(assignment_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Task assignment"))?;

        if !can_transition(&model.status, &status) {
            return Err(DomainError::InvalidState(format!(
                "Cannot move assignment from '{}' to '{}'",
                model.status, status
            )));
        }

        let task_id = model.task_id;
        let user_id = model.user_id;
        let completing = status == AssignmentStatus::Completed;

        let mut active_model: ActiveModel = model.into();
        active_model.status = Set(status);
        active_model.updated_at = Set(now);
        let updated = active_model.update(db).await?;

        if completing {
            submission::Model::mark_completed_if_exists(db, task_id, user_id, now).await?;
        }

        Ok(updated)
    }

    pub async fn find_by_user_and_task(
        db: &DbConn,
        user_id: i64,
        task_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::TaskId.eq(task_id))
            .one(db)
            .await
    }

    pub async fn find_all_for_user(db: &DbConn, user_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .all(db)
            .await
    }

    pub async fn find_all_for_task(db: &DbConn, task_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TaskId.eq(task_id))
            .all(db)
            .await
    }
}
