use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::DeriveActiveEnum;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::DomainError;
use crate::models::{task, task_assignment, task_assignment::AssignmentStatus};

/// Represents the status of a submission throughout its lifecycle.
#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "submission_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubmissionStatus {
    /// Handed in, awaiting grading.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// Score and feedback recorded.
    #[sea_orm(string_value = "graded")]
    Graded,
    /// Sent back for revision; editable again.
    #[sea_orm(string_value = "returned")]
    Returned,
    /// Handed in (or amended) after the deadline.
    #[sea_orm(string_value = "late")]
    Late,
    /// Deadline passed with nothing handed in.
    #[sea_orm(string_value = "missing")]
    Missing,
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::Submitted
    }
}

/// A student's deliverable for a task.
///
/// At most one row per (user, task). Editable until closed; `score` and
/// `graded_at` are always set and cleared together.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,

    pub content: Option<String>,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub grader_id: Option<i64>,

    pub status: SubmissionStatus,

    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub graded_at: Option<DateTime<Utc>>,
    /// Externally-assigned close signal (assignment completion, archival).
    pub completed_at: Option<DateTime<Utc>>,
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

    #[sea_orm(has_many = "super::submission_file::Entity")]
    Files,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::submission_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Per-task outcome of a deadline sweep.
#[derive(Debug, Default, Serialize)]
pub struct SweepOutcome {
    pub late: u64,
    pub missing: u64,
}

impl Model {
    /// The one edit/delete gate. A submission is closed once it has been
    /// graded (status and `graded_at` move together) or once an external
    /// completion signal stamped it.
    pub fn is_closed(&self) -> bool {
        self.status == SubmissionStatus::Graded
            || self.graded_at.is_some()
            || self.completed_at.is_some()
    }

    /// First hand-in for (user, task). Refused when any row already exists;
    /// re-submission goes through [`Model::update_content`] instead.
    pub async fn submit(
        db: &DbConn,
        task_id: i64,
        user_id: i64,
        content: Option<&str>,
    ) -> Result<Model, DomainError> {
        task::Entity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Task"))?;

        if Self::find_by_task_and_user(db, task_id, user_id)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(
                "A submission for this task already exists; update it instead".to_owned(),
            ));
        }

        let now = Utc::now();
        let active_model = ActiveModel {
            task_id: Set(task_id),
            user_id: Set(user_id),
            content: Set(content.map(str::to_owned)),
            status: Set(SubmissionStatus::Submitted),
            submitted_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(active_model.insert(db).await?)
    }

    /// Re-submission while the record is open. Late work arriving on a
    /// missing placeholder flips it to late; file attachment is handled by
    /// the caller and is additive.
    pub async fn update_content(
        db: &DbConn,
        submission_id: i64,
        content: Option<&str>,
    ) -> Result<Model, DomainError> {
        let model = Entity::find_by_id(submission_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Submission"))?;

        if model.is_closed() {
            return Err(DomainError::InvalidState(
                "Submission is closed and can no longer be edited".to_owned(),
            ));
        }

        let was_missing = model.status == SubmissionStatus::Missing;

        let mut active_model: ActiveModel = model.into();
        if let Some(content) = content {
            active_model.content = Set(Some(content.to_owned()));
        }
        if was_missing {
            active_model.status = Set(SubmissionStatus::Late);
        }
        active_model.updated_at = Set(Utc::now());
        Ok(active_model.update(db).await?)
    }

    /// Deletes the submission while it is still open. Attached file rows go
    /// with it (FK cascade).
    pub async fn remove(db: &DbConn, submission_id: i64) -> Result<(), DomainError> {
        let model = Entity::find_by_id(submission_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Submission"))?;

        if model.is_closed() {
            return Err(DomainError::InvalidState(
                "Submission is closed and can no longer be deleted".to_owned(),
            ));
        }

        model.delete(db).await?;
        Ok(())
    }

    /// Records a grade. Valid from any prior status, and re-invoking
    /// overwrites the previous grade wholesale.
    pub async fn grade(
        db: &DbConn,
        submission_id: i64,
        grader_id: i64,
        score: i64,
        feedback: Option<&str>,
    ) -> Result<Model, DomainError> {
        let model = Entity::find_by_id(submission_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Submission"))?;

        let task = task::Entity::find_by_id(model.task_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Task"))?;

        let max_points = task.effective_max_points();
        if score < 0 || score > max_points {
            return Err(DomainError::Validation(format!(
                "Score must be between 0 and {max_points}"
            )));
        }

        let now = Utc::now();
        let mut active_model: ActiveModel = model.into();
        active_model.score = Set(Some(score));
        active_model.feedback = Set(feedback.map(str::to_owned));
        active_model.grader_id = Set(Some(grader_id));
        active_model.graded_at = Set(Some(now));
        active_model.status = Set(SubmissionStatus::Graded);
        active_model.updated_at = Set(now);
        Ok(active_model.update(db).await?)
    }

    /// Reopens a graded submission for revision. Score, grader and
    /// `graded_at` are cleared together so the both-set-or-both-unset
    /// invariant holds; feedback stays visible to the student.
    pub async fn return_for_revision(
        db: &DbConn,
        submission_id: i64,
    ) -> Result<Model, DomainError> {
        let model = Entity::find_by_id(submission_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Submission"))?;

        if model.status != SubmissionStatus::Graded {
            return Err(DomainError::InvalidState(format!(
                "Only graded submissions can be returned; current status is '{}'",
                model.status
            )));
        }

        let mut active_model: ActiveModel = model.into();
        active_model.score = Set(None);
        active_model.grader_id = Set(None);
        active_model.graded_at = Set(None);
        active_model.completed_at = Set(None);
        active_model.status = Set(SubmissionStatus::Returned);
        active_model.updated_at = Set(Utc::now());
        Ok(active_model.update(db).await?)
    }

    /// Deadline sweep for one task: overdue handed-in work goes late, and a
    /// missing placeholder row is created for every overdue assignment with
    /// nothing handed in. Placeholders stay open so late work still arrives
    /// through [`Model::update_content`].
    pub async fn sweep_overdue(
        db: &DbConn,
        task_id: i64,
        now: DateTime<Utc>,
    ) -> Result<SweepOutcome, DomainError> {
        let task = task::Entity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound("Task"))?;

        let mut outcome = SweepOutcome::default();

        for assignment in task_assignment::Model::find_all_for_task(db, task_id).await? {
            if assignment.status == AssignmentStatus::Cancelled {
                continue;
            }
            let deadline = assignment.submission_deadline.or(task.due_date);
            let overdue = matches!(deadline, Some(deadline) if deadline < now);
            if !overdue {
                continue;
            }

            match Self::find_by_task_and_user(db, task_id, assignment.user_id).await? {
                Some(submission) if submission.status == SubmissionStatus::Submitted => {
                    let mut active_model: ActiveModel = submission.into();
                    active_model.status = Set(SubmissionStatus::Late);
                    active_model.updated_at = Set(now);
                    active_model.update(db).await?;
                    outcome.late += 1;
                }
                Some(_) => {}
                None => {
                    let active_model = ActiveModel {
                        task_id: Set(task_id),
                        user_id: Set(assignment.user_id),
                        status: Set(SubmissionStatus::Missing),
                        submitted_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    active_model.insert(db).await?;
                    outcome.missing += 1;
                }
            }
        }

        tracing::debug!(
            task_id,
            late = outcome.late,
            missing = outcome.missing,
            "deadline sweep finished"
        );
        Ok(outcome)
    }

    /// Stamps the external completion signal, closing the submission for
    /// edits. A no-op when no submission exists or it is already stamped.
    pub async fn mark_completed_if_exists(
        db: &DbConn,
        task_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        if let Some(model) = Self::find_by_task_and_user(db, task_id, user_id).await? {
            if model.completed_at.is_none() {
                let mut active_model: ActiveModel = model.into();
                active_model.completed_at = Set(Some(now));
                active_model.updated_at = Set(now);
                active_model.update(db).await?;
            }
        }
        Ok(())
    }

    pub async fn find_by_task_and_user(
        db: &DbConn,
        task_id: i64,
        user_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::TaskId.eq(task_id))
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    pub async fn find_all_for_task(db: &DbConn, task_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TaskId.eq(task_id))
            .all(db)
            .await
    }
}
