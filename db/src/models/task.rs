use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Grading bound applied when a task does not declare its own.
pub const DEFAULT_MAX_POINTS: i64 = 10;

/// A gradable piece of work assigned to students.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Upper grading bound; `None` falls back to [`DEFAULT_MAX_POINTS`].
    pub max_points: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::task_assignment::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::submission::Entity")]
    Submissions,
}

impl Related<super::task_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        title: &str,
        description: Option<&str>,
        max_points: Option<i64>,
        due_date: Option<DateTime<Utc>>,
        created_by: i64,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            title: Set(title.to_owned()),
            description: Set(description.map(str::to_owned)),
            max_points: Set(max_points),
            due_date: Set(due_date),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub fn effective_max_points(&self) -> i64 {
        self.max_points.unwrap_or(DEFAULT_MAX_POINTS)
    }
}
