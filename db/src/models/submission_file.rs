use chrono::{DateTime, Utc};
use common::config;
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::QueryOrder;
use sea_orm::entity::prelude::*;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::DomainError;

/// One stored attachment of a submission. Rows are append-only: updating a
/// submission adds files, it never replaces the ones already attached.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submission_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    /// The original filename uploaded by the user.
    pub filename: String,
    /// Relative file path from the storage root.
    pub path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submission::Entity",
        from = "Column::SubmissionId",
        to = "super::submission::Column::Id"
    )]
    Submission,
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Writes the bytes under the storage root and records the row. Disk
    /// names are uuid-prefixed so repeated uploads of the same filename
    /// never clobber each other.
    pub async fn attach(
        db: &DbConn,
        submission_id: i64,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Model, DomainError> {
        let safe_name = filename.replace(['/', '\\'], "_");
        let relative_path = format!(
            "submissions/{}/{}_{}",
            submission_id,
            Uuid::new_v4().simple(),
            safe_name
        );

        let full_path = Path::new(&config::storage_root()).join(&relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, bytes)?;

        let active_model = ActiveModel {
            submission_id: Set(submission_id),
            filename: Set(filename.to_owned()),
            path: Set(relative_path),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(active_model.insert(db).await?)
    }

    /// Attached files in upload order.
    pub async fn find_all_for_submission(
        db: &DbConn,
        submission_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }
}
