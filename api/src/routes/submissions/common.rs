use axum::extract::Multipart;
use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;

use db::models::{
    submission::Model as SubmissionModel, submission_file::Model as SubmissionFileModel,
};

#[derive(Debug, Serialize)]
pub struct SubmissionFileResponse {
    pub id: i64,
    pub filename: String,
    pub path: String,
}

impl From<SubmissionFileModel> for SubmissionFileResponse {
    fn from(m: SubmissionFileModel) -> Self {
        Self {
            id: m.id,
            filename: m.filename,
            path: m.path,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub content: Option<String>,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub grader_id: Option<i64>,
    pub status: String,
    pub files: Vec<SubmissionFileResponse>,
    pub submitted_at: String,
    pub updated_at: String,
    pub graded_at: Option<String>,
    pub completed_at: Option<String>,
}

impl SubmissionResponse {
    /// Builds the wire shape, pulling in the attached file rows.
    pub async fn load(
        db: &DatabaseConnection,
        m: SubmissionModel,
    ) -> Result<SubmissionResponse, DbErr> {
        let files = SubmissionFileModel::find_all_for_submission(db, m.id)
            .await?
            .into_iter()
            .map(SubmissionFileResponse::from)
            .collect();

        Ok(Self {
            id: m.id,
            task_id: m.task_id,
            user_id: m.user_id,
            content: m.content,
            score: m.score,
            feedback: m.feedback,
            grader_id: m.grader_id,
            status: m.status.to_string(),
            files,
            submitted_at: m.submitted_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
            graded_at: m.graded_at.map(|d| d.to_rfc3339()),
            completed_at: m.completed_at.map(|d| d.to_rfc3339()),
        })
    }
}

/// Parsed multipart body for submit/update.
#[derive(Debug, Default)]
pub struct SubmissionUpload {
    pub content: Option<String>,
    pub files: Vec<(String, Vec<u8>)>,
}

impl SubmissionUpload {
    /// Neither meaningful text nor a single file.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self
                .content
                .as_deref()
                .map(|c| c.trim().is_empty())
                .unwrap_or(true)
    }
}

/// Reads `content` and repeated `files` fields from a multipart body.
/// Unknown fields are skipped.
pub async fn read_upload(multipart: &mut Multipart) -> Result<SubmissionUpload, String> {
    let mut upload = SubmissionUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid multipart body: {e}"))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("content") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| format!("Invalid content field: {e}"))?;
                upload.content = Some(text);
            }
            Some("files") => {
                let filename = field
                    .file_name()
                    .map(str::to_owned)
                    .ok_or_else(|| "File field is missing a filename".to_owned())?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file '{filename}': {e}"))?;
                upload.files.push((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(upload)
}

/// Parsed multipart body for grading.
#[derive(Debug)]
pub struct GradeForm {
    pub score: i64,
    pub feedback: Option<String>,
}

pub async fn read_grade_form(multipart: &mut Multipart) -> Result<GradeForm, String> {
    let mut score: Option<i64> = None;
    let mut feedback: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid multipart body: {e}"))?
    {
        let name = field.name().map(str::to_owned);
        let text = field
            .text()
            .await
            .map_err(|e| format!("Invalid form field: {e}"))?;
        match name.as_deref() {
            Some("score") => {
                score = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| format!("Score must be a whole number, got '{text}'"))?,
                );
            }
            Some("feedback") => feedback = Some(text),
            _ => {}
        }
    }

    match score {
        Some(score) => Ok(GradeForm { score, feedback }),
        None => Err("Score is required".to_owned()),
    }
}
