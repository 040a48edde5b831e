use serde::Serialize;

use db::models::{task::Model as TaskModel, task_assignment::Model as TaskAssignmentModel};

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub max_points: i64,
    pub due_date: Option<String>,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TaskModel> for TaskResponse {
    fn from(m: TaskModel) -> Self {
        let max_points = m.effective_max_points();
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            max_points,
            due_date: m.due_date.map(|d| d.to_rfc3339()),
            created_by: m.created_by,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskAssignmentResponse {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub status: String,
    pub submission_deadline: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TaskAssignmentModel> for TaskAssignmentResponse {
    fn from(m: TaskAssignmentModel) -> Self {
        Self {
            id: m.id,
            task_id: m.task_id,
            user_id: m.user_id,
            status: m.status.to_string(),
            submission_deadline: m.submission_deadline.map(|d| d.to_rfc3339()),
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}
