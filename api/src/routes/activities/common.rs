use serde::Serialize;

use db::models::activity::Model as ActivityModel;

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: String,
    pub ends_at: String,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ActivityModel> for ActivityResponse {
    fn from(m: ActivityModel) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            location: m.location,
            starts_at: m.starts_at.to_rfc3339(),
            ends_at: m.ends_at.to_rfc3339(),
            created_by: m.created_by,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}
