use serde::Serialize;

use db::models::{
    participation::Model as ParticipationModel, registration::Model as RegistrationModel,
};

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: i64,
    pub activity_id: i64,
    pub user_id: i64,
    pub status: String,
    pub feedback: Option<String>,
    /// Opaque ticket code for code/QR check-in; only meaningful to its owner.
    pub attendance_code: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RegistrationModel> for RegistrationResponse {
    fn from(m: RegistrationModel) -> Self {
        Self {
            id: m.id,
            activity_id: m.activity_id,
            user_id: m.user_id,
            status: m.status.to_string(),
            feedback: m.feedback,
            attendance_code: m.attendance_code,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipationResponse {
    pub id: i64,
    pub activity_id: i64,
    pub user_id: i64,
    pub participation_type: String,
    pub points_earned: Option<i64>,
    pub notes: Option<String>,
    pub taken_at: String,
}

impl From<ParticipationModel> for ParticipationResponse {
    fn from(m: ParticipationModel) -> Self {
        Self {
            id: m.id,
            activity_id: m.activity_id,
            user_id: m.user_id,
            participation_type: m.participation_type.to_string(),
            points_earned: m.points_earned,
            notes: m.notes,
            taken_at: m.taken_at.to_rfc3339(),
        }
    }
}
