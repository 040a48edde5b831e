use serde::{Deserialize, Serialize};

/// JWT payload: subject user id, expiry, and the admin flag that gates the
/// decision/grading endpoints.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
    pub admin: bool,
}

/// Authenticated caller, inserted into request extensions by the guards.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);
