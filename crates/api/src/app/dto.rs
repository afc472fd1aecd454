use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dashgate_auth::{DashboardView, User};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub dashboard: DashboardView,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<User>,
}
