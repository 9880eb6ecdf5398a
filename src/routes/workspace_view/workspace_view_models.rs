use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::member::MemberRole;

#[derive(Deserialize)]
pub struct GetMemberListRequest {
    pub workspace_id: i32,
}

#[derive(Serialize)]
pub struct GetMemberListResponse {
    pub members: Vec<MemberInfo>,
}

// Member row joined with its user name for roster views
#[derive(Debug, Serialize, FromRow)]
pub struct MemberInfo {
    pub member_id: i32,
    pub user_name: String,
    pub role: MemberRole,
    pub color: String,
}

#[derive(Deserialize)]
pub struct AddMemberRequest {
    pub workspace_id: i32,
    pub user_name: String,
    pub role: Option<MemberRole>,
}

#[derive(Serialize)]
pub struct AddMemberResponse {
    pub success: bool,
    pub message: String,
}
