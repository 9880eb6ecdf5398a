use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::info;
use sqlx::MySqlPool;

use crate::audit;
use crate::auth;
use crate::errors::ApiError;
use crate::models::member::MemberRole;
use super::workspace_view_models::{
    GetMemberListRequest, GetMemberListResponse, MemberInfo,
    AddMemberRequest, AddMemberResponse,
};

// Display colors assigned round-robin by user id
const MEMBER_COLORS: [&str; 8] = [
    "#e06c75", "#61afef", "#98c379", "#c678dd", "#e5c07b", "#56b6c2", "#d19a66", "#abb2bf",
];

// Default handler for workspace view root
pub async fn workspace_view_get() -> impl Responder {
    HttpResponse::Ok().body("Hello, this is the Workspace View endpoint.")
}

// Handler to get the member roster of a workspace
pub async fn get_member_list(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<GetMemberListRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;

    let members = sqlx::query_as::<_, MemberInfo>(
        "SELECT m.member_id, u.user_name, m.role, m.color
         FROM Members_ m
         JOIN Users_ u ON m.user_id = u.user_id
         WHERE m.workspace_id = ?
         ORDER BY u.user_name",
    )
    .bind(workspace_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(GetMemberListResponse { members }))
}

// Handler to admit an existing user into a workspace. Only admins may do
// this.
pub async fn add_member(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AddMemberRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;

    let user = auth::current_user(&req, pool.get_ref()).await?;
    let member = auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;
    auth::require_role(&member, MemberRole::Admin)?;

    let new_user_id = sqlx::query_scalar::<_, i32>(
        "SELECT user_id FROM Users_ WHERE user_name = ?",
    )
    .bind(&request.user_name)
    .fetch_optional(pool.get_ref())
    .await?;

    let new_user_id = match new_user_id {
        Some(user_id) => user_id,
        None => {
            info!("User not found: {}", request.user_name);
            return Err(ApiError::NotFound("User not found".to_string()));
        }
    };

    let already_member = sqlx::query_scalar::<_, i32>(
        "SELECT member_id FROM Members_ WHERE user_id = ? AND workspace_id = ?",
    )
    .bind(new_user_id)
    .bind(workspace_id)
    .fetch_optional(pool.get_ref())
    .await?;

    if already_member.is_some() {
        return Err(ApiError::InvalidRequest(
            "User is already a member of the workspace".to_string(),
        ));
    }

    let role = request.role.unwrap_or(MemberRole::Member);
    let color = MEMBER_COLORS[new_user_id as usize % MEMBER_COLORS.len()];

    sqlx::query(
        "INSERT INTO Members_ (user_id, workspace_id, role, color) VALUES (?, ?, ?, ?)",
    )
    .bind(new_user_id)
    .bind(workspace_id)
    .bind(role)
    .bind(color)
    .execute(pool.get_ref())
    .await?;

    audit::record_audit(
        pool.get_ref(),
        workspace_id,
        user.user_id,
        "member.add",
        &format!("user {} admitted", request.user_name),
    )
    .await;

    Ok(HttpResponse::Ok().json(AddMemberResponse {
        success: true,
        message: "Member added successfully".to_string(),
    }))
}
