use actix_web::HttpRequest;
use log::info;
use sqlx::MySqlPool;

use crate::errors::ApiError;
use crate::models::member::{Member, MemberRole};
use crate::models::user::User;

// Resolve the requesting principal from the session cookie. Sessions are
// issued elsewhere; this only reads them. Handlers call this once and pass
// the user down explicitly.
pub async fn current_user(req: &HttpRequest, pool: &MySqlPool) -> Result<User, ApiError> {
    let session_id = match req.cookie("session_id") {
        Some(cookie) => cookie.value().to_string(),
        None => {
            info!("Session ID not found in cookies");
            return Err(ApiError::Unauthorized("Session ID not found".to_string()));
        }
    };

    let user = sqlx::query_as::<_, User>(
        "SELECT u.user_id, u.user_name, u.user_email
         FROM Sessions_ s
         JOIN Users_ u ON s.user_id = u.user_id
         WHERE s.session_id = ? AND s.expires_at > NOW()",
    )
    .bind(&session_id)
    .fetch_optional(pool)
    .await?;

    match user {
        Some(user) => Ok(user),
        None => {
            info!("Invalid or expired session ID: {}", session_id);
            Err(ApiError::Unauthorized("Invalid or expired session".to_string()))
        }
    }
}

// The Member row is the sole gate for workspace-scoped operations. No row
// means not authorized, regardless of what the payload claims.
pub async fn require_member(
    pool: &MySqlPool,
    user_id: i32,
    workspace_id: i32,
) -> Result<Member, ApiError> {
    let member = sqlx::query_as::<_, Member>(
        "SELECT member_id, user_id, workspace_id, role, color
         FROM Members_
         WHERE user_id = ? AND workspace_id = ?",
    )
    .bind(user_id)
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?;

    match member {
        Some(member) => Ok(member),
        None => {
            info!(
                "User {} is not a member of workspace {}",
                user_id, workspace_id
            );
            Err(ApiError::Unauthorized("Not a member of this workspace".to_string()))
        }
    }
}

// Single capability check used by every endpoint that needs more than
// plain membership.
pub fn require_role(member: &Member, required: MemberRole) -> Result<(), ApiError> {
    if member.role.satisfies(required) {
        Ok(())
    } else {
        info!(
            "Member {} lacks the required role in workspace {}",
            member.member_id, member.workspace_id
        );
        Err(ApiError::Unauthorized("Insufficient role for this action".to_string()))
    }
}

// Company-level reads require membership in at least one workspace of
// that company.
pub async fn require_company_member(
    pool: &MySqlPool,
    user_id: i32,
    company_id: i32,
) -> Result<(), ApiError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM Members_ m
         JOIN Workspaces_ w ON m.workspace_id = w.workspace_id
         WHERE m.user_id = ? AND w.company_id = ?",
    )
    .bind(user_id)
    .bind(company_id)
    .fetch_one(pool)
    .await?;

    if count == 0 {
        info!(
            "User {} has no membership in any workspace of company {}",
            user_id, company_id
        );
        return Err(ApiError::Unauthorized("Not a member of this company".to_string()));
    }
    Ok(())
}
