use log::error;
use sqlx::MySqlPool;
use uuid::Uuid;

// Best-effort audit trail: a failed insert is logged and never fails the
// request that triggered it.
pub async fn record_audit(
    pool: &MySqlPool,
    workspace_id: i32,
    user_id: i32,
    action: &str,
    detail: &str,
) {
    let audit_id = Uuid::new_v4().to_string();
    let result = sqlx::query(
        "INSERT INTO AuditLog_ (audit_id, workspace_id, user_id, action, detail)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&audit_id)
    .bind(workspace_id)
    .bind(user_id)
    .bind(action)
    .bind(detail)
    .execute(pool)
    .await;

    if let Err(e) = result {
        error!(
            "Failed to record audit entry {} for workspace {}: {}",
            action, workspace_id, e
        );
    }
}
