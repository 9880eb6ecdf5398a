use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::info;
use sqlx::MySqlPool;

use crate::audit;
use crate::auth;
use crate::board::{Board, PositionUpdate};
use crate::errors::ApiError;
use crate::models::project::Project;
use crate::models::task::{Task, TaskStatus};
use crate::models::workspace::Workspace;
use super::task_view_models::{
    GetCompanyTaskListRequest, GetCompanyTaskListResponse,
    GetTaskListRequest, GetTaskListResponse,
    GetRelatedTasksRequest, GetRelatedTasksResponse,
    AddTaskRequest, AddTaskResponse,
    UpdateTaskRequest, UpdateTaskResponse,
    DeleteTaskRequest, DeleteTaskResponse,
    MoveTaskRequest,
    BulkPositionUpdateRequest, BulkPositionUpdateResponse,
    TaskDetail,
};

const TASK_COLUMNS: &str =
    "task_id, workspace_id, company_id, project_id, assignee_id, title, description, \
     status, position, due_date, created_at";

const TASK_DETAIL_COLUMNS: &str =
    "t.task_id, t.workspace_id, t.company_id, t.project_id, t.assignee_id, t.title, \
     t.description, t.status, t.position, t.due_date, t.created_at, \
     p.project_name, p.image_url AS project_image, \
     u.user_name AS assignee_name, m.color AS assignee_color";

const TASK_DETAIL_JOINS: &str =
    "FROM Tasks_ t \
     JOIN Projects_ p ON t.project_id = p.project_id \
     LEFT JOIN Members_ m ON t.assignee_id = m.member_id \
     LEFT JOIN Users_ u ON m.user_id = u.user_id";

// Default handler for task view root
pub async fn task_view_get() -> impl Responder {
    HttpResponse::Ok().body("Hello, this is the Task View endpoint.")
}

// Order-preserving dedup of the requested task ids
fn distinct_ids(updates: &[PositionUpdate]) -> Vec<i32> {
    let mut ids: Vec<i32> = Vec::new();
    for update in updates {
        if !ids.contains(&update.id) {
            ids.push(update.id);
        }
    }
    ids
}

// Reorder fetched rows to match the order the caller sent the ids in
fn order_by_requested(tasks: Vec<Task>, ids: &[i32]) -> Vec<Task> {
    let mut by_id: HashMap<i32, Task> = tasks.into_iter().map(|t| (t.task_id, t)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

// Handler to get all tasks for a company, joined with project and assignee
pub async fn get_company_task_list(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<GetCompanyTaskListRequest>,
) -> Result<HttpResponse, ApiError> {
    let company_id = request.company_id;

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_company_member(pool.get_ref(), user.user_id, company_id).await?;

    let query_str = format!(
        "SELECT {} {} WHERE t.company_id = ? ORDER BY t.created_at DESC, t.task_id DESC",
        TASK_DETAIL_COLUMNS, TASK_DETAIL_JOINS
    );
    let tasks = sqlx::query_as::<_, TaskDetail>(&query_str)
        .bind(company_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(GetCompanyTaskListResponse { tasks }))
}

// Handler to get the task list of a workspace, ordered for board rendering
pub async fn get_task_list(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<GetTaskListRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;

    let query_str = format!(
        "SELECT {} {} WHERE t.workspace_id = ? ORDER BY t.status, t.position, t.task_id",
        TASK_DETAIL_COLUMNS, TASK_DETAIL_JOINS
    );
    let tasks = sqlx::query_as::<_, TaskDetail>(&query_str)
        .bind(workspace_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(GetTaskListResponse { tasks }))
}

// Handler to get a task plus the other tasks of its assignee in the same
// workspace
pub async fn get_related_tasks(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<GetRelatedTasksRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;

    let query_str = format!("SELECT {} FROM Tasks_ WHERE task_id = ?", TASK_COLUMNS);
    let task = sqlx::query_as::<_, Task>(&query_str)
        .bind(request.task_id)
        .fetch_optional(pool.get_ref())
        .await?;

    // A task from another workspace is indistinguishable from a missing one
    let task = match task {
        Some(task) if task.workspace_id == workspace_id => task,
        _ => {
            info!(
                "Task {} not found in workspace {}",
                request.task_id, workspace_id
            );
            return Err(ApiError::NotFound("Task not found".to_string()));
        }
    };

    let related_tasks = match task.assignee_id {
        Some(assignee_id) => {
            let query_str = format!(
                "SELECT {} FROM Tasks_ \
                 WHERE workspace_id = ? AND assignee_id = ? AND task_id != ? \
                 ORDER BY created_at DESC, task_id DESC",
                TASK_COLUMNS
            );
            sqlx::query_as::<_, Task>(&query_str)
                .bind(workspace_id)
                .bind(assignee_id)
                .bind(task.task_id)
                .fetch_all(pool.get_ref())
                .await?
        }
        None => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(GetRelatedTasksResponse { task, related_tasks }))
}

// Handler to add a task; it lands in the initial column at the next free
// position
pub async fn add_task(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AddTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;

    if request.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Task title cannot be empty".to_string()));
    }

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;

    let workspace = sqlx::query_as::<_, Workspace>(
        "SELECT workspace_id, company_id, workspace_name FROM Workspaces_ WHERE workspace_id = ?",
    )
    .bind(workspace_id)
    .fetch_optional(pool.get_ref())
    .await?;

    let workspace = match workspace {
        Some(workspace) => workspace,
        None => {
            info!("Workspace not found: {}", workspace_id);
            return Err(ApiError::NotFound("Workspace not found".to_string()));
        }
    };

    let project = sqlx::query_as::<_, Project>(
        "SELECT project_id, workspace_id, project_name, image_url \
         FROM Projects_ WHERE project_id = ? AND workspace_id = ?",
    )
    .bind(request.project_id)
    .bind(workspace_id)
    .fetch_optional(pool.get_ref())
    .await?;

    let project = match project {
        Some(project) => project,
        None => {
            info!(
                "Project {} not found in workspace {}",
                request.project_id, workspace_id
            );
            return Err(ApiError::NotFound("Project not found in workspace".to_string()));
        }
    };

    if let Some(assignee_id) = request.assignee_id {
        verify_assignee(pool.get_ref(), assignee_id, workspace_id).await?;
    }

    // Next free slot in the (workspace, status) partition
    let max_position = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(position), -1) FROM Tasks_ WHERE workspace_id = ? AND status = ?",
    )
    .bind(workspace_id)
    .bind(TaskStatus::INITIAL)
    .fetch_one(pool.get_ref())
    .await?;
    let position = (max_position + 1) as i32;

    let insert_result = sqlx::query(
        "INSERT INTO Tasks_ \
         (workspace_id, company_id, project_id, assignee_id, title, description, status, position, due_date) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(workspace_id)
    .bind(workspace.company_id)
    .bind(project.project_id)
    .bind(request.assignee_id)
    .bind(&request.title)
    .bind(&request.description)
    .bind(TaskStatus::INITIAL)
    .bind(position)
    .bind(request.due_date)
    .execute(pool.get_ref())
    .await?;

    let task_id = insert_result.last_insert_id() as i32;
    audit::record_audit(
        pool.get_ref(),
        workspace_id,
        user.user_id,
        "task.create",
        &format!("task {} created in project {}", task_id, project.project_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(AddTaskResponse {
        success: true,
        message: "Task added successfully".to_string(),
        task_id,
    }))
}

// Handler to edit a task's title, description, assignee or due date.
// Status and position belong to the reorder endpoints and are never
// touched here; the workspace of a task is immutable.
pub async fn update_task(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;

    let query_str = format!(
        "SELECT {} FROM Tasks_ WHERE task_id = ? AND workspace_id = ?",
        TASK_COLUMNS
    );
    let task = sqlx::query_as::<_, Task>(&query_str)
        .bind(request.task_id)
        .bind(workspace_id)
        .fetch_optional(pool.get_ref())
        .await?;

    let task = match task {
        Some(task) => task,
        None => {
            info!(
                "Task {} not found in workspace {}",
                request.task_id, workspace_id
            );
            return Err(ApiError::NotFound("Task not found".to_string()));
        }
    };

    // Determine the new field values, keeping current ones where the
    // request omits them
    let title = match &request.new_title {
        Some(new_title) => {
            if new_title.trim().is_empty() {
                return Err(ApiError::InvalidRequest("Task title cannot be empty".to_string()));
            }
            new_title.clone()
        }
        None => task.title.clone(),
    };

    let description = match &request.new_description {
        Some(new_description) => Some(new_description.clone()),
        None => task.description.clone(),
    };

    let assignee_id = match request.new_assignee_id {
        Some(new_assignee_id) => {
            verify_assignee(pool.get_ref(), new_assignee_id, workspace_id).await?;
            Some(new_assignee_id)
        }
        None => task.assignee_id,
    };

    let due_date = match request.new_due_date {
        Some(new_due_date) => Some(new_due_date),
        None => task.due_date,
    };

    sqlx::query(
        "UPDATE Tasks_ SET title = ?, description = ?, assignee_id = ?, due_date = ? \
         WHERE task_id = ?",
    )
    .bind(&title)
    .bind(&description)
    .bind(assignee_id)
    .bind(due_date)
    .bind(task.task_id)
    .execute(pool.get_ref())
    .await?;

    audit::record_audit(
        pool.get_ref(),
        workspace_id,
        user.user_id,
        "task.update",
        &format!("task {} updated", task.task_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(UpdateTaskResponse {
        success: true,
        message: "Task updated successfully".to_string(),
    }))
}

// Handler to delete a task
pub async fn delete_task(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;

    let existing = sqlx::query_scalar::<_, i32>(
        "SELECT task_id FROM Tasks_ WHERE task_id = ? AND workspace_id = ?",
    )
    .bind(request.task_id)
    .bind(workspace_id)
    .fetch_optional(pool.get_ref())
    .await?;

    if existing.is_none() {
        info!(
            "Task {} not found in workspace {}",
            request.task_id, workspace_id
        );
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    sqlx::query("DELETE FROM Tasks_ WHERE task_id = ? AND workspace_id = ?")
        .bind(request.task_id)
        .bind(workspace_id)
        .execute(pool.get_ref())
        .await?;

    audit::record_audit(
        pool.get_ref(),
        workspace_id,
        user.user_id,
        "task.delete",
        &format!("task {} deleted", request.task_id),
    )
    .await;

    Ok(HttpResponse::Ok().json(DeleteTaskResponse {
        success: true,
        message: "Task deleted successfully".to_string(),
    }))
}

// Handler to apply a single drag on the board server-side: derive the
// changed (status, position) tuples and commit them in one transaction
pub async fn move_task(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<MoveTaskRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;

    let cards = sqlx::query_as::<_, (i32, TaskStatus, i32)>(
        "SELECT task_id, status, position FROM Tasks_ WHERE workspace_id = ?",
    )
    .bind(workspace_id)
    .fetch_all(pool.get_ref())
    .await?;

    let mut board = Board::new(cards);
    let changes = match board.move_task(request.task_id, request.to_status, request.to_index) {
        Some(changes) => changes,
        None => {
            info!(
                "Task {} not found in workspace {}",
                request.task_id, workspace_id
            );
            return Err(ApiError::NotFound("Task not found".to_string()));
        }
    };

    if changes.is_empty() {
        return Ok(HttpResponse::Ok().json(BulkPositionUpdateResponse {
            success: true,
            message: "Task is already in place".to_string(),
            data: Vec::new(),
        }));
    }

    commit_position_updates(pool.get_ref(), workspace_id, &changes).await?;

    let ids = distinct_ids(&changes);
    let data = fetch_tasks_by_ids(pool.get_ref(), workspace_id, &ids).await?;

    audit::record_audit(
        pool.get_ref(),
        workspace_id,
        user.user_id,
        "task.move",
        &format!("task {} moved, {} rows repositioned", request.task_id, changes.len()),
    )
    .await;

    Ok(HttpResponse::Ok().json(BulkPositionUpdateResponse {
        success: true,
        message: "Task moved successfully".to_string(),
        data,
    }))
}

// Handler to commit a batch of (task, status, position) tuples computed by
// the client-side board. Validation happens entirely before any mutation;
// the writes are all-or-nothing.
pub async fn bulk_position_update(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<BulkPositionUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let workspace_id = request.workspace_id;
    let updates = &request.tasks;

    if updates.is_empty() {
        return Err(ApiError::InvalidRequest("Task list is empty".to_string()));
    }

    let user = auth::current_user(&req, pool.get_ref()).await?;
    auth::require_member(pool.get_ref(), user.user_id, workspace_id).await?;

    info!(
        "Received bulk position update for workspace {} with {} tuples",
        workspace_id,
        updates.len()
    );

    // Every referenced task must exist in the claimed workspace, or the
    // whole batch is rejected before anything is written
    let ids = distinct_ids(updates);
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let query_str = format!(
        "SELECT task_id FROM Tasks_ WHERE workspace_id = ? AND task_id IN ({})",
        placeholders
    );
    let mut query = sqlx::query_scalar::<_, i32>(&query_str).bind(workspace_id);
    for id in &ids {
        query = query.bind(*id);
    }
    let found = query.fetch_all(pool.get_ref()).await?;

    if found.len() < ids.len() {
        info!(
            "Bulk position update rejected: {} of {} tasks found in workspace {}",
            found.len(),
            ids.len(),
            workspace_id
        );
        return Err(ApiError::NotFound(
            "One or more tasks were not found in the workspace".to_string(),
        ));
    }

    commit_position_updates(pool.get_ref(), workspace_id, updates).await?;

    let data = fetch_tasks_by_ids(pool.get_ref(), workspace_id, &ids).await?;

    audit::record_audit(
        pool.get_ref(),
        workspace_id,
        user.user_id,
        "task.bulk_position_update",
        &format!("{} tasks repositioned", ids.len()),
    )
    .await;

    Ok(HttpResponse::Ok().json(BulkPositionUpdateResponse {
        success: true,
        message: "Task positions updated successfully".to_string(),
        data,
    }))
}

// Apply every tuple inside one transaction so a mid-batch failure leaves
// no partially reordered board
async fn commit_position_updates(
    pool: &MySqlPool,
    workspace_id: i32,
    updates: &[PositionUpdate],
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    for update in updates {
        sqlx::query(
            "UPDATE Tasks_ SET status = ?, position = ? WHERE task_id = ? AND workspace_id = ?",
        )
        .bind(update.status)
        .bind(update.position)
        .bind(update.id)
        .bind(workspace_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

async fn fetch_tasks_by_ids(
    pool: &MySqlPool,
    workspace_id: i32,
    ids: &[i32],
) -> Result<Vec<Task>, ApiError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let query_str = format!(
        "SELECT {} FROM Tasks_ WHERE workspace_id = ? AND task_id IN ({})",
        TASK_COLUMNS, placeholders
    );
    let mut query = sqlx::query_as::<_, Task>(&query_str).bind(workspace_id);
    for id in ids {
        query = query.bind(*id);
    }
    let tasks = query.fetch_all(pool).await?;

    Ok(order_by_requested(tasks, ids))
}

async fn verify_assignee(
    pool: &MySqlPool,
    assignee_id: i32,
    workspace_id: i32,
) -> Result<(), ApiError> {
    let member = sqlx::query_scalar::<_, i32>(
        "SELECT member_id FROM Members_ WHERE member_id = ? AND workspace_id = ?",
    )
    .bind(assignee_id)
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?;

    if member.is_none() {
        info!(
            "Assignee {} is not a member of workspace {}",
            assignee_id, workspace_id
        );
        return Err(ApiError::InvalidRequest(
            "Assignee is not a member of the workspace".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(task_id: i32) -> Task {
        Task {
            task_id,
            workspace_id: 1,
            company_id: 1,
            project_id: 1,
            assignee_id: None,
            title: format!("task {}", task_id),
            description: None,
            status: TaskStatus::Todo,
            position: 0,
            due_date: None,
            created_at: Utc::now(),
        }
    }

    fn update(id: i32, position: i32) -> PositionUpdate {
        PositionUpdate {
            id,
            status: TaskStatus::Todo,
            position,
        }
    }

    #[test]
    fn distinct_ids_preserves_first_occurrence_order() {
        let updates = [update(3, 0), update(1, 1), update(3, 2), update(2, 3)];
        assert_eq!(distinct_ids(&updates), vec![3, 1, 2]);
    }

    #[test]
    fn response_rows_follow_the_requested_order() {
        let tasks = vec![task(1), task(2), task(3)];
        let ordered = order_by_requested(tasks, &[2, 3, 1]);
        let ids: Vec<i32> = ordered.iter().map(|t| t.task_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn rows_missing_from_the_store_are_skipped() {
        let tasks = vec![task(1), task(2)];
        let ordered = order_by_requested(tasks, &[2, 9, 1]);
        let ids: Vec<i32> = ordered.iter().map(|t| t.task_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
