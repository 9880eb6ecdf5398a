use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::board::PositionUpdate;
use crate::models::task::{Task, TaskStatus};

#[derive(Deserialize)]
pub struct GetCompanyTaskListRequest {
    pub company_id: i32,
}

#[derive(Serialize)]
pub struct GetCompanyTaskListResponse {
    pub tasks: Vec<TaskDetail>,
}

#[derive(Deserialize)]
pub struct GetTaskListRequest {
    pub workspace_id: i32,
}

#[derive(Serialize)]
pub struct GetTaskListResponse {
    pub tasks: Vec<TaskDetail>,
}

#[derive(Deserialize)]
pub struct GetRelatedTasksRequest {
    pub task_id: i32,
    pub workspace_id: i32,
}

#[derive(Serialize)]
pub struct GetRelatedTasksResponse {
    pub task: Task,
    pub related_tasks: Vec<Task>,
}

#[derive(Deserialize)]
pub struct AddTaskRequest {
    pub workspace_id: i32,
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<i32>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct AddTaskResponse {
    pub success: bool,
    pub message: String,
    pub task_id: i32,
}

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub task_id: i32,
    pub workspace_id: i32,
    pub new_title: Option<String>,
    pub new_description: Option<String>,
    pub new_assignee_id: Option<i32>,
    pub new_due_date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct UpdateTaskResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct DeleteTaskRequest {
    pub task_id: i32,
    pub workspace_id: i32,
}

#[derive(Serialize)]
pub struct DeleteTaskResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct MoveTaskRequest {
    pub workspace_id: i32,
    pub task_id: i32,
    pub to_status: TaskStatus,
    pub to_index: usize,
}

#[derive(Deserialize)]
pub struct BulkPositionUpdateRequest {
    pub workspace_id: i32,
    pub tasks: Vec<PositionUpdate>,
}

#[derive(Serialize)]
pub struct BulkPositionUpdateResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<Task>,
}

// Task row joined with its project and assignee for list views
#[derive(Debug, Serialize, FromRow)]
pub struct TaskDetail {
    pub task_id: i32,
    pub workspace_id: i32,
    pub company_id: i32,
    pub project_id: i32,
    pub assignee_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub position: i32,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub project_name: String,
    pub project_image: Option<String>,
    pub assignee_name: Option<String>,
    pub assignee_color: Option<String>,
}
