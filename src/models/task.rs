use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Board columns, stored as VARCHAR in Tasks_. The variant order is the
// column order on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    InReview,
    Done,
}

impl TaskStatus {
    // New tasks land in the leftmost column
    pub const INITIAL: TaskStatus = TaskStatus::Backlog;
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_screaming_snake_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let status: TaskStatus = serde_json::from_str("\"BACKLOG\"").unwrap();
        assert_eq!(status, TaskStatus::Backlog);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<TaskStatus>("\"ARCHIVED\"").is_err());
    }
}
