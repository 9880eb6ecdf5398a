use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Workspace {
    pub workspace_id: i32,
    pub company_id: i32,
    pub workspace_name: String,
}
