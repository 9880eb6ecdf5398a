pub mod workspace_view_handlers;
pub mod workspace_view_models;
