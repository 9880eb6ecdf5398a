use actix_web::web;

use super::task_view::task_view_handlers;

pub fn task_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-task")
            .route("", web::get().to(task_view_handlers::task_view_get))
            .route("/", web::get().to(task_view_handlers::task_view_get))
            .route("/company-tasks", web::post().to(task_view_handlers::get_company_task_list))
            .route("/task-list", web::post().to(task_view_handlers::get_task_list))
            .route("/related-tasks", web::post().to(task_view_handlers::get_related_tasks))
            .route("/add-task", web::post().to(task_view_handlers::add_task))
            .route("/update-task", web::post().to(task_view_handlers::update_task))
            .route("/delete-task", web::post().to(task_view_handlers::delete_task))
            .route("/move-task", web::post().to(task_view_handlers::move_task))
            .route("/bulk-position-update", web::post().to(task_view_handlers::bulk_position_update))
    );
}

use super::workspace_view::workspace_view_handlers;

pub fn workspace_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-workspace")
            .route("", web::get().to(workspace_view_handlers::workspace_view_get))
            .route("/", web::get().to(workspace_view_handlers::workspace_view_get))
            .route("/member-list", web::post().to(workspace_view_handlers::get_member_list))
            .route("/add-member", web::post().to(workspace_view_handlers::add_member))
    );
}
