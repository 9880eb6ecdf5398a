use actix_web::{web, App, HttpResponse, HttpServer};
use sqlx::mysql::MySqlPoolOptions;
use std::env;
use dotenv::dotenv;

mod audit;
mod auth;
mod board;
mod errors;
mod models;
mod routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = MySqlPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to create pool");

    let server_address = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    println!("Server running at http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .route("/", web::get().to(|| async { HttpResponse::Ok().body("Hello, this is the TaskHive backend!") }))
            .configure(routes::routes::task_configure)
            .configure(routes::routes::workspace_configure)
    })
    .bind(server_address)?
    .run()
    .await
}
