use actix_web::{middleware::Logger, web, App, HttpServer};
use quenta_server::{cache, http, metrics};
use sqlx::postgres::PgPoolOptions;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

    // Postgres pool
    let db_pool = PgPoolOptions::new()
        .max_connections(30)
        .connect(&database_url)
        .await
        .expect("Failed to create Postgres pool");

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .expect("Failed to run migrations");

    // Warm in-memory caches
    cache::warm_all(&db_pool).await;

    // Shared client for the Steam handshake
    let steam_client = reqwest::Client::new();

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(steam_client.clone()))
            .configure(http::routes::init_routes)
            .configure(http::spa::init_routes)
    })
    .bind(&server_addr)?
    .run()
    .await
}
