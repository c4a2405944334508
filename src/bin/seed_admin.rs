//! One-shot bootstrap: create the first super_admin account.
//!
//! Reads ADMIN_USERNAME (default "root") and ADMIN_PASSWORD from the
//! environment; a missing password is generated and printed once.

use rand::{distr::Alphanumeric, Rng};
use sqlx::postgres::PgPoolOptions;
use std::env;

use quenta_server::db::admin_repo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "root".into());

    let (password, generated) = match env::var("ADMIN_PASSWORD") {
        Ok(pw) if !pw.is_empty() => (pw, false),
        _ => {
            let pw: String = rand::rng()
                .sample_iter(&Alphanumeric)
                .take(20)
                .map(char::from)
                .collect();
            (pw, true)
        }
    };

    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&db).await?;

    let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
    let permissions = serde_json::json!([]);

    match admin_repo::create_admin(&db, &username, &hash, "super_admin", &permissions).await? {
        Some(admin) => {
            println!("created super_admin {}", admin.username);
            if generated {
                println!("generated password: {password}");
            }
        }
        None => {
            println!("admin {username} already exists; nothing to do");
        }
    }

    Ok(())
}
