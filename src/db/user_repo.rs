use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::User;

/// Insert the user on first login, refresh nickname / last_login afterwards.
pub async fn upsert_steam_user(
    db: &PgPool,
    steam_id: &str,
    nickname: Option<&str>,
) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"INSERT INTO users (steam_id, steam_nickname)
           VALUES ($1, COALESCE($2, ''))
           ON CONFLICT (steam_id) DO UPDATE
             SET steam_nickname = COALESCE($2, users.steam_nickname),
                 last_login     = NOW()
           RETURNING *"#,
    )
    .bind(steam_id)
    .bind(nickname)
    .fetch_one(db)
    .await
    .context("upserting steam user")
}

pub async fn fetch_user(db: &PgPool, id: Uuid) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching user")
}

/// Admin listing, newest first. `search` matches nickname or steam id.
pub async fn list_users(
    db: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>> {
    match search {
        Some(q) => {
            let pattern = format!("%{}%", q.trim());
            sqlx::query_as::<_, User>(
                r#"SELECT * FROM users
                    WHERE steam_nickname ILIKE $1 OR steam_id LIKE $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3"#,
            )
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, User>(
                "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await
        }
    }
    .context("listing users")
}

/// Returns the updated row, or None when the user does not exist.
pub async fn update_discord_username(
    db: &PgPool,
    id: Uuid,
    discord_username: Option<&str>,
) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET discord_username = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(discord_username)
    .fetch_optional(db)
    .await
    .context("updating discord username")
}

pub async fn set_banned(db: &PgPool, id: Uuid, banned: bool) -> Result<bool> {
    let rows = sqlx::query("UPDATE users SET is_banned = $2 WHERE id = $1")
        .bind(id)
        .bind(banned)
        .execute(db)
        .await
        .context("setting ban flag")?
        .rows_affected();
    Ok(rows > 0)
}
