use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::Admin;

pub async fn fetch_admin(db: &PgPool, id: Uuid) -> Result<Option<Admin>> {
    sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching admin")
}

pub async fn fetch_by_username(db: &PgPool, username: &str) -> Result<Option<Admin>> {
    sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await
        .context("fetching admin by username")
}

pub async fn list_admins(db: &PgPool) -> Result<Vec<Admin>> {
    sqlx::query_as::<_, Admin>("SELECT * FROM admins ORDER BY created_at")
        .fetch_all(db)
        .await
        .context("listing admins")
}

/// None when the username is already taken.
pub async fn create_admin(
    db: &PgPool,
    username: &str,
    password_hash: &str,
    role: &str,
    permissions: &Value,
) -> Result<Option<Admin>> {
    let res = sqlx::query_as::<_, Admin>(
        r#"INSERT INTO admins (username, password_hash, role, permissions)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .bind(permissions)
    .fetch_one(db)
    .await;

    match res {
        Ok(a) => Ok(Some(a)),
        Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => Ok(None),
        Err(e) => Err(e).context("creating admin"),
    }
}

/// Fields a super_admin may change on an account.
#[derive(Debug, Default)]
pub struct AdminPatch {
    pub role: Option<String>,
    pub permissions: Option<Value>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}

impl AdminPatch {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.permissions.is_none()
            && self.is_active.is_none()
            && self.password_hash.is_none()
    }
}

/// Whitelisted dynamic UPDATE; returns the row, or None when absent.
pub async fn update_admin(db: &PgPool, id: Uuid, patch: AdminPatch) -> Result<Option<Admin>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE admins SET username = username");
    if let Some(role) = &patch.role {
        qb.push(", role = ").push_bind(role.clone());
    }
    if let Some(perms) = &patch.permissions {
        qb.push(", permissions = ").push_bind(perms.clone());
    }
    if let Some(active) = patch.is_active {
        qb.push(", is_active = ").push_bind(active);
    }
    if let Some(hash) = &patch.password_hash {
        qb.push(", password_hash = ").push_bind(hash.clone());
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");

    qb.build_query_as::<Admin>()
        .fetch_optional(db)
        .await
        .context("updating admin")
}

pub async fn touch_last_login(db: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE admins SET last_login = NOW() WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("touching admin last_login")?;
    Ok(())
}
