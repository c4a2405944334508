//! Player profile + admin user management.

use actix_web::{get, patch, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::user_repo;
use crate::http::auth::{AdminAuth, Capability, UserAuth};

#[derive(Deserialize)]
pub struct ProfileReq {
    pub discord_username: Option<String>,
}

#[derive(Deserialize)]
pub struct BanReq {
    pub banned: bool,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/users/me
#[get("/users/me")]
pub async fn me(auth: UserAuth) -> impl Responder {
    HttpResponse::Ok().json(auth.user)
}

/// PATCH /api/users/me
#[patch("/users/me")]
pub async fn update_me(
    auth: UserAuth,
    info: web::Json<ProfileReq>,
    db: web::Data<PgPool>,
) -> impl Responder {
    let discord = info
        .discord_username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(d) = discord {
        if d.len() > 64 {
            return HttpResponse::BadRequest().body("discord username is too long");
        }
    }

    match user_repo::update_discord_username(&db, auth.user.id, discord).await {
        Ok(Some(u)) => HttpResponse::Ok().json(u),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(e) => {
            log::error!("profile update failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// GET /api/users
#[get("/users")]
pub async fn list(
    auth: AdminAuth,
    query: web::Query<ListQuery>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageUsers)?;

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    match user_repo::list_users(&db, query.search.as_deref(), limit, offset).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(rows)),
        Err(e) => {
            log::error!("user list failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/users/{id}/ban
#[post("/users/{id}/ban")]
pub async fn ban(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<BanReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageUsers)?;

    match user_repo::set_banned(&db, path.into_inner(), info.banned).await {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("ban update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(me).service(update_me).service(list).service(ban);
}
