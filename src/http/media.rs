//! Media video gallery: public read, content-manager CRUD.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::content_repo::{self, Orderable};
use crate::http::auth::{AdminAuth, Capability};

#[derive(Deserialize)]
pub struct CreateReq {
    pub title: String,
    pub video_url: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Deserialize)]
pub struct PatchReq {
    pub title: Option<String>,
    pub video_url: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Deserialize)]
pub struct ReorderReq {
    pub ids: Vec<Uuid>,
}

/// GET /api/media-videos
#[get("/media-videos")]
pub async fn list(db: web::Data<PgPool>) -> impl Responder {
    match content_repo::list_media_videos(&db).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => {
            log::error!("media list failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// POST /api/media-videos
#[post("/media-videos")]
pub async fn create(
    auth: AdminAuth,
    info: web::Json<CreateReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    if info.title.trim().is_empty() || info.video_url.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("title and video_url are required"));
    }
    match content_repo::create_media_video(
        &db,
        info.title.trim(),
        info.video_url.trim(),
        info.order_index,
    )
    .await
    {
        Ok(v) => Ok(HttpResponse::Ok().json(v)),
        Err(e) => {
            log::error!("media create failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/media-videos/{id}
#[patch("/media-videos/{id}")]
pub async fn update(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<PatchReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::update_media_video(
        &db,
        path.into_inner(),
        info.title.as_deref(),
        info.video_url.as_deref(),
        info.order_index,
    )
    .await
    {
        Ok(Some(v)) => Ok(HttpResponse::Ok().json(v)),
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("media update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// DELETE /api/media-videos/{id}
#[delete("/media-videos/{id}")]
pub async fn remove(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::delete_media_video(&db, path.into_inner()).await {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("media delete failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/media-videos/reorder
#[post("/media-videos/reorder")]
pub async fn reorder(
    auth: AdminAuth,
    info: web::Json<ReorderReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::reorder(&db, Orderable::MediaVideos, &info.ids).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => {
            log::error!("media reorder failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(reorder)
        .service(create)
        .service(update)
        .service(remove);
}
