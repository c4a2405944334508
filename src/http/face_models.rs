//! Face-model catalogue + availability probe.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::{self, FACE_MODELS};
use crate::db::face_model_repo::{self, FaceModelPatch};
use crate::db::models::FaceModel;
use crate::http::auth::{AdminAuth, Capability};

#[derive(Deserialize)]
pub struct CreateReq {
    pub name: String,
    pub gender: String,
    pub image_url: String,
    #[serde(default)]
    pub is_unique: bool,
}

#[derive(Deserialize)]
pub struct UpdateReq {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub image_url: Option<String>,
    pub is_unique: Option<bool>,
}

/// GET /api/face-models
#[get("/face-models")]
pub async fn list(db: web::Data<PgPool>) -> impl Responder {
    // Use the warm cache when populated; otherwise fall back to the DB.
    let mut defs: Vec<FaceModel> = if !FACE_MODELS.is_empty() {
        FACE_MODELS.iter().map(|e| e.value().clone()).collect()
    } else {
        match face_model_repo::list(&db).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("face model list failed: {e:?}");
                return HttpResponse::InternalServerError().finish();
            }
        }
    };
    defs.sort_by(|a, b| a.name.cmp(&b.name));

    HttpResponse::Ok().json(defs)
}

/// GET /api/face-models/{id}/available
///
/// Advisory only; the binding check happens under lock when a character
/// claims the model.
#[get("/face-models/{id}/available")]
pub async fn available(path: web::Path<Uuid>, db: web::Data<PgPool>) -> impl Responder {
    let id = path.into_inner();

    // Shared models are always available; answer from the warm cache.
    if let Some(fm) = cache::get_face_model(id) {
        if !fm.is_unique {
            return HttpResponse::Ok().json(json!({ "available": true }));
        }
    }

    match face_model_repo::is_available(&db, id).await {
        Ok(Some(free)) => HttpResponse::Ok().json(json!({ "available": free })),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(e) => {
            log::error!("availability check failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// POST /api/face-models
#[post("/face-models")]
pub async fn create(
    auth: AdminAuth,
    info: web::Json<CreateReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    if info.name.trim().is_empty() || info.image_url.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("name and image_url are required"));
    }

    match face_model_repo::create(
        &db,
        info.name.trim(),
        info.gender.trim(),
        info.image_url.trim(),
        info.is_unique,
    )
    .await
    {
        Ok(fm) => {
            cache::put_face_model(fm.clone());
            Ok(HttpResponse::Ok().json(fm))
        }
        Err(e) => {
            log::error!("face model create failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/face-models/{id}
#[patch("/face-models/{id}")]
pub async fn update(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<UpdateReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    let info = info.into_inner();
    let patch = FaceModelPatch {
        name: info.name,
        gender: info.gender,
        image_url: info.image_url,
        is_unique: info.is_unique,
    };

    match face_model_repo::update(&db, path.into_inner(), patch).await {
        Ok(Some(fm)) => {
            cache::put_face_model(fm.clone());
            Ok(HttpResponse::Ok().json(fm))
        }
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("face model update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// DELETE /api/face-models/{id}
#[delete("/face-models/{id}")]
pub async fn remove(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    let id = path.into_inner();
    match face_model_repo::delete(&db, id).await {
        Ok(true) => {
            cache::remove_face_model(id);
            Ok(HttpResponse::Ok().json(json!({ "success": true })))
        }
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => Ok(HttpResponse::Conflict().body(e.to_string())),
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(available)
        .service(create)
        .service(update)
        .service(remove);
}
