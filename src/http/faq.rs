//! FAQ knowledge base: public read, content-manager CRUD.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::content_repo::{self, Orderable};
use crate::db::models::{FaqCategory, FaqItem};
use crate::http::auth::{AdminAuth, Capability};

#[derive(Serialize)]
pub struct CategoryWithItems {
    #[serde(flatten)]
    pub category: FaqCategory,
    pub items: Vec<FaqItem>,
}

#[derive(Deserialize)]
pub struct CategoryReq {
    pub title: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Deserialize)]
pub struct CategoryPatchReq {
    pub title: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Deserialize)]
pub struct ItemReq {
    pub category_id: Uuid,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Deserialize)]
pub struct ItemPatchReq {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Deserialize)]
pub struct ReorderReq {
    pub ids: Vec<Uuid>,
}

/// GET /api/faq
#[get("/faq")]
pub async fn list(db: web::Data<PgPool>) -> impl Responder {
    let categories = match content_repo::list_faq_categories(&db).await {
        Ok(c) => c,
        Err(e) => {
            log::error!("faq category list failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    };
    let items = match content_repo::list_faq_items(&db).await {
        Ok(i) => i,
        Err(e) => {
            log::error!("faq item list failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let out: Vec<CategoryWithItems> = categories
        .into_iter()
        .map(|category| {
            let items = items
                .iter()
                .filter(|i| i.category_id == category.id)
                .cloned()
                .collect();
            CategoryWithItems { category, items }
        })
        .collect();

    HttpResponse::Ok().json(out)
}

/// POST /api/faq/categories
#[post("/faq/categories")]
pub async fn create_category(
    auth: AdminAuth,
    info: web::Json<CategoryReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    if info.title.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("title is required"));
    }
    match content_repo::create_faq_category(&db, info.title.trim(), info.order_index).await {
        Ok(c) => Ok(HttpResponse::Ok().json(c)),
        Err(e) => {
            log::error!("faq category create failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/faq/categories/{id}
#[patch("/faq/categories/{id}")]
pub async fn update_category(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<CategoryPatchReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::update_faq_category(
        &db,
        path.into_inner(),
        info.title.as_deref(),
        info.order_index,
    )
    .await
    {
        Ok(Some(c)) => Ok(HttpResponse::Ok().json(c)),
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("faq category update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// DELETE /api/faq/categories/{id}
#[delete("/faq/categories/{id}")]
pub async fn delete_category(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::delete_faq_category(&db, path.into_inner()).await {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("faq category delete failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/faq/items
#[post("/faq/items")]
pub async fn create_item(
    auth: AdminAuth,
    info: web::Json<ItemReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    if info.question.trim().is_empty() || info.answer.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("question and answer are required"));
    }
    match content_repo::create_faq_item(
        &db,
        info.category_id,
        info.question.trim(),
        &info.answer,
        info.order_index,
    )
    .await
    {
        Ok(i) => Ok(HttpResponse::Ok().json(i)),
        Err(e) => {
            log::error!("faq item create failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/faq/items/{id}
#[patch("/faq/items/{id}")]
pub async fn update_item(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<ItemPatchReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::update_faq_item(
        &db,
        path.into_inner(),
        info.question.as_deref(),
        info.answer.as_deref(),
        info.order_index,
    )
    .await
    {
        Ok(Some(i)) => Ok(HttpResponse::Ok().json(i)),
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("faq item update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// DELETE /api/faq/items/{id}
#[delete("/faq/items/{id}")]
pub async fn delete_item(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::delete_faq_item(&db, path.into_inner()).await {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("faq item delete failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/faq/items/reorder
#[post("/faq/items/reorder")]
pub async fn reorder_items(
    auth: AdminAuth,
    info: web::Json<ReorderReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::reorder(&db, Orderable::FaqItems, &info.ids).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => {
            log::error!("faq item reorder failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/faq/categories/reorder
#[post("/faq/categories/reorder")]
pub async fn reorder_categories(
    auth: AdminAuth,
    info: web::Json<ReorderReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::reorder(&db, Orderable::FaqCategories, &info.ids).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => {
            log::error!("faq category reorder failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(reorder_categories)
        .service(reorder_items)
        .service(create_category)
        .service(update_category)
        .service(delete_category)
        .service(create_item)
        .service(update_item)
        .service(delete_item);
}
