//! Rules knowledge base: public read, content-manager CRUD.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::content_repo::{self, Orderable};
use crate::db::models::{Rule, RuleCategory};
use crate::http::auth::{AdminAuth, Capability};

#[derive(Serialize)]
pub struct CategoryWithRules {
    #[serde(flatten)]
    pub category: RuleCategory,
    pub rules: Vec<Rule>,
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
pub struct RuleReq {
    pub category_id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Deserialize)]
pub struct RulePatchReq {
    pub title: Option<String>,
    pub body: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Deserialize)]
pub struct ReorderReq {
    pub ids: Vec<Uuid>,
}

/// GET /api/rules — the whole book, categories with rules nested.
#[get("/rules")]
pub async fn list(db: web::Data<PgPool>) -> impl Responder {
    let categories = match content_repo::list_rule_categories(&db).await {
        Ok(c) => c,
        Err(e) => {
            log::error!("rule category list failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    };
    let rules = match content_repo::list_rules(&db).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("rule list failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let out: Vec<CategoryWithRules> = categories
        .into_iter()
        .map(|category| {
            let rules = rules
                .iter()
                .filter(|r| r.category_id == category.id)
                .cloned()
                .collect();
            CategoryWithRules { category, rules }
        })
        .collect();

    HttpResponse::Ok().json(out)
}

/// POST /api/rules/categories
#[post("/rules/categories")]
pub async fn create_category(
    auth: AdminAuth,
    info: web::Json<CategoryReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    if info.title.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("title is required"));
    }
    match content_repo::create_rule_category(&db, info.title.trim(), info.order_index).await {
        Ok(c) => Ok(HttpResponse::Ok().json(c)),
        Err(e) => {
            log::error!("rule category create failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/rules/categories/{id}
#[patch("/rules/categories/{id}")]
pub async fn update_category(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<CategoryPatchReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::update_rule_category(
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
            log::error!("rule category update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// DELETE /api/rules/categories/{id}
#[delete("/rules/categories/{id}")]
pub async fn delete_category(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::delete_rule_category(&db, path.into_inner()).await {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("rule category delete failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/rules/categories/reorder
#[post("/rules/categories/reorder")]
pub async fn reorder_categories(
    auth: AdminAuth,
    info: web::Json<ReorderReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::reorder(&db, Orderable::RuleCategories, &info.ids).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => {
            log::error!("rule category reorder failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/rules
#[post("/rules")]
pub async fn create_rule(
    auth: AdminAuth,
    info: web::Json<RuleReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    if info.title.trim().is_empty() || info.body.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("title and body are required"));
    }
    match content_repo::create_rule(
        &db,
        info.category_id,
        info.title.trim(),
        &info.body,
        info.order_index,
    )
    .await
    {
        Ok(r) => Ok(HttpResponse::Ok().json(r)),
        Err(e) => {
            log::error!("rule create failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/rules/{id}
#[patch("/rules/{id}")]
pub async fn update_rule(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<RulePatchReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::update_rule(
        &db,
        path.into_inner(),
        info.title.as_deref(),
        info.body.as_deref(),
        info.order_index,
    )
    .await
    {
        Ok(Some(r)) => Ok(HttpResponse::Ok().json(r)),
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("rule update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// DELETE /api/rules/{id}
#[delete("/rules/{id}")]
pub async fn delete_rule(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::delete_rule(&db, path.into_inner()).await {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("rule delete failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/rules/reorder
#[post("/rules/reorder")]
pub async fn reorder_rules(
    auth: AdminAuth,
    info: web::Json<ReorderReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageContent)?;

    match content_repo::reorder(&db, Orderable::Rules, &info.ids).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => {
            log::error!("rule reorder failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create_category)
        .service(update_category)
        .service(delete_category)
        .service(reorder_categories)
        .service(reorder_rules)
        .service(create_rule)
        .service(update_rule)
        .service(delete_rule);
}
