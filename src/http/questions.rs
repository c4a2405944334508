//! Rules-test question bank.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::question_repo;
use crate::http::auth::{AdminAuth, Capability};

/// Public view of a question — no moderation fields.
#[derive(Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question: String,
    pub hint: Option<String>,
    pub order_index: i32,
}

#[derive(Deserialize)]
pub struct CreateReq {
    pub question: String,
    pub hint: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

/// GET /api/questions — the active bank shown to test takers.
#[get("/questions")]
pub async fn list_active(db: web::Data<PgPool>) -> impl Responder {
    match question_repo::list_active_questions(&db).await {
        Ok(rows) => {
            let out: Vec<PublicQuestion> = rows
                .into_iter()
                .map(|q| PublicQuestion {
                    id: q.id,
                    question: q.question,
                    hint: q.hint,
                    order_index: q.order_index,
                })
                .collect();
            HttpResponse::Ok().json(out)
        }
        Err(e) => {
            log::error!("question list failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// GET /api/questions/all
#[get("/questions/all")]
pub async fn list_all(auth: AdminAuth, db: web::Data<PgPool>) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::GradeTests)?;

    match question_repo::list_all_questions(&db).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(rows)),
        Err(e) => {
            log::error!("question list failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/questions
#[post("/questions")]
pub async fn create(
    auth: AdminAuth,
    info: web::Json<CreateReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::GradeTests)?;

    if info.question.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("question text is required"));
    }

    match question_repo::create_question(
        &db,
        info.question.trim(),
        info.hint.as_deref(),
        info.order_index,
    )
    .await
    {
        Ok(q) => Ok(HttpResponse::Ok().json(q)),
        Err(e) => {
            log::error!("question create failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/questions/{id} — whitelisted fields present in the body.
#[patch("/questions/{id}")]
pub async fn update(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    body: web::Json<Value>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::GradeTests)?;

    let Some(obj) = body.as_object() else {
        return Ok(HttpResponse::BadRequest().body("body must be a JSON object"));
    };

    let question = obj.get("question").and_then(Value::as_str);
    let hint = obj.get("hint").map(|v| v.as_str());
    let order_index = obj
        .get("order_index")
        .and_then(Value::as_i64)
        .map(|v| v as i32);
    let is_active = obj.get("is_active").and_then(Value::as_bool);

    match question_repo::update_question(&db, path.into_inner(), question, hint, order_index, is_active)
        .await
    {
        Ok(Some(q)) => Ok(HttpResponse::Ok().json(q)),
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("question update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// DELETE /api/questions/{id} — soft: the question leaves the active bank.
#[delete("/questions/{id}")]
pub async fn remove(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::GradeTests)?;

    match question_repo::deactivate_question(&db, path.into_inner()).await {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("question deactivate failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_active)
        .service(list_all)
        .service(create)
        .service(update)
        .service(remove);
}
