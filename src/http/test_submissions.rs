//! Rules-test submissions: players answer, moderators grade.

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::question_repo::{self, GradeOutcome, SubmitOutcome};
use crate::http::auth::{AdminAuth, Capability, UserAuth};
use crate::metrics;

#[derive(Deserialize)]
pub struct SubmitReq {
    /// Array of {question_id, answer}.
    pub answers: Value,
}

#[derive(Deserialize)]
pub struct GradeReq {
    /// Array of {question_id, correct, comment?}.
    pub grades: Value,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/test-submissions
#[post("/test-submissions")]
pub async fn submit(
    auth: UserAuth,
    info: web::Json<SubmitReq>,
    db: web::Data<PgPool>,
) -> impl Responder {
    if auth.user.rules_passed {
        return HttpResponse::Conflict().body("rules test already passed");
    }

    match question_repo::create_submission(&db, auth.user.id, &info.answers).await {
        Ok(SubmitOutcome::Created(s)) => HttpResponse::Ok().json(s),
        Ok(SubmitOutcome::AlreadyPending) => {
            HttpResponse::Conflict().body("a submission is already awaiting grading")
        }
        Ok(SubmitOutcome::NoQuestions) => {
            HttpResponse::Conflict().body("the question bank is empty")
        }
        Ok(SubmitOutcome::Invalid(msg)) => HttpResponse::BadRequest().body(msg),
        Err(e) => {
            log::error!("submission failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// GET /api/test-submissions/mine
#[get("/test-submissions/mine")]
pub async fn list_mine(auth: UserAuth, db: web::Data<PgPool>) -> impl Responder {
    match question_repo::list_own_submissions(&db, auth.user.id).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => {
            log::error!("listing own submissions failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// GET /api/test-submissions
#[get("/test-submissions")]
pub async fn list(
    auth: AdminAuth,
    query: web::Query<ListQuery>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::GradeTests)?;

    let status = match query.status.as_deref() {
        None => None,
        Some(s @ ("pending" | "graded")) => Some(s),
        Some(_) => return Ok(HttpResponse::BadRequest().body("unknown status filter")),
    };
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    match question_repo::list_submissions(&db, status, limit, offset).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(rows)),
        Err(e) => {
            log::error!("listing submissions failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/test-submissions/{id}/grade
#[post("/test-submissions/{id}/grade")]
pub async fn grade(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<GradeReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::GradeTests)?;

    match question_repo::grade_submission(&db, path.into_inner(), auth.admin.id, &info.grades).await
    {
        Ok(GradeOutcome::Graded { submission, passed }) => {
            let outcome = if passed { "passed" } else { "failed" };
            metrics::TESTS_GRADED.with_label_values(&[outcome]).inc();
            Ok(HttpResponse::Ok().json(submission))
        }
        Ok(GradeOutcome::NotFound) => Ok(HttpResponse::NotFound().finish()),
        Ok(GradeOutcome::AlreadyGraded) => {
            Ok(HttpResponse::Conflict().body("submission already graded"))
        }
        Ok(GradeOutcome::Invalid(msg)) => Ok(HttpResponse::BadRequest().body(msg)),
        Err(e) => {
            log::error!("grading failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(submit)
        .service(list_mine)
        .service(list)
        .service(grade);
}
