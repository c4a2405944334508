//! Character application workflow (create / edit / submit / review).

use actix_web::{get, patch, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::characters::CharacterStatus;
use crate::db::character_repo::{
    self, CharacterPatch, CreateOutcome, NewCharacter, TransitionOutcome, UpdateOutcome,
};
use crate::http::auth::{AdminAuth, Capability, UserAuth};
use crate::metrics;

//////////////////////////////////////////////////
// Requests
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct CreateReq {
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    #[serde(default)]
    pub backstory: String,
    pub appearance: Option<String>,
    #[serde(default = "empty_array")]
    pub character_traits: Value,
    #[serde(default = "empty_array")]
    pub skills: Value,
    #[serde(default = "empty_array")]
    pub inventory: Value,
    pub face_model_id: Option<Uuid>,
    /// Skip the draft stage and go straight to review.
    #[serde(default)]
    pub submit: bool,
}

fn empty_array() -> Value {
    json!([])
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct ReviewReq {
    pub approve: bool,
    pub rejection_reason: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusReq {
    pub status: String,
}

#[derive(Deserialize)]
pub struct NotesReq {
    pub admin_notes: Option<String>,
}

/// Build a patch from the fields actually present in the body; unknown keys
/// are ignored, mirroring the whitelisted dynamic UPDATE the routes perform.
fn patch_from_body(body: &Value) -> Result<CharacterPatch, String> {
    let obj = body.as_object().ok_or("body must be a JSON object")?;
    let mut p = CharacterPatch::default();

    for (key, v) in obj {
        match key.as_str() {
            "name" => {
                p.name = Some(v.as_str().ok_or("name must be a string")?.to_string());
            }
            "age" => {
                p.age = Some(if v.is_null() {
                    None
                } else {
                    Some(v.as_i64().ok_or("age must be a number")? as i32)
                });
            }
            "gender" => {
                p.gender = Some(if v.is_null() {
                    None
                } else {
                    Some(v.as_str().ok_or("gender must be a string")?.to_string())
                });
            }
            "backstory" => {
                p.backstory = Some(v.as_str().ok_or("backstory must be a string")?.to_string());
            }
            "appearance" => {
                p.appearance = Some(if v.is_null() {
                    None
                } else {
                    Some(v.as_str().ok_or("appearance must be a string")?.to_string())
                });
            }
            "character_traits" => {
                if !v.is_array() {
                    return Err("character_traits must be an array".into());
                }
                p.character_traits = Some(v.clone());
            }
            "skills" => {
                if !v.is_array() {
                    return Err("skills must be an array".into());
                }
                p.skills = Some(v.clone());
            }
            "inventory" => {
                if !v.is_array() {
                    return Err("inventory must be an array".into());
                }
                p.inventory = Some(v.clone());
            }
            "face_model_id" => {
                p.face_model_id = Some(if v.is_null() {
                    None
                } else {
                    let s = v.as_str().ok_or("face_model_id must be a UUID string")?;
                    Some(Uuid::parse_str(s).map_err(|_| "face_model_id must be a UUID string")?)
                });
            }
            _ => {} // not owner-writable
        }
    }
    Ok(p)
}

//////////////////////////////////////////////////
// Player routes
//////////////////////////////////////////////////

/// POST /api/characters
#[post("/characters")]
pub async fn create(
    auth: UserAuth,
    info: web::Json<CreateReq>,
    db: web::Data<PgPool>,
) -> impl Responder {
    if !auth.user.rules_passed {
        return HttpResponse::Forbidden().body("rules test not passed");
    }

    let info = info.into_inner();
    let do_submit = info.submit;
    let nc = NewCharacter {
        name: info.name,
        age: info.age,
        gender: info.gender,
        backstory: info.backstory,
        appearance: info.appearance,
        character_traits: info.character_traits,
        skills: info.skills,
        inventory: info.inventory,
        face_model_id: info.face_model_id,
    };

    match character_repo::create(&db, auth.user.id, nc, do_submit).await {
        Ok(CreateOutcome::Created(c)) => {
            if do_submit {
                metrics::CHARACTERS_SUBMITTED.inc();
            }
            HttpResponse::Ok().json(c)
        }
        Ok(CreateOutcome::SlotTaken) => {
            HttpResponse::Conflict().body("an active character already exists")
        }
        Ok(CreateOutcome::FaceTaken) => {
            HttpResponse::Conflict().body("face model already claimed")
        }
        Ok(CreateOutcome::FaceMissing) => HttpResponse::BadRequest().body("unknown face model"),
        Ok(CreateOutcome::Invalid(msg)) => HttpResponse::BadRequest().body(msg),
        Err(e) => {
            log::error!("character create failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Moderator notes never leave the admin panel.
fn owner_view(c: &crate::db::models::Character) -> Value {
    let mut sheet = serde_json::to_value(c).unwrap_or_default();
    if let Some(obj) = sheet.as_object_mut() {
        obj.remove("admin_notes");
    }
    sheet
}

/// GET /api/characters/mine
#[get("/characters/mine")]
pub async fn list_mine(auth: UserAuth, db: web::Data<PgPool>) -> impl Responder {
    match character_repo::list_mine(&db, auth.user.id).await {
        Ok(rows) => {
            let out: Vec<Value> = rows.iter().map(owner_view).collect();
            HttpResponse::Ok().json(out)
        }
        Err(e) => {
            log::error!("listing own characters failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// PATCH /api/characters/{id}
#[patch("/characters/{id}")]
pub async fn update(
    auth: UserAuth,
    path: web::Path<Uuid>,
    body: web::Json<Value>,
    db: web::Data<PgPool>,
) -> impl Responder {
    let patch = match patch_from_body(&body) {
        Ok(p) => p,
        Err(msg) => return HttpResponse::BadRequest().body(msg),
    };

    match character_repo::update_owner(&db, path.into_inner(), auth.user.id, patch).await {
        Ok(UpdateOutcome::Updated(c)) => HttpResponse::Ok().json(c),
        Ok(UpdateOutcome::NotFound) => HttpResponse::NotFound().finish(),
        Ok(UpdateOutcome::Forbidden) => HttpResponse::Forbidden().body("not your character"),
        Ok(UpdateOutcome::NotEditable) => {
            HttpResponse::Forbidden().body("character is not editable in its current status")
        }
        Ok(UpdateOutcome::FaceTaken) => {
            HttpResponse::Conflict().body("face model already claimed")
        }
        Ok(UpdateOutcome::FaceMissing) => HttpResponse::BadRequest().body("unknown face model"),
        Ok(UpdateOutcome::Invalid(msg)) => HttpResponse::BadRequest().body(msg),
        Err(e) => {
            log::error!("character update failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// POST /api/characters/{id}/submit
#[post("/characters/{id}/submit")]
pub async fn submit(auth: UserAuth, path: web::Path<Uuid>, db: web::Data<PgPool>) -> impl Responder {
    match character_repo::submit(&db, path.into_inner(), auth.user.id).await {
        Ok(TransitionOutcome::Done(c)) => {
            metrics::CHARACTERS_SUBMITTED.inc();
            HttpResponse::Ok().json(c)
        }
        Ok(TransitionOutcome::NotFound) => HttpResponse::NotFound().finish(),
        Ok(TransitionOutcome::Forbidden) => HttpResponse::Forbidden().body("not your character"),
        Ok(TransitionOutcome::InvalidTransition) => {
            HttpResponse::Forbidden().body("character cannot be submitted in its current status")
        }
        Ok(TransitionOutcome::SlotTaken) => {
            HttpResponse::Conflict().body("an active character already exists")
        }
        Ok(TransitionOutcome::Invalid(msg)) => HttpResponse::BadRequest().body(msg),
        Err(e) => {
            log::error!("character submit failed: {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// GET /api/characters/{id} — owner or any admin.
#[get("/characters/{id}")]
pub async fn fetch_one(
    req: actix_web::HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    use actix_web::FromRequest;

    let character = match character_repo::fetch(&db, path.into_inner()).await {
        Ok(Some(c)) => c,
        Ok(None) => return Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("character fetch failed: {e:?}");
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    // Admin tokens see every sheet (notes included); owners only their own.
    let mut payload = actix_web::dev::Payload::None;
    if AdminAuth::from_request(&req, &mut payload).await.is_ok() {
        return Ok(HttpResponse::Ok().json(character));
    }
    match UserAuth::from_request(&req, &mut payload).await {
        Ok(auth) if auth.user.id == character.user_id => {
            Ok(HttpResponse::Ok().json(owner_view(&character)))
        }
        Ok(_) => Ok(HttpResponse::Forbidden().body("not your character")),
        Err(e) => Err(e),
    }
}

//////////////////////////////////////////////////
// Admin routes
//////////////////////////////////////////////////

/// GET /api/characters
#[get("/characters")]
pub async fn list(
    auth: AdminAuth,
    query: web::Query<ListQuery>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ModerateCharacters)?;

    let status = match query.status.as_deref() {
        Some(s) => match CharacterStatus::parse(s) {
            Some(st) => Some(st),
            None => return Ok(HttpResponse::BadRequest().body("unknown status filter")),
        },
        None => None,
    };
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    match character_repo::list(&db, status, query.user_id, limit, offset).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(rows)),
        Err(e) => {
            log::error!("character list failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/characters/{id}/review
#[post("/characters/{id}/review")]
pub async fn review(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<ReviewReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ModerateCharacters)?;

    let info = info.into_inner();
    match character_repo::review(&db, path.into_inner(), info.approve, info.rejection_reason).await
    {
        Ok(TransitionOutcome::Done(c)) => {
            let verdict = if info.approve { "approved" } else { "rejected" };
            metrics::CHARACTERS_REVIEWED.with_label_values(&[verdict]).inc();
            Ok(HttpResponse::Ok().json(c))
        }
        Ok(TransitionOutcome::NotFound) => Ok(HttpResponse::NotFound().finish()),
        Ok(TransitionOutcome::InvalidTransition) => {
            Ok(HttpResponse::Conflict().body("character is not awaiting review"))
        }
        Ok(TransitionOutcome::SlotTaken) => {
            Ok(HttpResponse::Conflict().body("an active character already exists"))
        }
        Ok(TransitionOutcome::Forbidden) => Ok(HttpResponse::Forbidden().finish()),
        Ok(TransitionOutcome::Invalid(msg)) => Ok(HttpResponse::BadRequest().body(msg)),
        Err(e) => {
            log::error!("character review failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/characters/{id}/status — activate / archive / kill / reinstate.
#[post("/characters/{id}/status")]
pub async fn set_status(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<StatusReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ModerateCharacters)?;

    let Some(to) = CharacterStatus::parse(&info.status) else {
        return Ok(HttpResponse::BadRequest().body("unknown status"));
    };

    match character_repo::set_status(&db, path.into_inner(), to).await {
        Ok(TransitionOutcome::Done(c)) => Ok(HttpResponse::Ok().json(c)),
        Ok(TransitionOutcome::NotFound) => Ok(HttpResponse::NotFound().finish()),
        Ok(TransitionOutcome::InvalidTransition) => {
            Ok(HttpResponse::Conflict().body("transition not allowed"))
        }
        Ok(TransitionOutcome::SlotTaken) => {
            Ok(HttpResponse::Conflict().body("an active character already exists"))
        }
        Ok(TransitionOutcome::Forbidden) => Ok(HttpResponse::Forbidden().finish()),
        Ok(TransitionOutcome::Invalid(msg)) => Ok(HttpResponse::BadRequest().body(msg)),
        Err(e) => {
            log::error!("character status change failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/characters/{id}/notes
#[patch("/characters/{id}/notes")]
pub async fn set_notes(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<NotesReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ModerateCharacters)?;

    match character_repo::set_notes(&db, path.into_inner(), info.admin_notes.as_deref()).await {
        Ok(Some(c)) => Ok(HttpResponse::Ok().json(c)),
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("setting notes failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

//////////////////////////////////////////////////
// Mount
//////////////////////////////////////////////////
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(list_mine)
        .service(list)
        .service(submit)
        .service(review)
        .service(set_status)
        .service(set_notes)
        .service(update)
        .service(fetch_one);
}
