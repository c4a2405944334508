//! Admin login + account management (super_admin only).

use actix_web::{get, patch, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::env;
use uuid::Uuid;

use crate::db::admin_repo::{self, AdminPatch};
use crate::db::models::Admin;
use crate::http::auth::{self, AdminAuth, AdminRole, Capability};

//////////////////////////////////////////////////
// DTOs
//////////////////////////////////////////////////

/// Admin row with the hash stripped.
#[derive(Serialize)]
pub struct AdminRow {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub permissions: Value,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Admin> for AdminRow {
    fn from(a: Admin) -> Self {
        AdminRow {
            id: a.id,
            username: a.username,
            role: a.role,
            permissions: a.permissions,
            is_active: a.is_active,
            created_at: a.created_at,
            last_login: a.last_login,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminRow,
}

#[derive(Deserialize)]
pub struct CreateReq {
    pub username: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateReq {
    pub role: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

//////////////////////////////////////////////////
// POST /api/admin/login
//////////////////////////////////////////////////
#[post("/admin/login")]
pub async fn login(info: web::Json<LoginReq>, db: web::Data<PgPool>) -> impl Responder {
    let admin = match admin_repo::fetch_by_username(&db, &info.username).await {
        Ok(Some(a)) => a,
        Ok(None) => return HttpResponse::Unauthorized().body("invalid credentials"),
        Err(e) => {
            log::error!("admin lookup failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // Deactivated accounts fail even with the right password.
    if !admin.is_active {
        return HttpResponse::Forbidden().body("account deactivated");
    }

    match bcrypt::verify(&info.password, &admin.password_hash) {
        Ok(true) => {}
        Ok(false) => return HttpResponse::Unauthorized().body("invalid credentials"),
        Err(e) => {
            log::error!("bcrypt verify failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    let secret = match env::var("JWT_SECRET") {
        Ok(s) => s,
        Err(_) => return HttpResponse::InternalServerError().finish(),
    };
    let token = match auth::encode_token(&auth::admin_claims(&admin), secret.as_bytes()) {
        Ok(t) => t,
        Err(e) => {
            log::error!("JWT encode failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = admin_repo::touch_last_login(&db, admin.id).await {
        log::warn!("last_login update failed: {e:?}");
    }

    HttpResponse::Ok().json(LoginResponse {
        token,
        admin: admin.into(),
    })
}

//////////////////////////////////////////////////
// Account management
//////////////////////////////////////////////////

/// GET /api/admin/me
#[get("/admin/me")]
pub async fn me(auth: AdminAuth) -> impl Responder {
    HttpResponse::Ok().json(AdminRow::from(auth.admin))
}

/// GET /api/admin/accounts
#[get("/admin/accounts")]
pub async fn list_accounts(auth: AdminAuth, db: web::Data<PgPool>) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageAdmins)?;

    match admin_repo::list_admins(&db).await {
        Ok(rows) => Ok(HttpResponse::Ok()
            .json(rows.into_iter().map(AdminRow::from).collect::<Vec<_>>())),
        Err(e) => {
            log::error!("admin list failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// POST /api/admin/accounts
#[post("/admin/accounts")]
pub async fn create_account(
    auth: AdminAuth,
    info: web::Json<CreateReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageAdmins)?;

    if AdminRole::parse(&info.role).is_none() {
        return Ok(HttpResponse::BadRequest().body("unknown role"));
    }
    if info.username.trim().len() < 3 {
        return Ok(HttpResponse::BadRequest().body("username is too short"));
    }
    if info.password.len() < 10 {
        return Ok(HttpResponse::BadRequest().body("password is too short"));
    }

    let hash = match bcrypt::hash(&info.password, bcrypt::DEFAULT_COST) {
        Ok(h) => h,
        Err(e) => {
            log::error!("bcrypt hash failed: {e:?}");
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let permissions = json!(info.permissions);

    match admin_repo::create_admin(&db, info.username.trim(), &hash, &info.role, &permissions).await
    {
        Ok(Some(a)) => Ok(HttpResponse::Ok().json(AdminRow::from(a))),
        Ok(None) => Ok(HttpResponse::Conflict().body("username already taken")),
        Err(e) => {
            log::error!("admin create failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// PATCH /api/admin/accounts/{id}
#[patch("/admin/accounts/{id}")]
pub async fn update_account(
    auth: AdminAuth,
    path: web::Path<Uuid>,
    info: web::Json<UpdateReq>,
    db: web::Data<PgPool>,
) -> actix_web::Result<HttpResponse> {
    auth.require(Capability::ManageAdmins)?;

    let id = path.into_inner();
    let info = info.into_inner();

    // No self-lockout: a super_admin cannot deactivate their own account.
    if info.is_active == Some(false) && id == auth.admin.id {
        return Ok(HttpResponse::BadRequest().body("cannot deactivate yourself"));
    }

    if let Some(role) = &info.role {
        if AdminRole::parse(role).is_none() {
            return Ok(HttpResponse::BadRequest().body("unknown role"));
        }
    }

    let password_hash = match &info.password {
        Some(pw) => {
            if pw.len() < 10 {
                return Ok(HttpResponse::BadRequest().body("password is too short"));
            }
            match bcrypt::hash(pw, bcrypt::DEFAULT_COST) {
                Ok(h) => Some(h),
                Err(e) => {
                    log::error!("bcrypt hash failed: {e:?}");
                    return Ok(HttpResponse::InternalServerError().finish());
                }
            }
        }
        None => None,
    };

    let patch = AdminPatch {
        role: info.role,
        permissions: info.permissions.map(|p| json!(p)),
        is_active: info.is_active,
        password_hash,
    };
    if patch.is_empty() {
        return Ok(HttpResponse::BadRequest().body("nothing to update"));
    }

    match admin_repo::update_admin(&db, id, patch).await {
        Ok(Some(a)) => Ok(HttpResponse::Ok().json(AdminRow::from(a))),
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(e) => {
            log::error!("admin update failed: {e:?}");
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(me)
        .service(list_accounts)
        .service(create_account)
        .service(update_account);
}
