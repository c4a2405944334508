//! Steam OpenID login (user JWT) + bearer-token extractors.
//!
//! Tokens are stateless but authorization is not: both extractors re-fetch
//! their row from Postgres on every request, so bans and deactivations take
//! effect immediately.

use actix_web::{get, http::header, web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::env;

use crate::config::settings;
use crate::db::user_repo;
use crate::steam;

//////////////////////////////////////////////////
// Claims
//////////////////////////////////////////////////

#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,  // user id
    pub sid: String,  // steam64 id
    pub nick: String, // steam nickname at issue time
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String, // admin id
    pub username: String,
    pub role: String,
    pub typ: String, // always "admin"
    pub exp: usize,
}

pub fn user_claims(user: &crate::db::models::User) -> UserClaims {
    let exp = Utc::now()
        .checked_add_signed(Duration::days(settings().user_token_days))
        .unwrap_or_else(Utc::now)
        .timestamp() as usize;
    UserClaims {
        sub: user.id.to_string(),
        sid: user.steam_id.clone(),
        nick: user.steam_nickname.clone(),
        exp,
    }
}

pub fn admin_claims(admin: &crate::db::models::Admin) -> AdminClaims {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(settings().admin_token_hours))
        .unwrap_or_else(Utc::now)
        .timestamp() as usize;
    AdminClaims {
        sub: admin.id.to_string(),
        username: admin.username.clone(),
        role: admin.role.clone(),
        typ: "admin".into(),
        exp,
    }
}

pub fn encode_token<C: Serialize>(claims: &C, secret: &[u8]) -> anyhow::Result<String> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret),
    )?)
}

pub fn decode_user_claims(token: &str, secret: &[u8]) -> anyhow::Result<UserClaims> {
    Ok(decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )?
    .claims)
}

pub fn decode_admin_claims(token: &str, secret: &[u8]) -> anyhow::Result<AdminClaims> {
    let claims = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )?
    .claims;
    if claims.typ != "admin" {
        anyhow::bail!("not an admin token");
    }
    Ok(claims)
}

fn jwt_secret() -> anyhow::Result<String> {
    env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))
}

//////////////////////////////////////////////////
// Roles & capabilities
//////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRole {
    SuperAdmin,
    Moderator,
    ContentManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ModerateCharacters,
    ManageContent,
    ManageAdmins,
    ManageUsers,
    GradeTests,
}

impl AdminRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(AdminRole::SuperAdmin),
            "moderator" => Some(AdminRole::Moderator),
            "content_manager" => Some(AdminRole::ContentManager),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Moderator => "moderator",
            AdminRole::ContentManager => "content_manager",
        }
    }

    pub fn allows(self, cap: Capability) -> bool {
        match self {
            AdminRole::SuperAdmin => true,
            AdminRole::Moderator => matches!(
                cap,
                Capability::ModerateCharacters | Capability::ManageUsers | Capability::GradeTests
            ),
            AdminRole::ContentManager => matches!(cap, Capability::ManageContent),
        }
    }
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ModerateCharacters => "moderate_characters",
            Capability::ManageContent => "manage_content",
            Capability::ManageAdmins => "manage_admins",
            Capability::ManageUsers => "manage_users",
            Capability::GradeTests => "grade_tests",
        }
    }
}

//////////////////////////////////////////////////
// ───────────── extractors ─────────────
//////////////////////////////////////////////////

pub mod extractor {
    use super::*;
    use actix_web::{
        dev::Payload,
        error::{ErrorForbidden, ErrorInternalServerError, ErrorUnauthorized},
        FromRequest, HttpRequest, Result as ActixResult,
    };
    use futures_util::future::LocalBoxFuture;
    use uuid::Uuid;

    use crate::db::admin_repo;
    use crate::db::models::{Admin, User};

    fn bearer_token(req: &HttpRequest) -> ActixResult<String> {
        let hdr = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ErrorUnauthorized("missing Authorization header"))?;
        let token = hdr
            .strip_prefix("Bearer ")
            .ok_or_else(|| ErrorUnauthorized("malformed Authorization header"))?;
        Ok(token.to_string())
    }

    fn pool(req: &HttpRequest) -> ActixResult<web::Data<PgPool>> {
        req.app_data::<web::Data<PgPool>>()
            .cloned()
            .ok_or_else(|| ErrorInternalServerError("db pool missing"))
    }

    /// A verified player: token decoded AND the user row re-fetched.
    #[derive(Debug, Clone)]
    pub struct UserAuth {
        pub user: User,
    }

    impl FromRequest for UserAuth {
        type Error = actix_web::Error;
        type Future = LocalBoxFuture<'static, ActixResult<Self>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let req = req.clone();
            Box::pin(async move {
                let token = bearer_token(&req)?;
                let secret = jwt_secret().map_err(|_| ErrorUnauthorized("server mis-config"))?;
                let claims = decode_user_claims(&token, secret.as_bytes())
                    .map_err(|_| ErrorUnauthorized("invalid / expired token"))?;
                let user_id =
                    Uuid::parse_str(&claims.sub).map_err(|_| ErrorUnauthorized("bad sub"))?;

                let db = pool(&req)?;
                let user = user_repo::fetch_user(&db, user_id)
                    .await
                    .map_err(ErrorInternalServerError)?
                    .ok_or_else(|| ErrorUnauthorized("unknown user"))?;

                if user.is_banned {
                    return Err(ErrorForbidden("account banned"));
                }
                Ok(UserAuth { user })
            })
        }
    }

    /// A verified admin: token decoded, row re-fetched, deactivation checked.
    #[derive(Debug, Clone)]
    pub struct AdminAuth {
        pub admin: Admin,
        pub role: AdminRole,
    }

    impl AdminAuth {
        /// 403 unless the role (or an explicit permission grant) covers `cap`.
        pub fn require(&self, cap: Capability) -> ActixResult<()> {
            if self.role.allows(cap) {
                return Ok(());
            }
            let granted = self
                .admin
                .permissions
                .as_array()
                .map(|a| a.iter().any(|p| p.as_str() == Some(cap.as_str())))
                .unwrap_or(false);
            if granted {
                Ok(())
            } else {
                Err(ErrorForbidden("insufficient privilege"))
            }
        }
    }

    impl FromRequest for AdminAuth {
        type Error = actix_web::Error;
        type Future = LocalBoxFuture<'static, ActixResult<Self>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let req = req.clone();
            Box::pin(async move {
                let token = bearer_token(&req)?;
                let secret = jwt_secret().map_err(|_| ErrorUnauthorized("server mis-config"))?;
                let claims = decode_admin_claims(&token, secret.as_bytes())
                    .map_err(|_| ErrorUnauthorized("invalid / expired token"))?;
                let admin_id =
                    Uuid::parse_str(&claims.sub).map_err(|_| ErrorUnauthorized("bad sub"))?;

                let db = pool(&req)?;
                let admin = admin_repo::fetch_admin(&db, admin_id)
                    .await
                    .map_err(ErrorInternalServerError)?
                    .ok_or_else(|| ErrorUnauthorized("unknown admin"))?;

                if !admin.is_active {
                    return Err(ErrorForbidden("account deactivated"));
                }
                let role = AdminRole::parse(&admin.role)
                    .ok_or_else(|| ErrorInternalServerError("unknown role"))?;
                Ok(AdminAuth { admin, role })
            })
        }
    }
}
pub use extractor::{AdminAuth, UserAuth};

//////////////////////////////////////////////////
// GET /api/steam-auth/login
//////////////////////////////////////////////////
#[get("/steam-auth/login")]
pub async fn steam_login() -> impl Responder {
    let url = steam::login_url(&settings().public_url);
    HttpResponse::Found()
        .append_header((header::LOCATION, url))
        .finish()
}

//////////////////////////////////////////////////
// GET /api/steam-auth/return
//////////////////////////////////////////////////
#[get("/steam-auth/return")]
pub async fn steam_return(
    query: web::Query<HashMap<String, String>>,
    db: web::Data<PgPool>,
    client: web::Data<reqwest::Client>,
) -> impl Responder {
    // 1) verify the assertion with Steam
    let steam_id = match steam::verify_assertion(&client, &query).await {
        Ok(id) => id,
        Err(e) => {
            log::warn!("steam login rejected: {e:?}");
            return HttpResponse::Unauthorized().body("steam verification failed");
        }
    };

    // 2) persona name is best-effort
    let nickname = match settings().steam_api_key.as_deref() {
        Some(key) => steam::fetch_persona_name(&client, key, &steam_id)
            .await
            .unwrap_or_else(|e| {
                log::warn!("persona lookup failed: {e:?}");
                None
            }),
        None => None,
    };

    // 3) upsert user
    let user = match user_repo::upsert_steam_user(&db, &steam_id, nickname.as_deref()).await {
        Ok(u) => u,
        Err(e) => {
            log::error!("user upsert failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if user.is_banned {
        return HttpResponse::Forbidden().body("account banned");
    }

    // 4) issue JWT and hand control back to the SPA
    let secret = match jwt_secret() {
        Ok(s) => s,
        Err(_) => return HttpResponse::InternalServerError().finish(),
    };
    let token = match encode_token(&user_claims(&user), secret.as_bytes()) {
        Ok(t) => t,
        Err(e) => {
            log::error!("JWT encode failed: {e:?}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let target = format!(
        "{}/auth/callback#token={token}",
        settings().frontend_url.trim_end_matches('/')
    );
    HttpResponse::Found()
        .append_header((header::LOCATION, target))
        .finish()
}

//////////////////////////////////////////////////
// Mount
//////////////////////////////////////////////////
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(steam_login).service(steam_return);
}
