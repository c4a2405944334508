use crate::http;
use actix_web::web;

/// Mount every HTTP sub-module under `/api`.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(http::auth::init_routes)
            .configure(http::users::init_routes)
            .configure(http::characters::init_routes)
            .configure(http::admin::init_routes)
            .configure(http::rules::init_routes)
            .configure(http::questions::init_routes)
            .configure(http::test_submissions::init_routes)
            .configure(http::faq::init_routes)
            .configure(http::face_models::init_routes)
            .configure(http::media::init_routes)
            .configure(http::health::init_routes),
    );
}
