//! Serves the built frontend bundle, falling back to index.html so the SPA
//! router owns every non-API path.

use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::{get, web};
use std::path::PathBuf;

use crate::config::settings;

/// Browsers refuse a manifest served as text/plain, so pin the type.
#[get("/site.webmanifest")]
pub async fn webmanifest() -> actix_web::Result<NamedFile> {
    let path = PathBuf::from(&settings().static_dir).join("site.webmanifest");
    let file = NamedFile::open_async(path).await?;
    Ok(file.set_content_type(
        "application/manifest+json"
            .parse()
            .expect("static mime literal"),
    ))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    let static_dir = settings().static_dir.clone();
    let index = PathBuf::from(&static_dir).join("index.html");

    cfg.service(webmanifest).service(
        Files::new("/", static_dir)
            .index_file("index.html")
            .prefer_utf8(true)
            .default_handler(fn_service(move |req: ServiceRequest| {
                let index = index.clone();
                async move {
                    let (req, _) = req.into_parts();
                    let file = NamedFile::open_async(index).await?;
                    let res = file.into_response(&req);
                    Ok(ServiceResponse::new(req, res))
                }
            })),
    );
}
