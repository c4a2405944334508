//! In-memory warm cache for the face-model catalogue.
//!
//! The catalogue is small, read on every character-wizard page load, and only
//! changes through the admin content routes, so the whole table is held in
//! memory and refreshed on writes.  Auth state is deliberately NOT cached:
//! every authenticated request re-reads its user/admin row.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::FaceModel;

/// Global map id → FaceModel, refreshed by the admin CRUD handlers.
pub static FACE_MODELS: Lazy<DashMap<Uuid, FaceModel>> = Lazy::new(DashMap::new);

/// Fetch the `face_models` table and populate [`FACE_MODELS`]. Idempotent.
pub async fn warm_face_models(db: &PgPool) -> anyhow::Result<()> {
    let rows = sqlx::query_as::<_, FaceModel>(
        "SELECT id, name, gender, image_url, is_unique, created_at FROM face_models",
    )
    .fetch_all(db)
    .await?;

    for fm in rows {
        FACE_MODELS.insert(fm.id, fm);
    }
    Ok(())
}

/// Retrieve a cached face model by ID.
pub fn get_face_model(id: Uuid) -> Option<FaceModel> {
    FACE_MODELS.get(&id).map(|e| e.value().clone())
}

/// Insert or replace one entry (after an admin create/update).
pub fn put_face_model(fm: FaceModel) {
    FACE_MODELS.insert(fm.id, fm);
}

/// Drop one entry (after an admin delete).
pub fn remove_face_model(id: Uuid) {
    FACE_MODELS.remove(&id);
}

/// Warm every in-memory cache we have (called once at startup).
pub async fn warm_all(db: &PgPool) {
    if let Err(e) = warm_face_models(db).await {
        log::warn!("cache warm-up failed: {e:?}");
    }
}
