use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::FaceModel;

pub async fn list(db: &PgPool) -> Result<Vec<FaceModel>> {
    sqlx::query_as::<_, FaceModel>("SELECT * FROM face_models ORDER BY name")
        .fetch_all(db)
        .await
        .context("listing face models")
}

pub async fn fetch(db: &PgPool, id: Uuid) -> Result<Option<FaceModel>> {
    sqlx::query_as::<_, FaceModel>("SELECT * FROM face_models WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching face model")
}

/// Advisory availability check for the character wizard.  The binding answer
/// is re-taken under lock when the claim is written.
pub async fn is_available(db: &PgPool, id: Uuid) -> Result<Option<bool>> {
    let Some(fm) = fetch(db, id).await? else {
        return Ok(None);
    };
    if !fm.is_unique {
        return Ok(Some(true));
    }

    let claimed: bool = sqlx::query_scalar(
        r#"SELECT EXISTS(
               SELECT 1 FROM characters
                WHERE face_model_id = $1 AND status <> 'dead'
           )"#,
    )
    .bind(id)
    .fetch_one(db)
    .await
    .context("scanning face claims")?;

    Ok(Some(!claimed))
}

pub async fn create(
    db: &PgPool,
    name: &str,
    gender: &str,
    image_url: &str,
    is_unique: bool,
) -> Result<FaceModel> {
    sqlx::query_as::<_, FaceModel>(
        r#"INSERT INTO face_models (name, gender, image_url, is_unique)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(name)
    .bind(gender)
    .bind(image_url)
    .bind(is_unique)
    .fetch_one(db)
    .await
    .context("creating face model")
}

#[derive(Debug, Default)]
pub struct FaceModelPatch {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub image_url: Option<String>,
    pub is_unique: Option<bool>,
}

pub async fn update(db: &PgPool, id: Uuid, patch: FaceModelPatch) -> Result<Option<FaceModel>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE face_models SET name = name");
    if let Some(v) = &patch.name {
        qb.push(", name = ").push_bind(v.clone());
    }
    if let Some(v) = &patch.gender {
        qb.push(", gender = ").push_bind(v.clone());
    }
    if let Some(v) = &patch.image_url {
        qb.push(", image_url = ").push_bind(v.clone());
    }
    if let Some(v) = patch.is_unique {
        qb.push(", is_unique = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");

    qb.build_query_as::<FaceModel>()
        .fetch_optional(db)
        .await
        .context("updating face model")
}

/// Refuses deletion while any character still references the model.
pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
    let referenced: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM characters WHERE face_model_id = $1)",
    )
    .bind(id)
    .fetch_one(db)
    .await
    .context("checking face references")?;
    if referenced {
        anyhow::bail!("face model is still referenced by a character");
    }

    let rows = sqlx::query("DELETE FROM face_models WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting face model")?
        .rows_affected();
    Ok(rows > 0)
}
