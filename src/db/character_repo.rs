//! Character storage + the only code allowed to move a sheet between states.
//!
//! The one-slot-per-user invariant is backed by a partial unique index, so
//! creation/resubmission conflicts surface as 23505 instead of racing a
//! SELECT. Unique face-model claims are checked under a row lock inside the
//! same transaction as the write.

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::models::Character;
use crate::characters::{status::transition_allowed, validate, Actor, CharacterStatus};

const SLOT_INDEX: &str = "characters_one_slot_per_user";

#[derive(Debug)]
pub struct NewCharacter {
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub backstory: String,
    pub appearance: Option<String>,
    pub character_traits: Value,
    pub skills: Value,
    pub inventory: Value,
    pub face_model_id: Option<Uuid>,
}

/// Owner-editable fields; `Some(None)` clears a nullable column.
#[derive(Debug, Default)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub age: Option<Option<i32>>,
    pub gender: Option<Option<String>>,
    pub backstory: Option<String>,
    pub appearance: Option<Option<String>>,
    pub character_traits: Option<Value>,
    pub skills: Option<Value>,
    pub inventory: Option<Value>,
    pub face_model_id: Option<Option<Uuid>>,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(Character),
    SlotTaken,
    FaceMissing,
    FaceTaken,
    Invalid(String),
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(Character),
    NotFound,
    Forbidden,
    NotEditable,
    FaceMissing,
    FaceTaken,
    Invalid(String),
}

#[derive(Debug)]
pub enum TransitionOutcome {
    Done(Character),
    NotFound,
    Forbidden,
    InvalidTransition,
    SlotTaken,
    Invalid(String),
}

enum FaceCheck {
    Free,
    Missing,
    Taken,
}

/// Lock the face-model row, then scan for a living claimant.  Must run inside
/// the transaction that writes the claim.
async fn face_claim_free(
    tx: &mut Transaction<'_, Postgres>,
    face_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<FaceCheck> {
    let is_unique: Option<bool> =
        sqlx::query_scalar("SELECT is_unique FROM face_models WHERE id = $1 FOR UPDATE")
            .bind(face_id)
            .fetch_optional(&mut **tx)
            .await
            .context("locking face model")?;

    let Some(is_unique) = is_unique else {
        return Ok(FaceCheck::Missing);
    };
    if !is_unique {
        return Ok(FaceCheck::Free);
    }

    let claimed: bool = sqlx::query_scalar(
        r#"SELECT EXISTS(
               SELECT 1 FROM characters
                WHERE face_model_id = $1
                  AND status <> 'dead'
                  AND ($2::uuid IS NULL OR id <> $2)
           )"#,
    )
    .bind(face_id)
    .bind(exclude)
    .fetch_one(&mut **tx)
    .await
    .context("scanning face claims")?;

    Ok(if claimed {
        FaceCheck::Taken
    } else {
        FaceCheck::Free
    })
}

fn is_slot_conflict(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(d) if d.constraint() == Some(SLOT_INDEX))
}

/// Create a sheet at `draft`, or straight at `pending` when the owner submits
/// in one step.
pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    nc: NewCharacter,
    submit: bool,
) -> Result<CreateOutcome> {
    if let Err(msg) = validate::validate_draft(&nc.name, nc.age) {
        return Ok(CreateOutcome::Invalid(msg));
    }
    if submit {
        if let Err(msg) = validate::ready_for_review(
            &nc.name,
            nc.age,
            nc.gender.as_deref(),
            &nc.backstory,
            nc.face_model_id.is_some(),
        ) {
            return Ok(CreateOutcome::Invalid(msg));
        }
    }

    let mut tx = db.begin().await.context("starting create tx")?;

    if let Some(fid) = nc.face_model_id {
        match face_claim_free(&mut tx, fid, None).await? {
            FaceCheck::Missing => return Ok(CreateOutcome::FaceMissing),
            FaceCheck::Taken => return Ok(CreateOutcome::FaceTaken),
            FaceCheck::Free => {}
        }
    }

    let status = if submit {
        CharacterStatus::Pending
    } else {
        CharacterStatus::Draft
    };

    let res = sqlx::query_as::<_, Character>(
        r#"INSERT INTO characters
               (user_id, status, name, age, gender, backstory, appearance,
                character_traits, skills, inventory, face_model_id, submitted_at)
           VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,
                   CASE WHEN $2 = 'pending' THEN NOW() END)
           RETURNING *"#,
    )
    .bind(user_id)
    .bind(status.as_str())
    .bind(&nc.name)
    .bind(nc.age)
    .bind(&nc.gender)
    .bind(&nc.backstory)
    .bind(&nc.appearance)
    .bind(&nc.character_traits)
    .bind(&nc.skills)
    .bind(&nc.inventory)
    .bind(nc.face_model_id)
    .fetch_one(&mut *tx)
    .await;

    let character = match res {
        Ok(c) => c,
        Err(e) if is_slot_conflict(&e) => return Ok(CreateOutcome::SlotTaken),
        Err(e) => return Err(e).context("inserting character"),
    };

    tx.commit().await.context("committing create tx")?;
    Ok(CreateOutcome::Created(character))
}

pub async fn fetch(db: &PgPool, id: Uuid) -> Result<Option<Character>> {
    sqlx::query_as::<_, Character>("SELECT * FROM characters WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching character")
}

pub async fn list_mine(db: &PgPool, user_id: Uuid) -> Result<Vec<Character>> {
    sqlx::query_as::<_, Character>(
        "SELECT * FROM characters WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("listing own characters")
}

/// Admin listing with optional status / owner filters.
pub async fn list(
    db: &PgPool,
    status: Option<CharacterStatus>,
    user_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Character>> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM characters WHERE TRUE");
    if let Some(s) = status {
        qb.push(" AND status = ").push_bind(s.as_str());
    }
    if let Some(uid) = user_id {
        qb.push(" AND user_id = ").push_bind(uid);
    }
    qb.push(" ORDER BY submitted_at DESC NULLS LAST, created_at DESC");
    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);

    qb.build_query_as::<Character>()
        .fetch_all(db)
        .await
        .context("listing characters")
}

/// Owner edit: whitelisted dynamic UPDATE, only while the sheet is editable.
pub async fn update_owner(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    patch: CharacterPatch,
) -> Result<UpdateOutcome> {
    let mut tx = db.begin().await.context("starting update tx")?;

    let cur = sqlx::query_as::<_, Character>("SELECT * FROM characters WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("locking character")?;

    let Some(cur) = cur else {
        return Ok(UpdateOutcome::NotFound);
    };
    if cur.user_id != user_id {
        return Ok(UpdateOutcome::Forbidden);
    }
    let Some(status) = CharacterStatus::parse(&cur.status) else {
        return Ok(UpdateOutcome::Invalid(format!(
            "character has unknown status {}",
            cur.status
        )));
    };
    if !status.owner_editable() {
        return Ok(UpdateOutcome::NotEditable);
    }

    let name = patch.name.as_deref().unwrap_or(&cur.name);
    let age = patch.age.unwrap_or(cur.age);
    if let Err(msg) = validate::validate_draft(name, age) {
        return Ok(UpdateOutcome::Invalid(msg));
    }

    // Re-check the face claim only when the selection actually changes.
    if let Some(new_face) = patch.face_model_id {
        if let Some(fid) = new_face {
            if Some(fid) != cur.face_model_id {
                match face_claim_free(&mut tx, fid, Some(id)).await? {
                    FaceCheck::Missing => return Ok(UpdateOutcome::FaceMissing),
                    FaceCheck::Taken => return Ok(UpdateOutcome::FaceTaken),
                    FaceCheck::Free => {}
                }
            }
        }
    }

    let mut qb = QueryBuilder::<Postgres>::new("UPDATE characters SET updated_at = NOW()");
    if let Some(v) = &patch.name {
        qb.push(", name = ").push_bind(v.clone());
    }
    if let Some(v) = patch.age {
        qb.push(", age = ").push_bind(v);
    }
    if let Some(v) = &patch.gender {
        qb.push(", gender = ").push_bind(v.clone());
    }
    if let Some(v) = &patch.backstory {
        qb.push(", backstory = ").push_bind(v.clone());
    }
    if let Some(v) = &patch.appearance {
        qb.push(", appearance = ").push_bind(v.clone());
    }
    if let Some(v) = &patch.character_traits {
        qb.push(", character_traits = ").push_bind(v.clone());
    }
    if let Some(v) = &patch.skills {
        qb.push(", skills = ").push_bind(v.clone());
    }
    if let Some(v) = &patch.inventory {
        qb.push(", inventory = ").push_bind(v.clone());
    }
    if let Some(v) = patch.face_model_id {
        qb.push(", face_model_id = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");

    let updated = qb
        .build_query_as::<Character>()
        .fetch_one(&mut *tx)
        .await
        .context("applying character patch")?;

    tx.commit().await.context("committing update tx")?;
    Ok(UpdateOutcome::Updated(updated))
}

/// Owner submit: draft/rejected → pending, once the sheet is review-ready.
pub async fn submit(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<TransitionOutcome> {
    let mut tx = db.begin().await.context("starting submit tx")?;

    let cur = sqlx::query_as::<_, Character>("SELECT * FROM characters WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("locking character")?;

    let Some(cur) = cur else {
        return Ok(TransitionOutcome::NotFound);
    };
    if cur.user_id != user_id {
        return Ok(TransitionOutcome::Forbidden);
    }
    let Some(from) = CharacterStatus::parse(&cur.status) else {
        return Ok(TransitionOutcome::Invalid(format!(
            "character has unknown status {}",
            cur.status
        )));
    };
    if !transition_allowed(from, CharacterStatus::Pending, Actor::Owner) {
        return Ok(TransitionOutcome::InvalidTransition);
    }
    if let Err(msg) = validate::ready_for_review(
        &cur.name,
        cur.age,
        cur.gender.as_deref(),
        &cur.backstory,
        cur.face_model_id.is_some(),
    ) {
        return Ok(TransitionOutcome::Invalid(msg));
    }

    // A rejected sheet re-entering review re-occupies the slot; the partial
    // index rejects that when another living character exists.
    let res = sqlx::query_as::<_, Character>(
        r#"UPDATE characters
              SET status = 'pending',
                  submitted_at = NOW(),
                  rejection_reason = NULL,
                  updated_at = NOW()
            WHERE id = $1
            RETURNING *"#,
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await;

    let updated = match res {
        Ok(c) => c,
        Err(e) if is_slot_conflict(&e) => return Ok(TransitionOutcome::SlotTaken),
        Err(e) => return Err(e).context("submitting character"),
    };

    tx.commit().await.context("committing submit tx")?;
    Ok(TransitionOutcome::Done(updated))
}

/// Admin review: pending → approved / rejected.
pub async fn review(
    db: &PgPool,
    id: Uuid,
    approve: bool,
    rejection_reason: Option<String>,
) -> Result<TransitionOutcome> {
    if !approve && rejection_reason.as_deref().map_or(true, |r| r.trim().is_empty()) {
        return Ok(TransitionOutcome::Invalid(
            "a rejection reason is required".into(),
        ));
    }

    let to = if approve {
        CharacterStatus::Approved
    } else {
        CharacterStatus::Rejected
    };

    admin_transition(db, id, to, rejection_reason, true).await
}

/// Remaining admin arcs: activate, archive, kill, reinstate.
pub async fn set_status(db: &PgPool, id: Uuid, to: CharacterStatus) -> Result<TransitionOutcome> {
    admin_transition(db, id, to, None, false).await
}

async fn admin_transition(
    db: &PgPool,
    id: Uuid,
    to: CharacterStatus,
    rejection_reason: Option<String>,
    is_review: bool,
) -> Result<TransitionOutcome> {
    let mut tx = db.begin().await.context("starting transition tx")?;

    let cur = sqlx::query_as::<_, Character>("SELECT * FROM characters WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("locking character")?;

    let Some(cur) = cur else {
        return Ok(TransitionOutcome::NotFound);
    };
    let Some(from) = CharacterStatus::parse(&cur.status) else {
        return Ok(TransitionOutcome::Invalid(format!(
            "character has unknown status {}",
            cur.status
        )));
    };
    if !transition_allowed(from, to, Actor::Admin) {
        return Ok(TransitionOutcome::InvalidTransition);
    }

    let mut qb = QueryBuilder::<Postgres>::new("UPDATE characters SET updated_at = NOW()");
    qb.push(", status = ").push_bind(to.as_str());
    if is_review {
        qb.push(", reviewed_at = NOW()");
        qb.push(", rejection_reason = ").push_bind(rejection_reason);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");

    // Reinstating an archived sheet re-occupies the slot.
    let res = qb.build_query_as::<Character>().fetch_one(&mut *tx).await;
    let updated = match res {
        Ok(c) => c,
        Err(e) if is_slot_conflict(&e) => return Ok(TransitionOutcome::SlotTaken),
        Err(e) => return Err(e).context("transitioning character"),
    };

    tx.commit().await.context("committing transition tx")?;
    Ok(TransitionOutcome::Done(updated))
}

/// Moderator notes, kept off the owner-visible sheet.
pub async fn set_notes(db: &PgPool, id: Uuid, notes: Option<&str>) -> Result<Option<Character>> {
    sqlx::query_as::<_, Character>(
        "UPDATE characters SET admin_notes = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(notes)
    .fetch_optional(db)
    .await
    .context("setting admin notes")
}
