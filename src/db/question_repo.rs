//! Rules-test question bank and submission grading.

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{RulesQuestion, RulesTestSubmission};
use crate::quiz;

const PENDING_INDEX: &str = "submissions_one_pending_per_user";

pub async fn list_active_questions(db: &PgPool) -> Result<Vec<RulesQuestion>> {
    sqlx::query_as::<_, RulesQuestion>(
        "SELECT * FROM rules_questions WHERE is_active ORDER BY order_index, created_at",
    )
    .fetch_all(db)
    .await
    .context("listing active questions")
}

pub async fn list_all_questions(db: &PgPool) -> Result<Vec<RulesQuestion>> {
    sqlx::query_as::<_, RulesQuestion>(
        "SELECT * FROM rules_questions ORDER BY order_index, created_at",
    )
    .fetch_all(db)
    .await
    .context("listing questions")
}

pub async fn create_question(
    db: &PgPool,
    question: &str,
    hint: Option<&str>,
    order_index: i32,
) -> Result<RulesQuestion> {
    sqlx::query_as::<_, RulesQuestion>(
        r#"INSERT INTO rules_questions (question, hint, order_index)
           VALUES ($1, $2, $3)
           RETURNING *"#,
    )
    .bind(question)
    .bind(hint)
    .bind(order_index)
    .fetch_one(db)
    .await
    .context("creating question")
}

pub async fn update_question(
    db: &PgPool,
    id: Uuid,
    question: Option<&str>,
    hint: Option<Option<&str>>,
    order_index: Option<i32>,
    is_active: Option<bool>,
) -> Result<Option<RulesQuestion>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE rules_questions SET question = question");
    if let Some(v) = question {
        qb.push(", question = ").push_bind(v.to_string());
    }
    if let Some(v) = hint {
        qb.push(", hint = ").push_bind(v.map(str::to_string));
    }
    if let Some(v) = order_index {
        qb.push(", order_index = ").push_bind(v);
    }
    if let Some(v) = is_active {
        qb.push(", is_active = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");
    qb.build_query_as::<RulesQuestion>()
        .fetch_optional(db)
        .await
        .context("updating question")
}

/// Questions are deactivated, never deleted, so old submissions stay readable.
pub async fn deactivate_question(db: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query("UPDATE rules_questions SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deactivating question")?
        .rows_affected();
    Ok(rows > 0)
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Created(RulesTestSubmission),
    AlreadyPending,
    NoQuestions,
    Invalid(String),
}

/// Store a new answer sheet.  The partial unique index turns a concurrent
/// double-submit into a 23505 instead of a second pending row.
pub async fn create_submission(db: &PgPool, user_id: Uuid, answers: &Value) -> Result<SubmitOutcome> {
    let active = list_active_questions(db).await?;
    if active.is_empty() {
        return Ok(SubmitOutcome::NoQuestions);
    }
    let active_ids: Vec<Uuid> = active.iter().map(|q| q.id).collect();

    let parsed = match quiz::parse_answers(answers, &active_ids) {
        Ok(p) => p,
        Err(msg) => return Ok(SubmitOutcome::Invalid(msg)),
    };
    let canonical = serde_json::to_value(&parsed).context("encoding answers")?;

    let res = sqlx::query_as::<_, RulesTestSubmission>(
        r#"INSERT INTO rules_test_submissions (user_id, answers)
           VALUES ($1, $2)
           RETURNING *"#,
    )
    .bind(user_id)
    .bind(canonical)
    .fetch_one(db)
    .await;

    match res {
        Ok(s) => Ok(SubmitOutcome::Created(s)),
        Err(sqlx::Error::Database(e)) if e.constraint() == Some(PENDING_INDEX) => {
            Ok(SubmitOutcome::AlreadyPending)
        }
        Err(e) => Err(e).context("inserting submission"),
    }
}

pub async fn fetch_submission(db: &PgPool, id: Uuid) -> Result<Option<RulesTestSubmission>> {
    sqlx::query_as::<_, RulesTestSubmission>("SELECT * FROM rules_test_submissions WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching submission")
}

pub async fn list_submissions(
    db: &PgPool,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<RulesTestSubmission>> {
    let mut qb =
        QueryBuilder::<Postgres>::new("SELECT * FROM rules_test_submissions WHERE TRUE");
    if let Some(s) = status {
        qb.push(" AND status = ").push_bind(s.to_string());
    }
    qb.push(" ORDER BY submitted_at");
    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);
    qb.build_query_as::<RulesTestSubmission>()
        .fetch_all(db)
        .await
        .context("listing submissions")
}

pub async fn list_own_submissions(db: &PgPool, user_id: Uuid) -> Result<Vec<RulesTestSubmission>> {
    sqlx::query_as::<_, RulesTestSubmission>(
        "SELECT * FROM rules_test_submissions WHERE user_id = $1 ORDER BY submitted_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("listing own submissions")
}

#[derive(Debug)]
pub enum GradeOutcome {
    Graded {
        submission: RulesTestSubmission,
        passed: bool,
    },
    NotFound,
    AlreadyGraded,
    Invalid(String),
}

/// Grade a pending submission; a pass flips `users.rules_passed` in the same
/// transaction.
pub async fn grade_submission(
    db: &PgPool,
    id: Uuid,
    admin_id: Uuid,
    grades: &Value,
) -> Result<GradeOutcome> {
    let mut tx = db.begin().await.context("starting grade tx")?;

    let cur = sqlx::query_as::<_, RulesTestSubmission>(
        "SELECT * FROM rules_test_submissions WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .context("locking submission")?;

    let Some(cur) = cur else {
        return Ok(GradeOutcome::NotFound);
    };
    if cur.status != "pending" {
        return Ok(GradeOutcome::AlreadyGraded);
    }

    let answers: Vec<quiz::AnswerEntry> =
        serde_json::from_value(cur.answers.clone()).context("decoding stored answers")?;
    let parsed = match quiz::parse_grades(grades, &answers) {
        Ok(g) => g,
        Err(msg) => return Ok(GradeOutcome::Invalid(msg)),
    };
    let passed = quiz::passed(&parsed);
    let canonical = serde_json::to_value(&parsed).context("encoding grades")?;

    let submission = sqlx::query_as::<_, RulesTestSubmission>(
        r#"UPDATE rules_test_submissions
              SET status = 'graded',
                  grades = $2,
                  passed = $3,
                  graded_by = $4,
                  graded_at = NOW()
            WHERE id = $1
            RETURNING *"#,
    )
    .bind(id)
    .bind(canonical)
    .bind(passed)
    .bind(admin_id)
    .fetch_one(&mut *tx)
    .await
    .context("grading submission")?;

    if passed {
        sqlx::query("UPDATE users SET rules_passed = TRUE WHERE id = $1")
            .bind(cur.user_id)
            .execute(&mut *tx)
            .await
            .context("setting rules_passed")?;
    }

    tx.commit().await.context("committing grade tx")?;
    Ok(GradeOutcome::Graded { submission, passed })
}
