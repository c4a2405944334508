//! Static knowledge-base content: rule categories/rules, FAQ, media videos.
//! All lists are ordered by `order_index`.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{FaqCategory, FaqItem, MediaVideo, Rule, RuleCategory};

/// Tables whose rows can be reordered from the admin panel.
#[derive(Debug, Clone, Copy)]
pub enum Orderable {
    RuleCategories,
    Rules,
    FaqCategories,
    FaqItems,
    MediaVideos,
}

impl Orderable {
    fn table(self) -> &'static str {
        match self {
            Orderable::RuleCategories => "rule_categories",
            Orderable::Rules => "rules",
            Orderable::FaqCategories => "faq_categories",
            Orderable::FaqItems => "faq_items",
            Orderable::MediaVideos => "media_videos",
        }
    }
}

/// Rewrite `order_index` to match the given id order.  Ids not listed keep
/// their old index and sort after the listed ones.
pub async fn reorder(db: &PgPool, kind: Orderable, ids: &[Uuid]) -> Result<()> {
    let mut tx = db.begin().await.context("starting reorder tx")?;
    for (idx, id) in ids.iter().enumerate() {
        let sql = format!("UPDATE {} SET order_index = $1 WHERE id = $2", kind.table());
        sqlx::query(&sql)
            .bind(idx as i32)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("rewriting order_index")?;
    }
    tx.commit().await.context("committing reorder tx")?;
    Ok(())
}

//////////////////////////////////////////////////
// Rules
//////////////////////////////////////////////////

pub async fn list_rule_categories(db: &PgPool) -> Result<Vec<RuleCategory>> {
    sqlx::query_as::<_, RuleCategory>(
        "SELECT * FROM rule_categories ORDER BY order_index, created_at",
    )
    .fetch_all(db)
    .await
    .context("listing rule categories")
}

pub async fn list_rules(db: &PgPool) -> Result<Vec<Rule>> {
    sqlx::query_as::<_, Rule>("SELECT * FROM rules ORDER BY order_index, created_at")
        .fetch_all(db)
        .await
        .context("listing rules")
}

pub async fn create_rule_category(db: &PgPool, title: &str, order_index: i32) -> Result<RuleCategory> {
    sqlx::query_as::<_, RuleCategory>(
        "INSERT INTO rule_categories (title, order_index) VALUES ($1, $2) RETURNING *",
    )
    .bind(title)
    .bind(order_index)
    .fetch_one(db)
    .await
    .context("creating rule category")
}

pub async fn update_rule_category(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    order_index: Option<i32>,
) -> Result<Option<RuleCategory>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE rule_categories SET title = title");
    if let Some(v) = title {
        qb.push(", title = ").push_bind(v.to_string());
    }
    if let Some(v) = order_index {
        qb.push(", order_index = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");
    qb.build_query_as::<RuleCategory>()
        .fetch_optional(db)
        .await
        .context("updating rule category")
}

/// Cascades to the category's rules.
pub async fn delete_rule_category(db: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM rule_categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting rule category")?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn create_rule(
    db: &PgPool,
    category_id: Uuid,
    title: &str,
    body: &str,
    order_index: i32,
) -> Result<Rule> {
    sqlx::query_as::<_, Rule>(
        r#"INSERT INTO rules (category_id, title, body, order_index)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(category_id)
    .bind(title)
    .bind(body)
    .bind(order_index)
    .fetch_one(db)
    .await
    .context("creating rule")
}

pub async fn update_rule(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    body: Option<&str>,
    order_index: Option<i32>,
) -> Result<Option<Rule>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE rules SET title = title");
    if let Some(v) = title {
        qb.push(", title = ").push_bind(v.to_string());
    }
    if let Some(v) = body {
        qb.push(", body = ").push_bind(v.to_string());
    }
    if let Some(v) = order_index {
        qb.push(", order_index = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");
    qb.build_query_as::<Rule>()
        .fetch_optional(db)
        .await
        .context("updating rule")
}

pub async fn delete_rule(db: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM rules WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting rule")?
        .rows_affected();
    Ok(rows > 0)
}

//////////////////////////////////////////////////
// FAQ
//////////////////////////////////////////////////

pub async fn list_faq_categories(db: &PgPool) -> Result<Vec<FaqCategory>> {
    sqlx::query_as::<_, FaqCategory>(
        "SELECT * FROM faq_categories ORDER BY order_index, created_at",
    )
    .fetch_all(db)
    .await
    .context("listing faq categories")
}

pub async fn list_faq_items(db: &PgPool) -> Result<Vec<FaqItem>> {
    sqlx::query_as::<_, FaqItem>("SELECT * FROM faq_items ORDER BY order_index, created_at")
        .fetch_all(db)
        .await
        .context("listing faq items")
}

pub async fn create_faq_category(db: &PgPool, title: &str, order_index: i32) -> Result<FaqCategory> {
    sqlx::query_as::<_, FaqCategory>(
        "INSERT INTO faq_categories (title, order_index) VALUES ($1, $2) RETURNING *",
    )
    .bind(title)
    .bind(order_index)
    .fetch_one(db)
    .await
    .context("creating faq category")
}

pub async fn update_faq_category(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    order_index: Option<i32>,
) -> Result<Option<FaqCategory>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE faq_categories SET title = title");
    if let Some(v) = title {
        qb.push(", title = ").push_bind(v.to_string());
    }
    if let Some(v) = order_index {
        qb.push(", order_index = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");
    qb.build_query_as::<FaqCategory>()
        .fetch_optional(db)
        .await
        .context("updating faq category")
}

pub async fn delete_faq_category(db: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM faq_categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting faq category")?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn create_faq_item(
    db: &PgPool,
    category_id: Uuid,
    question: &str,
    answer: &str,
    order_index: i32,
) -> Result<FaqItem> {
    sqlx::query_as::<_, FaqItem>(
        r#"INSERT INTO faq_items (category_id, question, answer, order_index)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(category_id)
    .bind(question)
    .bind(answer)
    .bind(order_index)
    .fetch_one(db)
    .await
    .context("creating faq item")
}

pub async fn update_faq_item(
    db: &PgPool,
    id: Uuid,
    question: Option<&str>,
    answer: Option<&str>,
    order_index: Option<i32>,
) -> Result<Option<FaqItem>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE faq_items SET question = question");
    if let Some(v) = question {
        qb.push(", question = ").push_bind(v.to_string());
    }
    if let Some(v) = answer {
        qb.push(", answer = ").push_bind(v.to_string());
    }
    if let Some(v) = order_index {
        qb.push(", order_index = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");
    qb.build_query_as::<FaqItem>()
        .fetch_optional(db)
        .await
        .context("updating faq item")
}

pub async fn delete_faq_item(db: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM faq_items WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting faq item")?
        .rows_affected();
    Ok(rows > 0)
}

//////////////////////////////////////////////////
// Media videos
//////////////////////////////////////////////////

pub async fn list_media_videos(db: &PgPool) -> Result<Vec<MediaVideo>> {
    sqlx::query_as::<_, MediaVideo>(
        "SELECT * FROM media_videos ORDER BY order_index, created_at",
    )
    .fetch_all(db)
    .await
    .context("listing media videos")
}

pub async fn create_media_video(
    db: &PgPool,
    title: &str,
    video_url: &str,
    order_index: i32,
) -> Result<MediaVideo> {
    sqlx::query_as::<_, MediaVideo>(
        r#"INSERT INTO media_videos (title, video_url, order_index)
           VALUES ($1, $2, $3)
           RETURNING *"#,
    )
    .bind(title)
    .bind(video_url)
    .bind(order_index)
    .fetch_one(db)
    .await
    .context("creating media video")
}

pub async fn update_media_video(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    video_url: Option<&str>,
    order_index: Option<i32>,
) -> Result<Option<MediaVideo>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE media_videos SET title = title");
    if let Some(v) = title {
        qb.push(", title = ").push_bind(v.to_string());
    }
    if let Some(v) = video_url {
        qb.push(", video_url = ").push_bind(v.to_string());
    }
    if let Some(v) = order_index {
        qb.push(", order_index = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING *");
    qb.build_query_as::<MediaVideo>()
        .fetch_optional(db)
        .await
        .context("updating media video")
}

pub async fn delete_media_video(db: &PgPool, id: Uuid) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM media_videos WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting media video")?
        .rows_affected();
    Ok(rows > 0)
}
