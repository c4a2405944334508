use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub steam_id: String,
    pub steam_nickname: String,
    pub discord_username: Option<String>,
    pub is_banned: bool,
    pub rules_passed: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub permissions: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Character {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub backstory: String,
    pub appearance: Option<String>,
    pub character_traits: Value,
    pub skills: Value,
    pub inventory: Value,
    pub face_model_id: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FaceModel {
    pub id: Uuid,
    pub name: String,
    pub gender: String,
    pub image_url: String,
    pub is_unique: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RulesQuestion {
    pub id: Uuid,
    pub question: String,
    pub hint: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RulesTestSubmission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub answers: Value,
    pub status: String,
    pub grades: Option<Value>,
    pub passed: Option<bool>,
    pub graded_by: Option<Uuid>,
    pub submitted_at: DateTime<Utc>,
    pub graded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RuleCategory {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Rule {
    pub id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub body: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FaqCategory {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FaqItem {
    pub id: Uuid,
    pub category_id: Uuid,
    pub question: String,
    pub answer: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MediaVideo {
    pub id: Uuid,
    pub title: String,
    pub video_url: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}
