pub mod admin;
pub mod auth;
pub mod characters;
pub mod face_models;
pub mod faq;
pub mod health;
pub mod media;
pub mod questions;
pub mod routes;
pub mod rules;
pub mod spa;
pub mod test_submissions;
pub mod users;
