//! Sheet validation, split by how far the application has progressed.
//!
//! Drafts only need a plausible name; a submission headed for review must be
//! a complete quenta.

/// Shortest backstory accepted for review.
pub const MIN_BACKSTORY_CHARS: usize = 150;

pub const MIN_AGE: i32 = 16;
pub const MAX_AGE: i32 = 120;

/// Checks applied on every create/edit, draft or not.
pub fn validate_draft(name: &str, age: Option<i32>) -> Result<(), String> {
    let name = name.trim();
    if name.len() < 2 {
        return Err("character name is too short".into());
    }
    if name.len() > 64 {
        return Err("character name is too long".into());
    }
    if let Some(age) = age {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(format!("age must be between {MIN_AGE} and {MAX_AGE}"));
        }
    }
    Ok(())
}

/// Checks applied when a sheet is submitted for review.
pub fn ready_for_review(
    name: &str,
    age: Option<i32>,
    gender: Option<&str>,
    backstory: &str,
    has_face_model: bool,
) -> Result<(), String> {
    validate_draft(name, age)?;

    if age.is_none() {
        return Err("age is required for review".into());
    }
    if gender.map_or(true, |g| g.trim().is_empty()) {
        return Err("gender is required for review".into());
    }
    if backstory.trim().chars().count() < MIN_BACKSTORY_CHARS {
        return Err(format!(
            "backstory must be at least {MIN_BACKSTORY_CHARS} characters"
        ));
    }
    if !has_face_model {
        return Err("a face model must be selected before review".into());
    }
    Ok(())
}
