use quenta_server::characters::validate::{self, MIN_BACKSTORY_CHARS};

fn long_backstory() -> String {
    "A settler who walked out of the quarantine zone with nothing but a rifle stock. ".repeat(4)
}

#[test]
fn draft_needs_little_more_than_a_name() {
    assert!(validate::validate_draft("Viktor Reyes", None).is_ok());
    assert!(validate::validate_draft("Viktor Reyes", Some(34)).is_ok());

    assert!(validate::validate_draft("", None).is_err());
    assert!(validate::validate_draft("V", None).is_err());
    assert!(validate::validate_draft(&"x".repeat(65), None).is_err());
}

#[test]
fn age_bounds_apply_whenever_age_is_given() {
    assert!(validate::validate_draft("Viktor", Some(16)).is_ok());
    assert!(validate::validate_draft("Viktor", Some(120)).is_ok());
    assert!(validate::validate_draft("Viktor", Some(15)).is_err());
    assert!(validate::validate_draft("Viktor", Some(121)).is_err());
}

#[test]
fn review_needs_a_complete_sheet() {
    let backstory = long_backstory();
    assert!(backstory.chars().count() >= MIN_BACKSTORY_CHARS);

    assert!(validate::ready_for_review("Viktor", Some(34), Some("male"), &backstory, true).is_ok());

    // each missing piece blocks submission
    assert!(validate::ready_for_review("Viktor", None, Some("male"), &backstory, true).is_err());
    assert!(validate::ready_for_review("Viktor", Some(34), None, &backstory, true).is_err());
    assert!(validate::ready_for_review("Viktor", Some(34), Some("  "), &backstory, true).is_err());
    assert!(validate::ready_for_review("Viktor", Some(34), Some("male"), "too short", true).is_err());
    assert!(validate::ready_for_review("Viktor", Some(34), Some("male"), &backstory, false).is_err());
}
