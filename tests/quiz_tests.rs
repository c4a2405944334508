use quenta_server::quiz::{self, AnswerEntry, GradeEntry};
use serde_json::json;
use uuid::Uuid;

fn bank(n: usize) -> Vec<Uuid> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

#[test]
fn answers_must_cover_the_active_bank() {
    let ids = bank(2);
    let raw = json!([
        { "question_id": ids[0], "answer": "Always keep your character's fear of death in mind." },
        { "question_id": ids[1], "answer": "Report it to a moderator." },
    ]);

    let parsed = quiz::parse_answers(&raw, &ids).expect("valid sheet");
    assert_eq!(parsed.len(), 2);
}

#[test]
fn missing_or_extra_answers_are_rejected() {
    let ids = bank(2);

    // One short
    let raw = json!([{ "question_id": ids[0], "answer": "ok" }]);
    assert!(quiz::parse_answers(&raw, &ids).is_err());

    // Answering a retired question
    let stranger = Uuid::new_v4();
    let raw = json!([
        { "question_id": ids[0], "answer": "ok" },
        { "question_id": stranger, "answer": "ok" },
    ]);
    assert!(quiz::parse_answers(&raw, &ids).is_err());
}

#[test]
fn blank_and_duplicate_answers_are_rejected() {
    let ids = bank(1);

    let raw = json!([{ "question_id": ids[0], "answer": "   " }]);
    assert!(quiz::parse_answers(&raw, &ids).is_err());

    let two = bank(2);
    let raw = json!([
        { "question_id": two[0], "answer": "a" },
        { "question_id": two[0], "answer": "b" },
    ]);
    assert!(quiz::parse_answers(&raw, &two).is_err());
}

#[test]
fn grades_must_cover_the_answers() {
    let ids = bank(2);
    let answers: Vec<AnswerEntry> = ids
        .iter()
        .map(|&question_id| AnswerEntry {
            question_id,
            answer: "something".into(),
        })
        .collect();

    let raw = json!([
        { "question_id": ids[0], "correct": true },
        { "question_id": ids[1], "correct": false, "comment": "see rule 3" },
    ]);
    let grades = quiz::parse_grades(&raw, &answers).expect("valid grades");
    assert_eq!(grades.len(), 2);

    // A grade for a question that was never answered
    let raw = json!([
        { "question_id": ids[0], "correct": true },
        { "question_id": Uuid::new_v4(), "correct": true },
    ]);
    assert!(quiz::parse_grades(&raw, &answers).is_err());
}

#[test]
fn pass_requires_every_answer_correct() {
    let make = |verdicts: &[bool]| -> Vec<GradeEntry> {
        verdicts
            .iter()
            .map(|&correct| GradeEntry {
                question_id: Uuid::new_v4(),
                correct,
                comment: None,
            })
            .collect()
    };

    assert!(quiz::passed(&make(&[true, true, true])));
    assert!(!quiz::passed(&make(&[true, false, true])));
    assert!(!quiz::passed(&make(&[])));
}
