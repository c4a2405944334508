use quenta_server::characters::status::transition_allowed;
use quenta_server::characters::{Actor, CharacterStatus};

use CharacterStatus::*;

const ALL: [CharacterStatus; 7] = [Draft, Pending, Approved, Rejected, Active, Archived, Dead];

#[test]
fn owner_can_only_submit_from_draft_or_rejected() {
    assert!(transition_allowed(Draft, Pending, Actor::Owner));
    assert!(transition_allowed(Rejected, Pending, Actor::Owner));

    for from in ALL {
        for to in ALL {
            let allowed = transition_allowed(from, to, Actor::Owner);
            let expected = matches!((from, to), (Draft, Pending) | (Rejected, Pending));
            assert_eq!(allowed, expected, "owner {from:?} -> {to:?}");
        }
    }
}

#[test]
fn admin_review_only_from_pending() {
    assert!(transition_allowed(Pending, Approved, Actor::Admin));
    assert!(transition_allowed(Pending, Rejected, Actor::Admin));

    // A sheet that never went through review cannot be approved.
    assert!(!transition_allowed(Draft, Approved, Actor::Admin));
    assert!(!transition_allowed(Rejected, Approved, Actor::Admin));
    assert!(!transition_allowed(Dead, Approved, Actor::Admin));
}

#[test]
fn admin_lifecycle_arcs() {
    assert!(transition_allowed(Approved, Active, Actor::Admin));
    assert!(transition_allowed(Active, Archived, Actor::Admin));
    assert!(transition_allowed(Active, Dead, Actor::Admin));
    assert!(transition_allowed(Archived, Active, Actor::Admin));

    // Death is terminal.
    for to in ALL {
        assert!(!transition_allowed(Dead, to, Actor::Admin), "dead -> {to:?}");
    }
    // No shortcut from approval straight to death.
    assert!(!transition_allowed(Approved, Dead, Actor::Admin));
    // Admins never push a sheet back into the owner's draft stage.
    for from in ALL {
        assert!(!transition_allowed(from, Draft, Actor::Admin));
    }
}

#[test]
fn slot_occupancy_matches_terminal_states() {
    assert!(Draft.occupies_slot());
    assert!(Pending.occupies_slot());
    assert!(Approved.occupies_slot());
    assert!(Active.occupies_slot());

    assert!(!Rejected.occupies_slot());
    assert!(!Archived.occupies_slot());
    assert!(!Dead.occupies_slot());
}

#[test]
fn owner_edit_window() {
    for s in ALL {
        let expected = matches!(s, Draft | Rejected);
        assert_eq!(s.owner_editable(), expected, "{s:?}");
    }
}

#[test]
fn only_death_releases_a_face_claim() {
    for s in ALL {
        assert_eq!(s.holds_face_claim(), s != Dead, "{s:?}");
    }
}

#[test]
fn status_strings_round_trip() {
    for s in ALL {
        assert_eq!(CharacterStatus::parse(s.as_str()), Some(s));
    }
    assert_eq!(CharacterStatus::parse("alive"), None);
    assert_eq!(CharacterStatus::parse("DRAFT"), None);
}
