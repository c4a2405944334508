//! Character application life-cycle.
//!
//! Every status transition in the API goes through [`transition_allowed`];
//! no route carries its own status-string comparisons.

use serde::{Deserialize, Serialize};

/// Application life-cycle states.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CharacterStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Active,
    Archived,
    Dead,
}

/// Who is driving a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Owner,
    Admin,
}

impl CharacterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CharacterStatus::Draft => "draft",
            CharacterStatus::Pending => "pending",
            CharacterStatus::Approved => "approved",
            CharacterStatus::Rejected => "rejected",
            CharacterStatus::Active => "active",
            CharacterStatus::Archived => "archived",
            CharacterStatus::Dead => "dead",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(CharacterStatus::Draft),
            "pending" => Some(CharacterStatus::Pending),
            "approved" => Some(CharacterStatus::Approved),
            "rejected" => Some(CharacterStatus::Rejected),
            "active" => Some(CharacterStatus::Active),
            "archived" => Some(CharacterStatus::Archived),
            "dead" => Some(CharacterStatus::Dead),
            _ => None,
        }
    }

    /// A character in one of these states counts against the
    /// one-character-per-user slot.
    pub fn occupies_slot(self) -> bool {
        !matches!(
            self,
            CharacterStatus::Rejected | CharacterStatus::Archived | CharacterStatus::Dead
        )
    }

    /// The owner may edit the sheet only before review or after a rejection.
    pub fn owner_editable(self) -> bool {
        matches!(self, CharacterStatus::Draft | CharacterStatus::Rejected)
    }

    /// A unique face model is released once its holder is dead.
    pub fn holds_face_claim(self) -> bool {
        self != CharacterStatus::Dead
    }
}

/// The single transition table.
pub fn transition_allowed(from: CharacterStatus, to: CharacterStatus, by: Actor) -> bool {
    use CharacterStatus::*;

    match by {
        // Owners only ever submit.
        Actor::Owner => matches!((from, to), (Draft, Pending) | (Rejected, Pending)),
        Actor::Admin => matches!(
            (from, to),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Active)
                | (Active, Archived)
                | (Active, Dead)
                | (Archived, Active)
        ),
    }
}
