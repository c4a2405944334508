//! Token shape checks: the two claim kinds never cross over.

use chrono::Utc;
use quenta_server::http::auth::{
    self, AdminClaims, AdminRole, Capability, UserClaims,
};

const SECRET: &[u8] = b"test-secret";

fn future_exp() -> usize {
    (Utc::now().timestamp() + 3600) as usize
}

#[test]
fn user_token_round_trips() {
    let claims = UserClaims {
        sub: "5f64a2a7-3f3b-4ffe-9a6c-111111111111".into(),
        sid: "76561198000000001".into(),
        nick: "Grim".into(),
        exp: future_exp(),
    };
    let token = auth::encode_token(&claims, SECRET).unwrap();
    let decoded = auth::decode_user_claims(&token, SECRET).unwrap();
    assert_eq!(decoded.sub, claims.sub);
    assert_eq!(decoded.sid, claims.sid);
}

#[test]
fn admin_token_round_trips_and_checks_typ() {
    let claims = AdminClaims {
        sub: "5f64a2a7-3f3b-4ffe-9a6c-222222222222".into(),
        username: "warden".into(),
        role: "moderator".into(),
        typ: "admin".into(),
        exp: future_exp(),
    };
    let token = auth::encode_token(&claims, SECRET).unwrap();
    let decoded = auth::decode_admin_claims(&token, SECRET).unwrap();
    assert_eq!(decoded.username, "warden");

    // forged typ
    let claims = AdminClaims {
        typ: "user".into(),
        ..claims
    };
    let token = auth::encode_token(&claims, SECRET).unwrap();
    assert!(auth::decode_admin_claims(&token, SECRET).is_err());
}

#[test]
fn claim_kinds_do_not_cross_over() {
    let user = UserClaims {
        sub: "x".into(),
        sid: "76561198000000001".into(),
        nick: "Grim".into(),
        exp: future_exp(),
    };
    let token = auth::encode_token(&user, SECRET).unwrap();
    // a user token is not an admin token
    assert!(auth::decode_admin_claims(&token, SECRET).is_err());

    let admin = AdminClaims {
        sub: "y".into(),
        username: "warden".into(),
        role: "moderator".into(),
        typ: "admin".into(),
        exp: future_exp(),
    };
    let token = auth::encode_token(&admin, SECRET).unwrap();
    // and an admin token is not a user token
    assert!(auth::decode_user_claims(&token, SECRET).is_err());
}

#[test]
fn expired_tokens_are_rejected() {
    let claims = UserClaims {
        sub: "x".into(),
        sid: "76561198000000001".into(),
        nick: "Grim".into(),
        exp: (Utc::now().timestamp() - 3600) as usize,
    };
    let token = auth::encode_token(&claims, SECRET).unwrap();
    assert!(auth::decode_user_claims(&token, SECRET).is_err());
}

#[test]
fn wrong_secret_is_rejected() {
    let claims = UserClaims {
        sub: "x".into(),
        sid: "76561198000000001".into(),
        nick: "Grim".into(),
        exp: future_exp(),
    };
    let token = auth::encode_token(&claims, SECRET).unwrap();
    assert!(auth::decode_user_claims(&token, b"other-secret").is_err());
}

#[test]
fn role_capability_table() {
    use Capability::*;

    let sa = AdminRole::SuperAdmin;
    for cap in [ModerateCharacters, ManageContent, ManageAdmins, ManageUsers, GradeTests] {
        assert!(sa.allows(cap));
    }

    let m = AdminRole::Moderator;
    assert!(m.allows(ModerateCharacters));
    assert!(m.allows(ManageUsers));
    assert!(m.allows(GradeTests));
    assert!(!m.allows(ManageContent));
    assert!(!m.allows(ManageAdmins));

    let cm = AdminRole::ContentManager;
    assert!(cm.allows(ManageContent));
    assert!(!cm.allows(ModerateCharacters));
    assert!(!cm.allows(ManageAdmins));
}

#[test]
fn role_strings_round_trip() {
    for role in [AdminRole::SuperAdmin, AdminRole::Moderator, AdminRole::ContentManager] {
        assert_eq!(AdminRole::parse(role.as_str()), Some(role));
    }
    assert_eq!(AdminRole::parse("owner"), None);
}
