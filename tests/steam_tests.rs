use quenta_server::steam;

#[test]
fn extracts_canonical_steam64_ids() {
    let id = steam::extract_steam_id("https://steamcommunity.com/openid/id/76561198000000001");
    assert_eq!(id.as_deref(), Some("76561198000000001"));

    // http and a trailing slash are tolerated
    let id = steam::extract_steam_id("http://steamcommunity.com/openid/id/76561198000000001/");
    assert_eq!(id.as_deref(), Some("76561198000000001"));
}

#[test]
fn rejects_forged_claimed_ids() {
    // wrong host
    assert!(steam::extract_steam_id("https://example.com/openid/id/76561198000000001").is_none());
    // wrong path
    assert!(steam::extract_steam_id("https://steamcommunity.com/profiles/76561198000000001").is_none());
    // too short / not numeric
    assert!(steam::extract_steam_id("https://steamcommunity.com/openid/id/1234").is_none());
    assert!(
        steam::extract_steam_id("https://steamcommunity.com/openid/id/7656119800000000x").is_none()
    );
    // extra path segment smuggled in
    assert!(steam::extract_steam_id(
        "https://steamcommunity.com/openid/id/76561198000000001/../admin"
    )
    .is_none());
}

#[test]
fn login_url_carries_the_openid_params() {
    let url = steam::login_url("https://rp.example.org");

    assert!(url.starts_with("https://steamcommunity.com/openid/login?"));
    assert!(url.contains("openid.mode=checkid_setup"));
    assert!(url.contains("identifier_select"));
    // return_to points back at our callback
    assert!(url.contains("rp.example.org%2Fapi%2Fsteam-auth%2Freturn"));
}
