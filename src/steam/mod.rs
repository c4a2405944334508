//! Steam OpenID 2.0 handshake + Web API lookups.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use url::Url;

const OPENID_ENDPOINT: &str = "https://steamcommunity.com/openid/login";
const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";
const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";

/// Build the redirect that sends a player to the Steam login page.
pub fn login_url(public_url: &str) -> String {
    let mut url = Url::parse(OPENID_ENDPOINT).expect("static endpoint URL");
    url.query_pairs_mut()
        .append_pair("openid.ns", OPENID_NS)
        .append_pair("openid.mode", "checkid_setup")
        .append_pair(
            "openid.return_to",
            &format!("{}/api/steam-auth/return", public_url.trim_end_matches('/')),
        )
        .append_pair("openid.realm", public_url)
        .append_pair("openid.identity", IDENTIFIER_SELECT)
        .append_pair("openid.claimed_id", IDENTIFIER_SELECT);
    url.into()
}

/// Replay the assertion to Steam with `check_authentication` and, when Steam
/// vouches for it, return the verified steam64 id.
pub async fn verify_assertion(
    client: &reqwest::Client,
    params: &HashMap<String, String>,
) -> Result<String> {
    if params.get("openid.mode").map(String::as_str) != Some("id_res") {
        bail!("unexpected openid.mode");
    }

    // Echo every openid.* field back, swapping the mode.
    let mut form: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| k.starts_with("openid.") && *k != "openid.mode")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    form.push(("openid.mode", "check_authentication"));

    let body = client
        .post(OPENID_ENDPOINT)
        .form(&form)
        .send()
        .await
        .context("posting check_authentication")?
        .text()
        .await
        .context("reading check_authentication response")?;

    if !body.lines().any(|l| l.trim() == "is_valid:true") {
        bail!("steam rejected the assertion");
    }

    let claimed = params
        .get("openid.claimed_id")
        .context("assertion lacks openid.claimed_id")?;
    extract_steam_id(claimed).context("claimed_id is not a steam profile URL")
}

/// Pull the steam64 id out of a claimed_id URL.
///
/// Only the canonical `steamcommunity.com/openid/id/<17 digits>` shape is
/// accepted; anything else is treated as forged.
pub fn extract_steam_id(claimed_id: &str) -> Option<String> {
    let rest = claimed_id
        .strip_prefix("https://steamcommunity.com/openid/id/")
        .or_else(|| claimed_id.strip_prefix("http://steamcommunity.com/openid/id/"))?;
    let id = rest.trim_end_matches('/');
    if id.len() == 17 && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}

/// Current persona name via the Steam Web API. `None` when the profile is
/// hidden or the response shape changes.
pub async fn fetch_persona_name(
    client: &reqwest::Client,
    api_key: &str,
    steam_id: &str,
) -> Result<Option<String>> {
    let url = format!(
        "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v0002/?key={api_key}&steamids={steam_id}"
    );
    let resp: serde_json::Value = client
        .get(&url)
        .send()
        .await
        .context("calling GetPlayerSummaries")?
        .json()
        .await
        .context("decoding GetPlayerSummaries")?;

    Ok(resp["response"]["players"]
        .get(0)
        .and_then(|p| p["personaname"].as_str())
        .map(str::to_string))
}
