//! The `slack://` deep-link scheme used to carry mentions and broadcasts
//! through plain GFM text.
//!
//! Query parameters are parsed and emitted manually (no `url` crate in the
//! dependency stack) since the parameter set is small, fixed, and never
//! needs percent-decoding in practice (IDs and names are alphanumeric).

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeepLinkParams {
    pub team: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub range: Option<String>,
}

/// Splits a `slack://<entity>?k=v&k=v` URL into its entity name and params.
/// Returns `None` if `url` isn't a `slack://` URL at all.
pub fn parse_slack_url(url: &str) -> Option<(&str, DeepLinkParams)> {
    let rest = url.strip_prefix("slack://")?;
    let (entity, query) = match rest.split_once('?') {
        Some((e, q)) => (e, q),
        None => (rest, ""),
    };
    let mut params = DeepLinkParams::default();
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else { continue };
        match key {
            "team" => params.team = Some(value.to_string()),
            "id" => params.id = Some(value.to_string()),
            "name" => params.name = Some(value.to_string()),
            "range" => params.range = Some(value.to_string()),
            _ => {}
        }
    }
    Some((entity, params))
}

/// Builds a `slack://` deep link. Parameter order is fixed: `team`, then
/// `id`, then `range`, then `name` (e.g. `team=T9&id=U1&name=john`), so the
/// same mention always serializes to the same byte string.
pub fn build_slack_url(
    entity: &str,
    team_id: Option<&str>,
    id: Option<&str>,
    range: Option<&str>,
    name: Option<&str>,
) -> String {
    let mut parts = Vec::new();
    if let Some(t) = team_id {
        parts.push(format!("team={t}"));
    }
    if let Some(i) = id {
        parts.push(format!("id={i}"));
    }
    if let Some(r) = range {
        parts.push(format!("range={r}"));
    }
    if let Some(n) = name {
        parts.push(format!("name={n}"));
    }
    format!("slack://{entity}?{}", parts.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_parse_user_link_with_team() {
        let (entity, params) = parse_slack_url("slack://user?team=T9&id=U1&name=john").unwrap();
        assert_eq!(entity, "user");
        assert_eq!(params.team.as_deref(), Some("T9"));
        assert_eq!(params.id.as_deref(), Some("U1"));
        assert_eq!(params.name.as_deref(), Some("john"));
    }

    #[test]
    fn smoke_test_build_user_link_with_team_and_name() {
        let url = build_slack_url("user", Some("T9"), Some("U1"), None, Some("john"));
        assert_eq!(url, "slack://user?team=T9&id=U1&name=john");
    }

    #[test]
    fn smoke_test_build_broadcast_has_no_team_or_id() {
        let url = build_slack_url("broadcast", None, None, Some("channel"), None);
        assert_eq!(url, "slack://broadcast?range=channel");
    }

    #[test]
    fn smoke_test_non_slack_url_is_none() {
        assert!(parse_slack_url("https://example.com").is_none());
    }
}
