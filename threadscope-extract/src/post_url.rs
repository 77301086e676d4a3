//! Post URL recognition.
//!
//! Accepts post links on `twitter.com` and `x.com` (optionally with `www.` or
//! `mobile.`), in either the `/<user>/status/<id>` or `/i/status/<id>` form.

use regex::Regex;
use std::sync::LazyLock;
use threadscope_core::{CoreError, PostId};
use url::Url;

/// Hosts that serve post pages.
const SUPPORTED_HOSTS: &[&str] = &["twitter.com", "x.com"];

/// Host prefixes stripped before matching.
const HOST_PREFIXES: &[&str] = &["www.", "mobile."];

/// Pattern for `/<user>/status/<id>` and `/i/status/<id>`.
static STATUS_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:i|[A-Za-z0-9_]{1,15})/status(?:es)?/(\d+)(?:/|$)").expect("Invalid regex")
});

/// Returns true if `raw` is a URL on a supported host.
pub fn is_supported_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .ok()
        .as_ref()
        .and_then(Url::host_str)
        .is_some_and(is_supported_host)
}

/// Extracts the post id from a post URL.
pub fn post_id_from_url(raw: &str) -> Option<PostId> {
    let url = Url::parse(raw.trim()).ok()?;
    if !url.host_str().is_some_and(is_supported_host) {
        return None;
    }

    let captures = STATUS_PATH_RE.captures(url.path())?;
    PostId::parse(captures.get(1)?.as_str())
}

/// Resolves a bare numeric id or a post URL to a [`PostId`].
pub fn resolve_post_ref(raw: &str) -> Result<PostId, CoreError> {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return PostId::parse(trimmed).ok_or_else(|| CoreError::InvalidId(raw.to_string()));
    }

    post_id_from_url(trimmed).ok_or_else(|| CoreError::InvalidId(raw.to_string()))
}

fn is_supported_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let bare = HOST_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(*prefix))
        .unwrap_or(host.as_str());
    SUPPORTED_HOSTS.contains(&bare)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_hosts() {
        assert!(is_supported_url("https://x.com/jack/status/20"));
        assert!(is_supported_url("https://mobile.twitter.com/jack/status/20"));
        assert!(is_supported_url("https://WWW.X.COM/"));
        assert!(!is_supported_url("https://notx.com/jack/status/20"));
        assert!(!is_supported_url("not a url"));
    }

    #[test]
    fn test_post_id_from_url() {
        let id = post_id_from_url("https://twitter.com/jack/status/20?s=46").unwrap();
        assert_eq!(id.as_str(), "20");
        assert_eq!(
            post_id_from_url("https://x.com/i/status/1943393540538798263/photo/1")
                .unwrap()
                .as_str(),
            "1943393540538798263"
        );
        assert!(post_id_from_url("https://x.com/jack").is_none());
        assert!(post_id_from_url("https://x.com/jack/status/abc").is_none());
        assert!(post_id_from_url("https://example.com/jack/status/20").is_none());
    }

    #[test]
    fn test_resolve_post_ref() {
        assert_eq!(resolve_post_ref(" 12345 ").unwrap().as_str(), "12345");
        assert_eq!(
            resolve_post_ref("https://x.com/a/status/77").unwrap().as_str(),
            "77"
        );
        assert!(matches!(resolve_post_ref(""), Err(CoreError::InvalidId(_))));
        assert!(resolve_post_ref("12ab").is_err());
    }
}
