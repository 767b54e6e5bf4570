//! Minimal URL dissection for feature extraction and rule matching.
//!
//! Tab URLs come from the host browser and are usually well formed, but the
//! engine must never abort a pass on a malformed one, so parsing is lenient
//! string splitting rather than a full RFC 3986 parser.

/// Extract the host of a URL, lowercased, with any port stripped.
///
/// Returns `None` when the string has no scheme separator or an empty host;
/// callers treat that as a malformed URL.
pub fn host(url: &str) -> Option<String> {
    let rest = url.split("://").nth(1)?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    // Drop userinfo and port; both are rare in tab URLs but cheap to handle.
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or("");
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// Path segments of a URL in order, empty segments dropped.
pub fn path_tokens(url: &str) -> Vec<String> {
    let Some(rest) = url.split("://").nth(1) else {
        return Vec::new();
    };
    let Some(slash) = rest.find('/') else {
        return Vec::new();
    };
    let path = rest[slash + 1..].split(['?', '#']).next().unwrap_or("");
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_https() {
        assert_eq!(
            host("https://www.github.com/user/repo"),
            Some("www.github.com".to_string())
        );
    }

    #[test]
    fn test_host_strips_port() {
        assert_eq!(
            host("http://localhost:3000/api"),
            Some("localhost".to_string())
        );
    }

    #[test]
    fn test_host_lowercases() {
        assert_eq!(host("https://GitHub.COM/x"), Some("github.com".to_string()));
    }

    #[test]
    fn test_host_no_scheme_is_malformed() {
        assert_eq!(host("not a url"), None);
        assert_eq!(host("github.com/user"), None);
    }

    #[test]
    fn test_host_empty_authority_is_malformed() {
        assert_eq!(host("https:///path"), None);
    }

    #[test]
    fn test_path_tokens() {
        assert_eq!(
            path_tokens("https://github.com/user/repo?tab=readme"),
            vec!["user".to_string(), "repo".to_string()]
        );
    }

    #[test]
    fn test_path_tokens_no_path() {
        assert!(path_tokens("https://github.com").is_empty());
        assert!(path_tokens("garbage").is_empty());
    }
}
