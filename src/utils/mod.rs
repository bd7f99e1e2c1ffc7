//! Utility functions and helpers.

pub mod http;
pub mod log;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the lowercased host from a URL string, without a leading `www.`.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str.trim())
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
        .map(|host| host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Drop the query string and fragment from a URL.
pub fn strip_query(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].to_string()
}

/// True if `host` is `domain` or one of its subdomains.
pub fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|rest| rest.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://www.producthunt.com").unwrap();
        assert_eq!(
            resolve_url(&base, "/products/widget"),
            "https://www.producthunt.com/products/widget"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://www.Widget.io/path"),
            Some("widget.io".to_string())
        );
        assert_eq!(
            get_domain("https://app.widget.io:8080/path"),
            Some("app.widget.io".to_string())
        );
        assert_eq!(get_domain("invalid-url"), None);
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://widget.io/?ref=producthunt"),
            "https://widget.io/"
        );
        assert_eq!(strip_query("https://widget.io/a#top"), "https://widget.io/a");
        assert_eq!(strip_query("https://widget.io"), "https://widget.io");
    }

    #[test]
    fn test_host_matches() {
        assert!(host_matches("widget.io", "widget.io"));
        assert!(host_matches("mail.widget.io", "widget.io"));
        assert!(!host_matches("notwidget.io", "widget.io"));
    }
}
