//! Network and navigation classification used by verification (§4.4).

const ANALYTICS_SUBSTRINGS: &[&str] = &[
    "google-analytics",
    "googletagmanager",
    "segment.io",
    "doubleclick",
    "facebook.com/tr",
    "mixpanel",
    "amplitude",
    "hotjar",
    "sentry.io",
    "/analytics",
    "/tracking",
    "/beacon",
];

const SIGNIFICANT_URL_SUBSTRINGS: &[&str] = &["/api/", "/v1/", "/v2/", "/graphql", "/rest/", "/data/"];

const SIGNIFICANT_METHODS: &[&str] = &["POST", "PUT", "DELETE", "PATCH"];

const IGNORED_RESOURCE_TYPES: &[&str] = &["Ping", "ping", "beacon"];

const BLOCKED_URL_SCHEMES: &[&str] = &["data:", "about:", "chrome:", "chrome-extension:"];

const BLOCKED_URL_SUBSTRINGS: &[&str] = &["/log?", "/analytics", "/tracking"];

/// Whether a network request should be dropped as analytics/tracking noise
/// before it's counted toward an action's effects.
pub fn is_noise_request(url: &str, resource_type: &str) -> bool {
    if IGNORED_RESOURCE_TYPES.contains(&resource_type) {
        return true;
    }
    let lower = url.to_ascii_lowercase();
    ANALYTICS_SUBSTRINGS.iter().any(|needle| lower.contains(needle))
}

/// Whether a request qualifies as a "significant" effect of an action.
/// Document requests always qualify; XHR/Fetch qualify by URL shape or
/// write method.
pub fn is_significant_request(resource_type: &str, url: &str, method: &str) -> bool {
    if is_noise_request(url, resource_type) {
        return false;
    }
    if resource_type.eq_ignore_ascii_case("document") {
        return true;
    }
    if !matches!(resource_type.to_ascii_lowercase().as_str(), "xhr" | "fetch") {
        return false;
    }
    let lower = url.to_ascii_lowercase();
    SIGNIFICANT_URL_SUBSTRINGS.iter().any(|needle| lower.contains(needle))
        || SIGNIFICANT_METHODS.contains(&method.to_ascii_uppercase().as_str())
}

/// Whether a top-level navigation should be recorded as a `navigate` action
/// (§4.4 "Navigation").
pub fn is_recordable_navigation(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    if BLOCKED_URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return false;
    }
    !BLOCKED_URL_SUBSTRINGS.iter().any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_requests_are_always_significant() {
        assert!(is_significant_request("Document", "https://example.com/page", "GET"));
    }

    #[test]
    fn xhr_qualifies_by_url_shape_or_write_method() {
        assert!(is_significant_request("XHR", "https://example.com/api/users", "GET"));
        assert!(is_significant_request("Fetch", "https://example.com/submit", "POST"));
        assert!(!is_significant_request("XHR", "https://example.com/submit", "GET"));
    }

    #[test]
    fn analytics_urls_are_filtered_out() {
        assert!(!is_significant_request(
            "XHR",
            "https://www.google-analytics.com/collect",
            "POST"
        ));
        assert!(is_noise_request("https://example.com/tracking/event", "XHR"));
    }

    #[test]
    fn ping_resource_type_is_noise() {
        assert!(is_noise_request("https://example.com/anything", "Ping"));
    }

    #[test]
    fn blocked_schemes_and_log_urls_are_not_recordable_navigations() {
        assert!(!is_recordable_navigation("about:blank"));
        assert!(!is_recordable_navigation("chrome://settings"));
        assert!(!is_recordable_navigation("https://example.com/log?x=1"));
        assert!(is_recordable_navigation("https://example.com/dashboard"));
    }
}
