//! Page Context
//!
//! Snapshot of the hosting page's location and referrer, captured once at
//! load time and passed to the components that need it.

use url::Url;

/// Where the bridge is running
#[derive(Clone, Debug)]
pub struct PageContext {
    /// Hostname of the current page (e.g. `www.example.com`)
    pub hostname: String,

    /// Path of the current page (leading slash included)
    pub path: String,

    /// Raw query string, without the leading `?`
    pub query: String,

    /// Document referrer, when present and parseable
    pub referrer: Option<Url>,
}

impl PageContext {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            path: "/".into(),
            query: String::new(),
            referrer: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = query.strip_prefix('?').unwrap_or(&query).to_string();
        self
    }

    /// Attach a referrer; unparseable URLs are treated as no referrer
    #[must_use]
    pub fn with_referrer(mut self, referrer: &str) -> Self {
        self.referrer = Url::parse(referrer).ok();
        self
    }

    /// First value of a query parameter, percent-decoded
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Whether the referrer points at this page's own hostname
    pub fn referrer_is_same_host(&self) -> bool {
        self.referrer
            .as_ref()
            .and_then(Url::host_str)
            .is_some_and(|host| host == self.hostname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_lookup() {
        let page = PageContext::new("www.example.com").with_query("debug=piano-prod&redirect=%2Farticle%2F1");
        assert_eq!(page.query_param("debug"), Some("piano-prod".into()));
        assert_eq!(page.query_param("redirect"), Some("/article/1".into()));
        assert_eq!(page.query_param("missing"), None);
    }

    #[test]
    fn test_query_prefix_stripped() {
        let page = PageContext::new("www.example.com").with_query("?redirect=/a");
        assert_eq!(page.query_param("redirect"), Some("/a".into()));
    }

    #[test]
    fn test_referrer_same_host() {
        let page = PageContext::new("www.example.com")
            .with_referrer("https://www.example.com/article/energy");
        assert!(page.referrer_is_same_host());

        let page = PageContext::new("www.example.com").with_referrer("https://other.com/");
        assert!(!page.referrer_is_same_host());

        let page = PageContext::new("www.example.com").with_referrer("not a url");
        assert!(!page.referrer_is_same_host());
        assert!(page.referrer.is_none());
    }
}
