//! Placeholder detection: a paragraph whose text is the marker followed by an image URL.

/// Rules deciding which paragraph texts are fetchable placeholders.
#[derive(Debug, Clone)]
pub struct PlaceholderRules {
    /// Prefix tag, e.g. `<图片>`.
    pub marker: String,
    /// Substring the URL host must contain.
    pub trusted_host: String,
}

/// What a paragraph's text turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate<'a> {
    /// Not a placeholder at all.
    None,
    /// Marker present but the URL is not fetchable (scheme or host rejected).
    Rejected(&'a str),
    /// Marker present with a fetchable URL.
    Accepted(&'a str),
}

impl PlaceholderRules {
    pub fn new(marker: impl Into<String>, trusted_host: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            trusted_host: trusted_host.into(),
        }
    }

    /// Classify the flattened text of one paragraph.
    pub fn classify<'a>(&self, text: &'a str) -> Candidate<'a> {
        let Some(url) = text.strip_prefix(self.marker.as_str()) else {
            return Candidate::None;
        };
        if self.is_trusted(url) {
            Candidate::Accepted(url)
        } else {
            Candidate::Rejected(url)
        }
    }

    /// True if `url` starts with `http` and its host contains the trusted substring.
    pub fn is_trusted(&self, url: &str) -> bool {
        if !url.starts_with("http") {
            return false;
        }
        let Ok(parsed) = url::Url::parse(url) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        parsed
            .host_str()
            .is_some_and(|host| host.contains(self.trusted_host.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PlaceholderRules {
        PlaceholderRules::new("<图片>", "mitemin.net")
    }

    #[test]
    fn plain_text_is_not_a_placeholder() {
        assert_eq!(rules().classify("Once upon a time"), Candidate::None);
        assert_eq!(rules().classify(""), Candidate::None);
    }

    #[test]
    fn trusted_https_url_accepted() {
        let text = "<图片>https://12345.mitemin.net/i67890/";
        assert_eq!(
            rules().classify(text),
            Candidate::Accepted("https://12345.mitemin.net/i67890/")
        );
    }

    #[test]
    fn other_host_rejected() {
        let text = "<图片>https://example.com/pic.jpg";
        assert_eq!(
            rules().classify(text),
            Candidate::Rejected("https://example.com/pic.jpg")
        );
    }

    #[test]
    fn trusted_name_outside_host_rejected() {
        assert!(!rules().is_trusted("https://example.com/mitemin.net/pic.jpg"));
        assert!(!rules().is_trusted("https://example.com/?ref=mitemin.net"));
    }

    #[test]
    fn non_http_scheme_rejected() {
        assert!(!rules().is_trusted("ftp://mitemin.net/pic.jpg"));
        assert!(!rules().is_trusted("mitemin.net/pic.jpg"));
        assert!(!rules().is_trusted("httpx://mitemin.net/pic.jpg"));
    }

    #[test]
    fn plain_http_accepted() {
        assert!(rules().is_trusted("http://img.mitemin.net/a.png"));
    }
}
