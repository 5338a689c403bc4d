//! The page's own URL.

use sp_core::SprinkleError;
use sp_core::SprinkleResult;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn parse(input: &str) -> SprinkleResult<Self> {
        let url = Url::parse(input).map_err(|error| {
            SprinkleError::new(
                "host.location.invalid",
                format!("failed to parse page URL `{input}`: {error}"),
            )
        })?;
        Ok(Self { url })
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    /// Host name without port; empty for hostless URLs such as `file:`.
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Resolves an `href` attribute against the page URL.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.url.join(href.trim()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::PageLocation;

    #[test]
    fn resolves_relative_and_absolute_links() {
        let location =
            PageLocation::parse("https://docs.example.com/guide/").unwrap_or_else(|_| unreachable!());
        assert_eq!(location.hostname(), "docs.example.com");
        assert_eq!(
            location.resolve("../api").map(|url| url.to_string()),
            Some("https://docs.example.com/api".to_owned())
        );
        assert_eq!(
            location
                .resolve("https://github.com/org/repo")
                .and_then(|url| url.host_str().map(str::to_owned)),
            Some("github.com".to_owned())
        );
    }

    #[test]
    fn rejects_garbage_urls() {
        let parsed = PageLocation::parse("not a url");
        assert!(parsed.is_err());
    }
}
