//! Enhancer configuration: the selector contract plus the behavior knobs.

use serde::Deserialize;
use sp_core::Millis;
use sp_core::SprinkleError;
use sp_core::SprinkleResult;
use sp_dom::SelectorList;
use sp_host::ObserverOptions;
use sp_host::RootMargin;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnhanceConfig {
    pub selectors: SelectorConfig,
    pub navigation: NavigationConfig,
    pub reveal: RevealConfig,
    pub copy: CopyConfig,
    pub external_links: ExternalLinkConfig,
    pub toc: TocConfig,
}

/// Selectors for every element the enhancer looks for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    pub nav_toggle: String,
    pub nav_menu: String,
    pub navbar: String,
    pub reveal: String,
    pub code_block: String,
    pub anchor_link: String,
    pub external_link: String,
    pub content_body: String,
    pub toc_headings: String,
    pub lazy_image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            nav_toggle: ".nav-toggle".to_owned(),
            nav_menu: ".nav-menu".to_owned(),
            navbar: ".navbar".to_owned(),
            reveal: ".feature-card, .screenshot-item, .tech-item, .example-card".to_owned(),
            code_block: "pre code".to_owned(),
            anchor_link: "a[href^=\"#\"]".to_owned(),
            external_link: "a[href^=\"http\"]".to_owned(),
            content_body: ".content-body".to_owned(),
            toc_headings: "h2, h3".to_owned(),
            lazy_image: "img[loading=\"lazy\"]".to_owned(),
        }
    }
}

impl SelectorConfig {
    fn entries(&self) -> [(&'static str, &str); 10] {
        [
            ("nav_toggle", &self.nav_toggle),
            ("nav_menu", &self.nav_menu),
            ("navbar", &self.navbar),
            ("reveal", &self.reveal),
            ("code_block", &self.code_block),
            ("anchor_link", &self.anchor_link),
            ("external_link", &self.external_link),
            ("content_body", &self.content_body),
            ("toc_headings", &self.toc_headings),
            ("lazy_image", &self.lazy_image),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Offset (px) the page must pass before scrolling down hides the navbar.
    pub hide_threshold: u32,
    /// Class toggled on the menu toggle and the menu.
    pub active_class: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            hide_threshold: 100,
            active_class: "active".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_owned(),
        }
    }
}

impl RevealConfig {
    pub fn observer_options(&self) -> SprinkleResult<ObserverOptions> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SprinkleError::new(
                "config.reveal.threshold",
                format!("reveal threshold {} is outside 0.0..=1.0", self.threshold),
            ));
        }
        Ok(ObserverOptions {
            threshold: self.threshold,
            root_margin: RootMargin::parse(&self.root_margin)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyConfig {
    pub idle_label: String,
    pub confirmed_label: String,
    pub revert_delay_ms: Millis,
    pub wrapper_class: String,
    pub button_class: String,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            idle_label: "Copy".to_owned(),
            confirmed_label: "Copied!".to_owned(),
            revert_delay_ms: 2000,
            wrapper_class: "code-wrapper".to_owned(),
            button_class: "copy-button".to_owned(),
        }
    }
}

/// How links are judged external.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalLinkPolicy {
    /// Decorate links whose host differs from the page host.
    #[default]
    SameHost,
    /// Decorate nothing, reproducing the shipped script whose host comparison never held.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalLinkConfig {
    pub policy: ExternalLinkPolicy,
    pub icon_class: String,
}

impl Default for ExternalLinkConfig {
    fn default() -> Self {
        Self {
            policy: ExternalLinkPolicy::SameHost,
            icon_class: "bi bi-arrow-up-right-square".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    pub title: String,
    pub class: String,
    /// A table is only built when the region holds more headings than this.
    pub min_headings: usize,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            title: "Table of Contents".to_owned(),
            class: "table-of-contents".to_owned(),
            min_headings: 2,
        }
    }
}

impl EnhanceConfig {
    pub fn from_toml_str(source: &str) -> SprinkleResult<Self> {
        let config: Self = toml::from_str(source).map_err(|error| {
            SprinkleError::new(
                "config.parse",
                format!("invalid enhancer config: {}", error.message()),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> SprinkleResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|error| {
            SprinkleError::new(
                "config.read",
                format!("failed to read {}: {error}", path.display()),
            )
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> SprinkleResult<()> {
        if self.copy.revert_delay_ms == 0 {
            return Err(SprinkleError::new(
                "config.copy.revert_delay",
                "copy revert delay must be greater than zero",
            ));
        }
        self.reveal.observer_options()?;
        for (name, selector) in self.selectors.entries() {
            SelectorList::parse(selector).map_err(|error| {
                SprinkleError::new(
                    "config.selector",
                    format!("selector `{name}` is invalid: {}", error.message),
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::EnhanceConfig;
    use super::ExternalLinkPolicy;

    #[test]
    fn defaults_match_the_page_contract() {
        let config = EnhanceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.navigation.hide_threshold, 100);
        assert_eq!(config.copy.revert_delay_ms, 2000);
        assert_eq!(config.copy.confirmed_label, "Copied!");
        assert_eq!(config.external_links.policy, ExternalLinkPolicy::SameHost);
        assert_eq!(config.selectors.anchor_link, "a[href^=\"#\"]");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = EnhanceConfig::from_toml_str(
            r#"
            [copy]
            revert_delay_ms = 500

            [external_links]
            policy = "legacy"
            "#,
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.copy.revert_delay_ms, 500);
        assert_eq!(config.copy.idle_label, "Copy");
        assert_eq!(config.external_links.policy, ExternalLinkPolicy::Legacy);
        assert_eq!(config.toc.title, "Table of Contents");
    }

    #[test]
    fn rejects_zero_delay_and_bad_threshold() {
        let zero = EnhanceConfig::from_toml_str("[copy]\nrevert_delay_ms = 0\n");
        assert!(zero.as_ref().is_err_and(|error| error.code == "config.copy.revert_delay"));

        let threshold = EnhanceConfig::from_toml_str("[reveal]\nthreshold = 1.5\n");
        assert!(threshold.as_ref().is_err_and(|error| error.code == "config.reveal.threshold"));

        let margin = EnhanceConfig::from_toml_str("[reveal]\nroot_margin = \"10%\"\n");
        assert!(margin.as_ref().is_err_and(|error| error.is_in("host.intersection")));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_selectors() {
        let unknown = EnhanceConfig::from_toml_str("[copy]\nlabel = \"x\"\n");
        assert!(unknown.as_ref().is_err_and(|error| error.code == "config.parse"));

        let selector = EnhanceConfig::from_toml_str("[selectors]\nnavbar = \".navbar:hover\"\n");
        assert!(selector.as_ref().is_err_and(|error| error.code == "config.selector"));
    }
}
