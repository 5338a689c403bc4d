//! Scripted page sessions loaded from TOML.

use serde::Deserialize;
use sp_core::Millis;
use sp_core::SprinkleError;
use sp_core::SprinkleResult;
use sp_host::Capabilities;
use sp_host::Rect;
use std::path::Path;

const DEFAULT_PAGE_URL: &str = "http://localhost/";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub page_url: String,
    pub prefers_dark: bool,
    pub viewport: ViewportSize,
    pub capabilities: CapabilityFlags,
    pub boxes: Vec<ElementBox>,
    pub steps: Vec<Step>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_owned(),
            prefers_dark: false,
            viewport: ViewportSize::default(),
            capabilities: CapabilityFlags::default(),
            boxes: Vec::new(),
            steps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilityFlags {
    pub intersection_observer: bool,
    pub clipboard: bool,
}

impl Default for CapabilityFlags {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            clipboard: true,
        }
    }
}

impl From<CapabilityFlags> for Capabilities {
    fn from(flags: CapabilityFlags) -> Self {
        Self {
            intersection_observer: flags.intersection_observer,
            clipboard: flags.clipboard,
        }
    }
}

/// Layout box for every element matching `selector`. Matches after the first are
/// stacked below it, `gap` pixels apart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementBox {
    pub selector: String,
    #[serde(default)]
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_box_width")]
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub gap: f64,
}

fn default_box_width() -> f64 {
    800.0
}

impl ElementBox {
    pub fn rect_for(&self, index: usize) -> Rect {
        let step = self.height + self.gap;
        Rect::new(self.x, self.y + step * index as f64, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Scroll(u32),
    Click(String),
    PrefersDark(bool),
    Advance(Millis),
    ClipboardFails(bool),
}

impl Scenario {
    pub fn from_toml_str(source: &str) -> SprinkleResult<Self> {
        toml::from_str(source).map_err(|error| {
            SprinkleError::new(
                "replay.scenario.parse",
                format!("invalid scenario: {}", error.message()),
            )
        })
    }

    pub fn load(path: &Path) -> SprinkleResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|error| {
            SprinkleError::new(
                "replay.scenario.read",
                format!("failed to read {}: {error}", path.display()),
            )
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::Scenario;
    use super::Step;

    #[test]
    fn parses_steps_and_boxes() {
        let scenario = Scenario::from_toml_str(
            r#"
            page_url = "https://docs.example.com/guide/"
            prefers_dark = true

            [viewport]
            height = 600

            [capabilities]
            clipboard = false

            [[boxes]]
            selector = ".feature-card"
            y = 900
            height = 200
            gap = 20

            [[steps]]
            scroll = 150

            [[steps]]
            click = ".copy-button"

            [[steps]]
            advance = 2000

            [[steps]]
            prefers_dark = false
            "#,
        )
        .unwrap_or_else(|_| unreachable!());

        assert!(scenario.prefers_dark);
        assert_eq!(scenario.viewport.width, 1280);
        assert_eq!(scenario.viewport.height, 600);
        assert!(!scenario.capabilities.clipboard);
        assert!(scenario.capabilities.intersection_observer);
        assert_eq!(scenario.boxes[0].rect_for(1).y, 1120.0);
        assert_eq!(
            scenario.steps,
            vec![
                Step::Scroll(150),
                Step::Click(".copy-button".to_owned()),
                Step::Advance(2000),
                Step::PrefersDark(false),
            ]
        );
    }

    #[test]
    fn empty_scenario_uses_defaults() {
        let scenario = Scenario::from_toml_str("").unwrap_or_else(|_| unreachable!());
        assert_eq!(scenario, Scenario::default());
    }

    #[test]
    fn unknown_steps_are_rejected() {
        let parsed = Scenario::from_toml_str("[[steps]]\nhover = \".nav\"\n");
        assert!(parsed.is_err_and(|error| error.code == "replay.scenario.parse"));
    }
}
