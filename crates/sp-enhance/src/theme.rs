//! Mirrors the system color-scheme preference onto the root element.

use sp_dom::Document;
use sp_host::ColorSchemeSignal;
use tracing::debug;

const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_preference(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Writes `data-theme` on the document element. Returns false when there is none.
pub fn apply_theme(document: &mut Document, theme: Theme) -> bool {
    let Some(root) = document.document_element() else {
        debug!("document has no root element; theme not applied");
        return false;
    };
    document.set_attribute(root, THEME_ATTRIBUTE, theme.as_str());
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeSynchronizer {
    current: Theme,
}

impl ThemeSynchronizer {
    /// Applies the current preference and subscribes to its changes.
    pub fn attach(document: &mut Document, signal: &mut ColorSchemeSignal) -> Self {
        let current = Theme::from_preference(signal.matches());
        apply_theme(document, current);
        signal.subscribe();
        debug!(query = signal.query(), theme = current.as_str(), "theme bound to color scheme");
        Self { current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn on_change(&mut self, document: &mut Document, prefers_dark: bool) -> Theme {
        self.current = Theme::from_preference(prefers_dark);
        apply_theme(document, self.current);
        self.current
    }
}
